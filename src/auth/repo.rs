use anyhow::Context;
use sqlx::PgPool;
use uuid::Uuid;

use crate::auth::repo_types::{NewUser, Role, User, UserChanges};

pub(crate) const USER_COLUMNS: &str =
    "id, username, email, password_hash, full_name, phone, role, created_at, updated_at";

impl User {
    /// Find a user by email.
    pub async fn find_by_email(db: &PgPool, email: &str) -> anyhow::Result<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1");
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(email)
            .fetch_optional(db)
            .await
            .context("find user by email")?;
        Ok(user)
    }

    /// Find a user by username.
    pub async fn find_by_username(db: &PgPool, username: &str) -> anyhow::Result<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE username = $1");
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(username)
            .fetch_optional(db)
            .await
            .context("find user by username")?;
        Ok(user)
    }

    pub async fn find_by_id(db: &PgPool, id: Uuid) -> anyhow::Result<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .fetch_optional(db)
            .await
            .context("find user by id")?;
        Ok(user)
    }

    /// Create a new user with hashed password.
    pub async fn create(db: &PgPool, new: &NewUser<'_>) -> anyhow::Result<User> {
        let sql = format!(
            r#"
            INSERT INTO users (username, email, password_hash, full_name, phone, role)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {USER_COLUMNS}
            "#
        );
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(new.username)
            .bind(new.email)
            .bind(new.password_hash)
            .bind(new.full_name)
            .bind(new.phone)
            .bind(new.role)
            .fetch_one(db)
            .await
            .context("insert user")?;
        Ok(user)
    }

    pub async fn update(
        db: &PgPool,
        id: Uuid,
        changes: &UserChanges,
    ) -> anyhow::Result<Option<User>> {
        let sql = format!(
            r#"
            UPDATE users
               SET username      = COALESCE($2, username),
                   email         = COALESCE($3, email),
                   full_name     = COALESCE($4, full_name),
                   phone         = COALESCE($5, phone),
                   password_hash = COALESCE($6, password_hash),
                   updated_at    = now()
             WHERE id = $1
            RETURNING {USER_COLUMNS}
            "#
        );
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .bind(changes.username.as_deref())
            .bind(changes.email.as_deref())
            .bind(changes.full_name.as_deref())
            .bind(changes.phone.as_deref())
            .bind(changes.password_hash.as_deref())
            .fetch_optional(db)
            .await
            .context("update user")?;
        Ok(user)
    }

    pub async fn set_role(db: &PgPool, id: Uuid, role: Role) -> anyhow::Result<Option<User>> {
        let sql = format!(
            "UPDATE users SET role = $2, updated_at = now() WHERE id = $1 RETURNING {USER_COLUMNS}"
        );
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .bind(role)
            .fetch_optional(db)
            .await
            .context("set user role")?;
        Ok(user)
    }

    pub async fn delete(db: &PgPool, id: Uuid) -> anyhow::Result<bool> {
        let res = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(db)
            .await
            .context("delete user")?;
        Ok(res.rows_affected() > 0)
    }

    pub async fn list(
        db: &PgPool,
        role: Option<Role>,
        search: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> anyhow::Result<Vec<User>> {
        let sql = format!(
            r#"
            SELECT {USER_COLUMNS}
              FROM users
             WHERE ($1::user_role IS NULL OR role = $1)
               AND ($2::text IS NULL
                    OR username ILIKE '%' || $2 || '%'
                    OR email ILIKE '%' || $2 || '%'
                    OR full_name ILIKE '%' || $2 || '%')
             ORDER BY created_at DESC
             LIMIT $3 OFFSET $4
            "#
        );
        let rows = sqlx::query_as::<_, User>(&sql)
            .bind(role)
            .bind(search)
            .bind(limit)
            .bind(offset)
            .fetch_all(db)
            .await
            .context("list users")?;
        Ok(rows)
    }

    pub async fn count(db: &PgPool, role: Option<Role>, search: Option<&str>) -> anyhow::Result<i64> {
        let total = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*)
              FROM users
             WHERE ($1::user_role IS NULL OR role = $1)
               AND ($2::text IS NULL
                    OR username ILIKE '%' || $2 || '%'
                    OR email ILIKE '%' || $2 || '%'
                    OR full_name ILIKE '%' || $2 || '%')
            "#,
        )
        .bind(role)
        .bind(search)
        .fetch_one(db)
        .await
        .context("count users")?;
        Ok(total)
    }

    pub async fn list_clients(db: &PgPool) -> anyhow::Result<Vec<User>> {
        let sql = format!(
            "SELECT {USER_COLUMNS} FROM users WHERE role = 'CLIENT' ORDER BY full_name ASC"
        );
        let rows = sqlx::query_as::<_, User>(&sql)
            .fetch_all(db)
            .await
            .context("list clients")?;
        Ok(rows)
    }
}
