use anyhow::Context;
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use super::{dto::ContactInfoRequest, repo_types::ContactInfoRow};
use crate::patch;

const UPSERT_LOCK: &str = "contact_info_upsert";

const COLUMNS: &str =
    "id, phone, email, address, facebook, instagram, zalo, working_hours, created_at, updated_at";

pub async fn latest(db: &PgPool) -> anyhow::Result<Option<ContactInfoRow>> {
    let sql = format!("SELECT {COLUMNS} FROM contact_info ORDER BY updated_at DESC LIMIT 1");
    let row = sqlx::query_as::<_, ContactInfoRow>(&sql)
        .fetch_optional(db)
        .await
        .context("load contact info")?;
    Ok(row)
}

pub async fn history(db: &PgPool) -> anyhow::Result<Vec<ContactInfoRow>> {
    let sql = format!("SELECT {COLUMNS} FROM contact_info ORDER BY updated_at DESC");
    let rows = sqlx::query_as::<_, ContactInfoRow>(&sql)
        .fetch_all(db)
        .await
        .context("list contact info")?;
    Ok(rows)
}

/// Serializes upserts with a transaction-scoped advisory lock, then locks the
/// current row. The advisory lock also covers the empty table, where
/// `FOR UPDATE` has nothing to hold.
pub async fn latest_id_for_update_tx(
    tx: &mut Transaction<'_, Postgres>,
) -> anyhow::Result<Option<Uuid>> {
    sqlx::query("SELECT pg_advisory_xact_lock(hashtext($1))")
        .bind(UPSERT_LOCK)
        .execute(&mut **tx)
        .await
        .context("lock contact info upsert")?;

    let id = sqlx::query_scalar::<_, Uuid>(
        "SELECT id FROM contact_info ORDER BY updated_at DESC LIMIT 1 FOR UPDATE",
    )
    .fetch_optional(&mut **tx)
    .await
    .context("lock contact info")?;
    Ok(id)
}

pub async fn insert_tx(
    tx: &mut Transaction<'_, Postgres>,
    c: &ContactInfoRequest,
) -> anyhow::Result<ContactInfoRow> {
    let sql = format!(
        r#"
        INSERT INTO contact_info (phone, email, address, facebook, instagram, zalo, working_hours)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        RETURNING {COLUMNS}
        "#
    );
    let row = sqlx::query_as::<_, ContactInfoRow>(&sql)
        .bind(patch::value(&c.phone))
        .bind(patch::value(&c.email))
        .bind(patch::value(&c.address))
        .bind(patch::value(&c.facebook))
        .bind(patch::value(&c.instagram))
        .bind(patch::value(&c.zalo))
        .bind(patch::value(&c.working_hours))
        .fetch_one(&mut **tx)
        .await
        .context("insert contact info")?;
    Ok(row)
}

pub async fn update<'e, E>(
    executor: E,
    id: Uuid,
    c: &ContactInfoRequest,
) -> anyhow::Result<Option<ContactInfoRow>>
where
    E: sqlx::Executor<'e, Database = Postgres>,
{
    let sql = format!(
        r#"
        UPDATE contact_info
           SET phone         = CASE WHEN $2 THEN $3 ELSE phone END,
               email         = CASE WHEN $4 THEN $5 ELSE email END,
               address       = CASE WHEN $6 THEN $7 ELSE address END,
               facebook      = CASE WHEN $8 THEN $9 ELSE facebook END,
               instagram     = CASE WHEN $10 THEN $11 ELSE instagram END,
               zalo          = CASE WHEN $12 THEN $13 ELSE zalo END,
               working_hours = CASE WHEN $14 THEN $15 ELSE working_hours END,
               updated_at    = now()
         WHERE id = $1
        RETURNING {COLUMNS}
        "#
    );
    let mut query = sqlx::query_as::<_, ContactInfoRow>(&sql).bind(id);
    for field in [
        &c.phone,
        &c.email,
        &c.address,
        &c.facebook,
        &c.instagram,
        &c.zalo,
        &c.working_hours,
    ] {
        let (set, value) = patch::parts(field);
        query = query.bind(set).bind(value);
    }
    let row = query
        .fetch_optional(executor)
        .await
        .context("update contact info")?;
    Ok(row)
}

pub async fn delete(db: &PgPool, id: Uuid) -> anyhow::Result<bool> {
    let res = sqlx::query("DELETE FROM contact_info WHERE id = $1")
        .bind(id)
        .execute(db)
        .await
        .context("delete contact info")?;
    Ok(res.rows_affected() > 0)
}
