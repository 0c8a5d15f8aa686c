use anyhow::Context;
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use super::{dto::HomeContentRequest, repo_types::HomeContentRow};
use crate::patch;

const UPSERT_LOCK: &str = "home_content_upsert";

const COLUMNS: &str = "id, hero_title, hero_subtitle, hero_image, about_title, about_text, \
                       cta_text, created_at, updated_at";

pub async fn latest(db: &PgPool) -> anyhow::Result<Option<HomeContentRow>> {
    let sql = format!("SELECT {COLUMNS} FROM home_content ORDER BY updated_at DESC LIMIT 1");
    let row = sqlx::query_as::<_, HomeContentRow>(&sql)
        .fetch_optional(db)
        .await
        .context("load home content")?;
    Ok(row)
}

pub async fn history(db: &PgPool) -> anyhow::Result<Vec<HomeContentRow>> {
    let sql = format!("SELECT {COLUMNS} FROM home_content ORDER BY updated_at DESC");
    let rows = sqlx::query_as::<_, HomeContentRow>(&sql)
        .fetch_all(db)
        .await
        .context("list home content")?;
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
        .context("lock home content upsert")?;

    let id = sqlx::query_scalar::<_, Uuid>(
        "SELECT id FROM home_content ORDER BY updated_at DESC LIMIT 1 FOR UPDATE",
    )
    .fetch_optional(&mut **tx)
    .await
    .context("lock home content")?;
    Ok(id)
}

pub async fn insert_tx(
    tx: &mut Transaction<'_, Postgres>,
    hero_title: &str,
    c: &HomeContentRequest,
) -> anyhow::Result<HomeContentRow> {
    let sql = format!(
        r#"
        INSERT INTO home_content
            (hero_title, hero_subtitle, hero_image, about_title, about_text, cta_text)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING {COLUMNS}
        "#
    );
    let row = sqlx::query_as::<_, HomeContentRow>(&sql)
        .bind(hero_title)
        .bind(patch::value(&c.hero_subtitle))
        .bind(patch::value(&c.hero_image))
        .bind(patch::value(&c.about_title))
        .bind(patch::value(&c.about_text))
        .bind(patch::value(&c.cta_text))
        .fetch_one(&mut **tx)
        .await
        .context("insert home content")?;
    Ok(row)
}

pub async fn update<'e, E>(
    executor: E,
    id: Uuid,
    c: &HomeContentRequest,
) -> anyhow::Result<Option<HomeContentRow>>
where
    E: sqlx::Executor<'e, Database = Postgres>,
{
    let sql = format!(
        r#"
        UPDATE home_content
           SET hero_title    = COALESCE($2, hero_title),
               hero_subtitle = CASE WHEN $3 THEN $4 ELSE hero_subtitle END,
               hero_image    = CASE WHEN $5 THEN $6 ELSE hero_image END,
               about_title   = CASE WHEN $7 THEN $8 ELSE about_title END,
               about_text    = CASE WHEN $9 THEN $10 ELSE about_text END,
               cta_text      = CASE WHEN $11 THEN $12 ELSE cta_text END,
               updated_at    = now()
         WHERE id = $1
        RETURNING {COLUMNS}
        "#
    );
    let mut query = sqlx::query_as::<_, HomeContentRow>(&sql)
        .bind(id)
        .bind(c.hero_title.as_deref().map(str::trim));
    for field in [
        &c.hero_subtitle,
        &c.hero_image,
        &c.about_title,
        &c.about_text,
        &c.cta_text,
    ] {
        let (set, value) = patch::parts(field);
        query = query.bind(set).bind(value);
    }
    let row = query
        .fetch_optional(executor)
        .await
        .context("update home content")?;
    Ok(row)
}

pub async fn delete(db: &PgPool, id: Uuid) -> anyhow::Result<bool> {
    let res = sqlx::query("DELETE FROM home_content WHERE id = $1")
        .bind(id)
        .execute(db)
        .await
        .context("delete home content")?;
    Ok(res.rows_affected() > 0)
}
