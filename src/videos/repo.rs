use anyhow::Context;
use sqlx::PgPool;
use uuid::Uuid;

use super::{
    dto::{CreateVideoRequest, UpdateVideoRequest},
    repo_types::VideoRow,
};
use crate::patch;

const COLUMNS: &str =
    "id, title, description, url, thumbnail_url, category, is_published, created_at, updated_at";

pub async fn insert(db: &PgPool, v: &CreateVideoRequest) -> anyhow::Result<VideoRow> {
    let sql = format!(
        r#"
        INSERT INTO videos (title, description, url, thumbnail_url, category, is_published)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING {COLUMNS}
        "#
    );
    let row = sqlx::query_as::<_, VideoRow>(&sql)
        .bind(v.title.trim())
        .bind(v.description.as_deref())
        .bind(v.url.trim())
        .bind(v.thumbnail_url.as_deref())
        .bind(v.category.as_deref().map(str::trim))
        .bind(v.is_published)
        .fetch_one(db)
        .await
        .context("insert video")?;
    Ok(row)
}

pub async fn find(db: &PgPool, id: Uuid) -> anyhow::Result<Option<VideoRow>> {
    let sql = format!("SELECT {COLUMNS} FROM videos WHERE id = $1");
    let row = sqlx::query_as::<_, VideoRow>(&sql)
        .bind(id)
        .fetch_optional(db)
        .await
        .context("find video")?;
    Ok(row)
}

pub async fn list(
    db: &PgPool,
    published: Option<bool>,
    category: Option<&str>,
    limit: i64,
    offset: i64,
) -> anyhow::Result<Vec<VideoRow>> {
    let sql = format!(
        r#"
        SELECT {COLUMNS}
          FROM videos
         WHERE ($1::boolean IS NULL OR is_published = $1)
           AND ($2::text IS NULL OR category = $2)
         ORDER BY created_at DESC
         LIMIT $3 OFFSET $4
        "#
    );
    let rows = sqlx::query_as::<_, VideoRow>(&sql)
        .bind(published)
        .bind(category)
        .bind(limit)
        .bind(offset)
        .fetch_all(db)
        .await
        .context("list videos")?;
    Ok(rows)
}

pub async fn count(
    db: &PgPool,
    published: Option<bool>,
    category: Option<&str>,
) -> anyhow::Result<i64> {
    let total = sqlx::query_scalar::<_, i64>(
        r#"
        SELECT COUNT(*)
          FROM videos
         WHERE ($1::boolean IS NULL OR is_published = $1)
           AND ($2::text IS NULL OR category = $2)
        "#,
    )
    .bind(published)
    .bind(category)
    .fetch_one(db)
    .await
    .context("count videos")?;
    Ok(total)
}

pub async fn categories(db: &PgPool, published: Option<bool>) -> anyhow::Result<Vec<String>> {
    let rows = sqlx::query_scalar::<_, String>(
        r#"
        SELECT DISTINCT category
          FROM videos
         WHERE category IS NOT NULL
           AND ($1::boolean IS NULL OR is_published = $1)
         ORDER BY category
        "#,
    )
    .bind(published)
    .fetch_all(db)
    .await
    .context("list video categories")?;
    Ok(rows)
}

pub async fn update(
    db: &PgPool,
    id: Uuid,
    v: &UpdateVideoRequest,
) -> anyhow::Result<Option<VideoRow>> {
    let sql = format!(
        r#"
        UPDATE videos
           SET title         = COALESCE($2, title),
               description   = CASE WHEN $3 THEN $4 ELSE description END,
               url           = COALESCE($5, url),
               thumbnail_url = CASE WHEN $6 THEN $7 ELSE thumbnail_url END,
               category      = CASE WHEN $8 THEN $9 ELSE category END,
               is_published  = COALESCE($10, is_published),
               updated_at    = now()
         WHERE id = $1
        RETURNING {COLUMNS}
        "#
    );
    let (description_set, description) = patch::parts(&v.description);
    let (thumbnail_set, thumbnail_url) = patch::parts(&v.thumbnail_url);
    let (category_set, category) = patch::parts(&v.category);
    let row = sqlx::query_as::<_, VideoRow>(&sql)
        .bind(id)
        .bind(v.title.as_deref().map(str::trim))
        .bind(description_set)
        .bind(description)
        .bind(v.url.as_deref().map(str::trim))
        .bind(thumbnail_set)
        .bind(thumbnail_url)
        .bind(category_set)
        .bind(category.map(str::trim))
        .bind(v.is_published)
        .fetch_optional(db)
        .await
        .context("update video")?;
    Ok(row)
}

pub async fn toggle_published(db: &PgPool, id: Uuid) -> anyhow::Result<Option<VideoRow>> {
    let sql = format!(
        r#"
        UPDATE videos
           SET is_published = NOT is_published, updated_at = now()
         WHERE id = $1
        RETURNING {COLUMNS}
        "#
    );
    let row = sqlx::query_as::<_, VideoRow>(&sql)
        .bind(id)
        .fetch_optional(db)
        .await
        .context("toggle video")?;
    Ok(row)
}

pub async fn delete(db: &PgPool, id: Uuid) -> anyhow::Result<bool> {
    let res = sqlx::query("DELETE FROM videos WHERE id = $1")
        .bind(id)
        .execute(db)
        .await
        .context("delete video")?;
    Ok(res.rows_affected() > 0)
}
