use anyhow::Context;
use sqlx::PgPool;
use uuid::Uuid;

use super::{
    dto::{CreateTestimonialRequest, UpdateTestimonialRequest},
    repo_types::TestimonialRow,
};
use crate::patch;

const COLUMNS: &str = "id, client_name, content, rating, avatar_url, before_image, after_image, \
                       is_published, created_at, updated_at";

pub async fn insert(db: &PgPool, t: &CreateTestimonialRequest) -> anyhow::Result<TestimonialRow> {
    let sql = format!(
        r#"
        INSERT INTO testimonials
            (client_name, content, rating, avatar_url, before_image, after_image, is_published)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        RETURNING {COLUMNS}
        "#
    );
    let row = sqlx::query_as::<_, TestimonialRow>(&sql)
        .bind(t.client_name.trim())
        .bind(t.content.trim())
        .bind(t.rating)
        .bind(t.avatar_url.as_deref())
        .bind(t.before_image.as_deref())
        .bind(t.after_image.as_deref())
        .bind(t.is_published)
        .fetch_one(db)
        .await
        .context("insert testimonial")?;
    Ok(row)
}

pub async fn find(db: &PgPool, id: Uuid) -> anyhow::Result<Option<TestimonialRow>> {
    let sql = format!("SELECT {COLUMNS} FROM testimonials WHERE id = $1");
    let row = sqlx::query_as::<_, TestimonialRow>(&sql)
        .bind(id)
        .fetch_optional(db)
        .await
        .context("find testimonial")?;
    Ok(row)
}

pub async fn list(
    db: &PgPool,
    published: Option<bool>,
    limit: i64,
    offset: i64,
) -> anyhow::Result<Vec<TestimonialRow>> {
    let sql = format!(
        r#"
        SELECT {COLUMNS}
          FROM testimonials
         WHERE ($1::boolean IS NULL OR is_published = $1)
         ORDER BY created_at DESC
         LIMIT $2 OFFSET $3
        "#
    );
    let rows = sqlx::query_as::<_, TestimonialRow>(&sql)
        .bind(published)
        .bind(limit)
        .bind(offset)
        .fetch_all(db)
        .await
        .context("list testimonials")?;
    Ok(rows)
}

pub async fn count(db: &PgPool, published: Option<bool>) -> anyhow::Result<i64> {
    let total = sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM testimonials WHERE ($1::boolean IS NULL OR is_published = $1)",
    )
    .bind(published)
    .fetch_one(db)
    .await
    .context("count testimonials")?;
    Ok(total)
}

pub async fn update(
    db: &PgPool,
    id: Uuid,
    t: &UpdateTestimonialRequest,
) -> anyhow::Result<Option<TestimonialRow>> {
    let sql = format!(
        r#"
        UPDATE testimonials
           SET client_name  = COALESCE($2, client_name),
               content      = COALESCE($3, content),
               rating       = COALESCE($4, rating),
               avatar_url   = CASE WHEN $5 THEN $6 ELSE avatar_url END,
               before_image = CASE WHEN $7 THEN $8 ELSE before_image END,
               after_image  = CASE WHEN $9 THEN $10 ELSE after_image END,
               is_published = COALESCE($11, is_published),
               updated_at   = now()
         WHERE id = $1
        RETURNING {COLUMNS}
        "#
    );
    let (avatar_set, avatar_url) = patch::parts(&t.avatar_url);
    let (before_set, before_image) = patch::parts(&t.before_image);
    let (after_set, after_image) = patch::parts(&t.after_image);
    let row = sqlx::query_as::<_, TestimonialRow>(&sql)
        .bind(id)
        .bind(t.client_name.as_deref().map(str::trim))
        .bind(t.content.as_deref().map(str::trim))
        .bind(t.rating)
        .bind(avatar_set)
        .bind(avatar_url)
        .bind(before_set)
        .bind(before_image)
        .bind(after_set)
        .bind(after_image)
        .bind(t.is_published)
        .fetch_optional(db)
        .await
        .context("update testimonial")?;
    Ok(row)
}

pub async fn toggle_published(db: &PgPool, id: Uuid) -> anyhow::Result<Option<TestimonialRow>> {
    let sql = format!(
        r#"
        UPDATE testimonials
           SET is_published = NOT is_published, updated_at = now()
         WHERE id = $1
        RETURNING {COLUMNS}
        "#
    );
    let row = sqlx::query_as::<_, TestimonialRow>(&sql)
        .bind(id)
        .fetch_optional(db)
        .await
        .context("toggle testimonial")?;
    Ok(row)
}

pub async fn delete(db: &PgPool, id: Uuid) -> anyhow::Result<bool> {
    let res = sqlx::query("DELETE FROM testimonials WHERE id = $1")
        .bind(id)
        .execute(db)
        .await
        .context("delete testimonial")?;
    Ok(res.rows_affected() > 0)
}
