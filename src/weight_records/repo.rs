use anyhow::Context;
use sqlx::PgPool;
use time::OffsetDateTime;
use uuid::Uuid;

use super::repo_types::{WeightRecordChanges, WeightRecordRow};

const COLUMNS: &str = "id, client_id, weight, recorded_at, notes, created_at";

pub async fn insert(
    db: &PgPool,
    client_id: Uuid,
    weight: f64,
    recorded_at: OffsetDateTime,
    notes: Option<&str>,
) -> anyhow::Result<WeightRecordRow> {
    let sql = format!(
        r#"
        INSERT INTO weight_records (client_id, weight, recorded_at, notes)
        VALUES ($1, $2, $3, $4)
        RETURNING {COLUMNS}
        "#
    );
    let row = sqlx::query_as::<_, WeightRecordRow>(&sql)
        .bind(client_id)
        .bind(weight)
        .bind(recorded_at)
        .bind(notes)
        .fetch_one(db)
        .await
        .context("insert weight record")?;
    Ok(row)
}

pub async fn find(db: &PgPool, id: Uuid) -> anyhow::Result<Option<WeightRecordRow>> {
    let sql = format!("SELECT {COLUMNS} FROM weight_records WHERE id = $1");
    let row = sqlx::query_as::<_, WeightRecordRow>(&sql)
        .bind(id)
        .fetch_optional(db)
        .await
        .context("find weight record")?;
    Ok(row)
}

pub async fn list(
    db: &PgPool,
    client_id: Option<Uuid>,
    from: Option<OffsetDateTime>,
    to: Option<OffsetDateTime>,
    limit: i64,
    offset: i64,
) -> anyhow::Result<Vec<WeightRecordRow>> {
    let sql = format!(
        r#"
        SELECT {COLUMNS}
          FROM weight_records
         WHERE ($1::uuid IS NULL OR client_id = $1)
           AND ($2::timestamptz IS NULL OR recorded_at >= $2)
           AND ($3::timestamptz IS NULL OR recorded_at <= $3)
         ORDER BY recorded_at DESC
         LIMIT $4 OFFSET $5
        "#
    );
    let rows = sqlx::query_as::<_, WeightRecordRow>(&sql)
        .bind(client_id)
        .bind(from)
        .bind(to)
        .bind(limit)
        .bind(offset)
        .fetch_all(db)
        .await
        .context("list weight records")?;
    Ok(rows)
}

pub async fn count(
    db: &PgPool,
    client_id: Option<Uuid>,
    from: Option<OffsetDateTime>,
    to: Option<OffsetDateTime>,
) -> anyhow::Result<i64> {
    let total = sqlx::query_scalar::<_, i64>(
        r#"
        SELECT COUNT(*)
          FROM weight_records
         WHERE ($1::uuid IS NULL OR client_id = $1)
           AND ($2::timestamptz IS NULL OR recorded_at >= $2)
           AND ($3::timestamptz IS NULL OR recorded_at <= $3)
        "#,
    )
    .bind(client_id)
    .bind(from)
    .bind(to)
    .fetch_one(db)
    .await
    .context("count weight records")?;
    Ok(total)
}

/// All records of a client, newest first.
pub async fn list_by_client(db: &PgPool, client_id: Uuid) -> anyhow::Result<Vec<WeightRecordRow>> {
    let sql = format!(
        "SELECT {COLUMNS} FROM weight_records WHERE client_id = $1 ORDER BY recorded_at DESC"
    );
    let rows = sqlx::query_as::<_, WeightRecordRow>(&sql)
        .bind(client_id)
        .fetch_all(db)
        .await
        .context("list weight records by client")?;
    Ok(rows)
}

pub async fn update(
    db: &PgPool,
    id: Uuid,
    changes: &WeightRecordChanges,
) -> anyhow::Result<Option<WeightRecordRow>> {
    let sql = format!(
        r#"
        UPDATE weight_records
           SET weight      = COALESCE($2, weight),
               recorded_at = COALESCE($3, recorded_at),
               notes       = COALESCE($4, notes)
         WHERE id = $1
        RETURNING {COLUMNS}
        "#
    );
    let row = sqlx::query_as::<_, WeightRecordRow>(&sql)
        .bind(id)
        .bind(changes.weight)
        .bind(changes.recorded_at)
        .bind(changes.notes.as_deref())
        .fetch_optional(db)
        .await
        .context("update weight record")?;
    Ok(row)
}

pub async fn delete(db: &PgPool, id: Uuid) -> anyhow::Result<bool> {
    let res = sqlx::query("DELETE FROM weight_records WHERE id = $1")
        .bind(id)
        .execute(db)
        .await
        .context("delete weight record")?;
    Ok(res.rows_affected() > 0)
}
