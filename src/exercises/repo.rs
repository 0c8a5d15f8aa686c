use anyhow::Context;
use sqlx::{FromRow, PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::workout_plans::repo_types::ExerciseSetRow;

/// Exercise joined up to the plan that owns it.
#[derive(Debug, Clone, FromRow)]
pub struct OwnedExerciseRow {
    pub id: Uuid,
    pub day_id: Uuid,
    pub plan_id: Uuid,
    pub client_id: Uuid,
    pub name: String,
    pub exercise_order: i32,
    pub rest_seconds: Option<i32>,
    pub notes: Option<String>,
}

const SET_COLUMNS: &str = "id, exercise_id, set_number, target_reps, actual_reps, weight, volume";

pub async fn find_exercise(db: &PgPool, id: Uuid) -> anyhow::Result<Option<OwnedExerciseRow>> {
    let row = sqlx::query_as::<_, OwnedExerciseRow>(
        r#"
        SELECT e.id, e.day_id, d.plan_id, p.client_id,
               e.name, e.exercise_order, e.rest_seconds, e.notes
          FROM exercises e
          JOIN workout_days d ON d.id = e.day_id
          JOIN workout_plans p ON p.id = d.plan_id
         WHERE e.id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(db)
    .await
    .context("find exercise")?;
    Ok(row)
}

pub async fn list_sets(db: &PgPool, exercise_id: Uuid) -> anyhow::Result<Vec<ExerciseSetRow>> {
    let sql = format!(
        "SELECT {SET_COLUMNS} FROM exercise_sets WHERE exercise_id = $1 ORDER BY set_number"
    );
    let rows = sqlx::query_as::<_, ExerciseSetRow>(&sql)
        .bind(exercise_id)
        .fetch_all(db)
        .await
        .context("list sets of exercise")?;
    Ok(rows)
}

/// Locks one set of `exercise_id` for a read-modify-write.
pub async fn lock_set_tx(
    tx: &mut Transaction<'_, Postgres>,
    exercise_id: Uuid,
    set_id: Uuid,
) -> anyhow::Result<Option<ExerciseSetRow>> {
    let sql = format!(
        "SELECT {SET_COLUMNS} FROM exercise_sets WHERE id = $1 AND exercise_id = $2 FOR UPDATE"
    );
    let row = sqlx::query_as::<_, ExerciseSetRow>(&sql)
        .bind(set_id)
        .bind(exercise_id)
        .fetch_optional(&mut **tx)
        .await
        .context("lock exercise set")?;
    Ok(row)
}

pub async fn write_performance_tx(
    tx: &mut Transaction<'_, Postgres>,
    set_id: Uuid,
    actual_reps: Option<i32>,
    weight: Option<f64>,
    volume: f64,
) -> anyhow::Result<ExerciseSetRow> {
    let sql = format!(
        r#"
        UPDATE exercise_sets
           SET actual_reps = $2, weight = $3, volume = $4, updated_at = now()
         WHERE id = $1
        RETURNING {SET_COLUMNS}
        "#
    );
    let row = sqlx::query_as::<_, ExerciseSetRow>(&sql)
        .bind(set_id)
        .bind(actual_reps)
        .bind(weight)
        .bind(volume)
        .fetch_one(&mut **tx)
        .await
        .context("write set performance")?;
    Ok(row)
}
