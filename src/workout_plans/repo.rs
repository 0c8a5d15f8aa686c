use anyhow::Context;
use sqlx::{PgPool, Postgres, Transaction};
use time::OffsetDateTime;
use uuid::Uuid;

use super::{
    dto::WorkoutDayInput,
    repo_types::{ExerciseRow, ExerciseSetRow, WorkoutDayRow, WorkoutPlanRow, WorkoutPlanSummaryRow},
    services::set_volume,
};

const PLAN_COLUMNS: &str =
    "id, name, client_id, week_number, start_date, notes, created_by, created_at, updated_at";

pub struct NewWorkoutPlan<'a> {
    pub name: &'a str,
    pub client_id: Uuid,
    pub week_number: i32,
    pub start_date: OffsetDateTime,
    pub notes: Option<&'a str>,
    pub created_by: Option<Uuid>,
}

// ---- Writes (transactional) ----

pub async fn insert_plan_tx(
    tx: &mut Transaction<'_, Postgres>,
    plan: &NewWorkoutPlan<'_>,
) -> anyhow::Result<WorkoutPlanRow> {
    let sql = format!(
        r#"
        INSERT INTO workout_plans (name, client_id, week_number, start_date, notes, created_by)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING {PLAN_COLUMNS}
        "#
    );
    let row = sqlx::query_as::<_, WorkoutPlanRow>(&sql)
        .bind(plan.name)
        .bind(plan.client_id)
        .bind(plan.week_number)
        .bind(plan.start_date)
        .bind(plan.notes)
        .bind(plan.created_by)
        .fetch_one(&mut **tx)
        .await
        .context("insert workout plan")?;
    Ok(row)
}

pub async fn update_plan_header_tx(
    tx: &mut Transaction<'_, Postgres>,
    id: Uuid,
    name: &str,
    week_number: Option<i32>,
    start_date: Option<OffsetDateTime>,
    notes: Option<&str>,
) -> anyhow::Result<Option<WorkoutPlanRow>> {
    let sql = format!(
        r#"
        UPDATE workout_plans
           SET name        = $2,
               week_number = COALESCE($3, week_number),
               start_date  = COALESCE($4, start_date),
               notes       = $5,
               updated_at  = now()
         WHERE id = $1
        RETURNING {PLAN_COLUMNS}
        "#
    );
    let row = sqlx::query_as::<_, WorkoutPlanRow>(&sql)
        .bind(id)
        .bind(name)
        .bind(week_number)
        .bind(start_date)
        .bind(notes)
        .fetch_optional(&mut **tx)
        .await
        .context("update workout plan")?;
    Ok(row)
}

/// Removes every day of a plan; exercises and sets go with them via cascade.
pub async fn delete_days_tx(
    tx: &mut Transaction<'_, Postgres>,
    plan_id: Uuid,
) -> anyhow::Result<u64> {
    let res = sqlx::query("DELETE FROM workout_days WHERE plan_id = $1")
        .bind(plan_id)
        .execute(&mut **tx)
        .await
        .context("delete workout days")?;
    Ok(res.rows_affected())
}

/// Inserts the whole day → exercise → set tree. Orders and set numbers
/// follow array position; volume is derived from actual reps and weight.
pub async fn insert_days_tx(
    tx: &mut Transaction<'_, Postgres>,
    plan_id: Uuid,
    days: &[WorkoutDayInput],
) -> anyhow::Result<()> {
    for (day_idx, day) in days.iter().enumerate() {
        let day_id = sqlx::query_scalar::<_, Uuid>(
            r#"
            INSERT INTO workout_days (plan_id, day_name, day_order, is_rest_day, notes)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id
            "#,
        )
        .bind(plan_id)
        .bind(day.day_name.trim())
        .bind(day_idx as i32 + 1)
        .bind(day.is_rest_day)
        .bind(day.notes.as_deref())
        .fetch_one(&mut **tx)
        .await
        .context("insert workout day")?;

        for (ex_idx, exercise) in day.exercises.iter().enumerate() {
            let exercise_id = sqlx::query_scalar::<_, Uuid>(
                r#"
                INSERT INTO exercises (day_id, name, exercise_order, rest_seconds, notes)
                VALUES ($1, $2, $3, $4, $5)
                RETURNING id
                "#,
            )
            .bind(day_id)
            .bind(exercise.name.trim())
            .bind(ex_idx as i32 + 1)
            .bind(exercise.rest_seconds)
            .bind(exercise.notes.as_deref())
            .fetch_one(&mut **tx)
            .await
            .context("insert exercise")?;

            for (set_idx, set) in exercise.sets.iter().enumerate() {
                sqlx::query(
                    r#"
                    INSERT INTO exercise_sets
                        (exercise_id, set_number, target_reps, actual_reps, weight, volume)
                    VALUES ($1, $2, $3, $4, $5, $6)
                    "#,
                )
                .bind(exercise_id)
                .bind(set_idx as i32 + 1)
                .bind(set.target_reps)
                .bind(set.actual_reps)
                .bind(set.weight)
                .bind(set_volume(set.actual_reps, set.weight))
                .execute(&mut **tx)
                .await
                .context("insert exercise set")?;
            }
        }
    }
    Ok(())
}

pub async fn delete_plan(db: &PgPool, id: Uuid) -> anyhow::Result<bool> {
    let res = sqlx::query("DELETE FROM workout_plans WHERE id = $1")
        .bind(id)
        .execute(db)
        .await
        .context("delete workout plan")?;
    Ok(res.rows_affected() > 0)
}

// ---- Queries ----

pub async fn find_plan(db: &PgPool, id: Uuid) -> anyhow::Result<Option<WorkoutPlanRow>> {
    let sql = format!("SELECT {PLAN_COLUMNS} FROM workout_plans WHERE id = $1");
    let row = sqlx::query_as::<_, WorkoutPlanRow>(&sql)
        .bind(id)
        .fetch_optional(db)
        .await
        .context("find workout plan")?;
    Ok(row)
}

pub async fn list_plans_by_client(
    db: &PgPool,
    client_id: Uuid,
) -> anyhow::Result<Vec<WorkoutPlanRow>> {
    let sql = format!(
        r#"
        SELECT {PLAN_COLUMNS}
          FROM workout_plans
         WHERE client_id = $1
         ORDER BY week_number DESC, created_at DESC
        "#
    );
    let rows = sqlx::query_as::<_, WorkoutPlanRow>(&sql)
        .bind(client_id)
        .fetch_all(db)
        .await
        .context("list workout plans by client")?;
    Ok(rows)
}

pub async fn list_plan_summaries(
    db: &PgPool,
    client_id: Option<Uuid>,
    limit: i64,
    offset: i64,
) -> anyhow::Result<Vec<WorkoutPlanSummaryRow>> {
    let rows = sqlx::query_as::<_, WorkoutPlanSummaryRow>(
        r#"
        SELECT p.id, p.name, p.client_id, u.full_name AS client_name,
               p.week_number, p.start_date, p.notes, p.created_at, p.updated_at,
               (SELECT COUNT(*) FROM workout_days d WHERE d.plan_id = p.id) AS day_count
          FROM workout_plans p
          JOIN users u ON u.id = p.client_id
         WHERE ($1::uuid IS NULL OR p.client_id = $1)
         ORDER BY p.created_at DESC
         LIMIT $2 OFFSET $3
        "#,
    )
    .bind(client_id)
    .bind(limit)
    .bind(offset)
    .fetch_all(db)
    .await
    .context("list workout plans")?;
    Ok(rows)
}

pub async fn count_plans(db: &PgPool, client_id: Option<Uuid>) -> anyhow::Result<i64> {
    let total = sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM workout_plans WHERE ($1::uuid IS NULL OR client_id = $1)",
    )
    .bind(client_id)
    .fetch_one(db)
    .await
    .context("count workout plans")?;
    Ok(total)
}

pub async fn list_days(db: &PgPool, plan_ids: &[Uuid]) -> anyhow::Result<Vec<WorkoutDayRow>> {
    let rows = sqlx::query_as::<_, WorkoutDayRow>(
        r#"
        SELECT id, plan_id, day_name, day_order, is_rest_day, notes
          FROM workout_days
         WHERE plan_id = ANY($1)
         ORDER BY plan_id, day_order
        "#,
    )
    .bind(plan_ids)
    .fetch_all(db)
    .await
    .context("list workout days")?;
    Ok(rows)
}

pub async fn list_exercises(db: &PgPool, plan_ids: &[Uuid]) -> anyhow::Result<Vec<ExerciseRow>> {
    let rows = sqlx::query_as::<_, ExerciseRow>(
        r#"
        SELECT e.id, e.day_id, e.name, e.exercise_order, e.rest_seconds, e.notes
          FROM exercises e
          JOIN workout_days d ON d.id = e.day_id
         WHERE d.plan_id = ANY($1)
         ORDER BY e.day_id, e.exercise_order
        "#,
    )
    .bind(plan_ids)
    .fetch_all(db)
    .await
    .context("list exercises")?;
    Ok(rows)
}

pub async fn list_sets(db: &PgPool, plan_ids: &[Uuid]) -> anyhow::Result<Vec<ExerciseSetRow>> {
    let rows = sqlx::query_as::<_, ExerciseSetRow>(
        r#"
        SELECT s.id, s.exercise_id, s.set_number, s.target_reps, s.actual_reps, s.weight, s.volume
          FROM exercise_sets s
          JOIN exercises e ON e.id = s.exercise_id
          JOIN workout_days d ON d.id = e.day_id
         WHERE d.plan_id = ANY($1)
         ORDER BY s.exercise_id, s.set_number
        "#,
    )
    .bind(plan_ids)
    .fetch_all(db)
    .await
    .context("list exercise sets")?;
    Ok(rows)
}
