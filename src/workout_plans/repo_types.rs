use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Clone, FromRow)]
pub struct WorkoutPlanRow {
    pub id: Uuid,
    pub name: String,
    pub client_id: Uuid,
    pub week_number: i32,
    pub start_date: OffsetDateTime,
    pub notes: Option<String>,
    pub created_by: Option<Uuid>,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

/// List projection: plan header plus owner name and day count.
#[derive(Debug, Clone, FromRow)]
pub struct WorkoutPlanSummaryRow {
    pub id: Uuid,
    pub name: String,
    pub client_id: Uuid,
    pub client_name: String,
    pub week_number: i32,
    pub start_date: OffsetDateTime,
    pub notes: Option<String>,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
    pub day_count: i64,
}

#[derive(Debug, Clone, FromRow)]
pub struct WorkoutDayRow {
    pub id: Uuid,
    pub plan_id: Uuid,
    pub day_name: String,
    pub day_order: i32,
    pub is_rest_day: bool,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, FromRow)]
pub struct ExerciseRow {
    pub id: Uuid,
    pub day_id: Uuid,
    pub name: String,
    pub exercise_order: i32,
    pub rest_seconds: Option<i32>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, FromRow)]
pub struct ExerciseSetRow {
    pub id: Uuid,
    pub exercise_id: Uuid,
    pub set_number: i32,
    pub target_reps: i32,
    pub actual_reps: Option<i32>,
    pub weight: Option<f64>,
    pub volume: f64,
}
