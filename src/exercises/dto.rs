use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::workout_plans::dto::ExerciseSetResponse;

/// Logged performance for one set; absent fields keep their stored value.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct LogSetRequest {
    #[serde(default, alias = "reality")]
    #[validate(range(min = 0, max = 1000))]
    pub actual_reps: Option<i32>,
    #[serde(default)]
    #[validate(range(min = 0.0, max = 2000.0))]
    pub weight: Option<f64>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct LogSetBatchItem {
    pub set_id: Uuid,
    #[serde(flatten)]
    #[validate(nested)]
    pub performance: LogSetRequest,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExerciseDetails {
    pub id: Uuid,
    pub day_id: Uuid,
    pub plan_id: Uuid,
    pub client_id: Uuid,
    pub name: String,
    pub exercise_order: i32,
    pub rest_seconds: Option<i32>,
    pub notes: Option<String>,
    pub total_volume: f64,
    pub sets: Vec<ExerciseSetResponse>,
}
