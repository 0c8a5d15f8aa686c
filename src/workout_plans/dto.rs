use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;
use validator::{Validate, ValidationError};

use super::repo_types::{ExerciseSetRow, WorkoutPlanSummaryRow};

/// One set as submitted. Set numbers come from array position and
/// volume is always recomputed, so neither is read from the payload.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SetInput {
    #[serde(alias = "reps")]
    #[validate(range(min = 0, max = 1000))]
    pub target_reps: i32,
    #[serde(default, alias = "reality")]
    #[validate(range(min = 0, max = 1000))]
    pub actual_reps: Option<i32>,
    #[serde(default)]
    #[validate(range(min = 0.0, max = 2000.0))]
    pub weight: Option<f64>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ExerciseInput {
    #[validate(length(min = 1, max = 120, message = "Exercise name is required"))]
    pub name: String,
    #[serde(default)]
    #[validate(range(min = 0, max = 3600))]
    pub rest_seconds: Option<i32>,
    #[serde(default)]
    #[validate(length(max = 1000))]
    pub notes: Option<String>,
    #[validate(length(min = 1, message = "An exercise needs at least one set"), nested)]
    pub sets: Vec<SetInput>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "validate_rest_day"))]
pub struct WorkoutDayInput {
    #[validate(length(min = 1, max = 50, message = "Day name is required"))]
    pub day_name: String,
    #[serde(default)]
    pub is_rest_day: bool,
    #[serde(default)]
    #[validate(length(max = 1000))]
    pub notes: Option<String>,
    #[serde(default)]
    #[validate(nested)]
    pub exercises: Vec<ExerciseInput>,
}

fn validate_rest_day(day: &WorkoutDayInput) -> Result<(), ValidationError> {
    if day.is_rest_day && !day.exercises.is_empty() {
        let mut err = ValidationError::new("rest_day_has_exercises");
        err.message = Some("A rest day cannot contain exercises".into());
        return Err(err);
    }
    Ok(())
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateWorkoutPlanRequest {
    #[validate(length(min = 1, max = 200, message = "Plan name is required"))]
    pub name: String,
    pub client_id: Uuid,
    #[serde(default)]
    #[validate(range(min = 1, max = 520))]
    pub week_number: Option<i32>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub start_date: Option<OffsetDateTime>,
    #[serde(default)]
    #[validate(length(max = 2000))]
    pub notes: Option<String>,
    #[serde(default)]
    #[validate(nested)]
    pub days: Vec<WorkoutDayInput>,
}

/// Full replacement of a plan: header fields plus the complete day array.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateWorkoutPlanRequest {
    #[validate(length(min = 1, max = 200, message = "Plan name is required"))]
    pub name: String,
    #[serde(default)]
    #[validate(range(min = 1, max = 520))]
    pub week_number: Option<i32>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub start_date: Option<OffsetDateTime>,
    #[serde(default)]
    #[validate(length(max = 2000))]
    pub notes: Option<String>,
    #[serde(default)]
    #[validate(nested)]
    pub days: Vec<WorkoutDayInput>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DuplicatePlanRequest {
    pub target_client_id: Uuid,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanFilter {
    pub client_id: Option<Uuid>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ExerciseSetResponse {
    pub id: Uuid,
    pub set_number: i32,
    pub target_reps: i32,
    pub actual_reps: Option<i32>,
    pub weight: Option<f64>,
    pub volume: f64,
}

impl From<ExerciseSetRow> for ExerciseSetResponse {
    fn from(r: ExerciseSetRow) -> Self {
        Self {
            id: r.id,
            set_number: r.set_number,
            target_reps: r.target_reps,
            actual_reps: r.actual_reps,
            weight: r.weight,
            volume: r.volume,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExerciseResponse {
    pub id: Uuid,
    pub name: String,
    pub exercise_order: i32,
    pub rest_seconds: Option<i32>,
    pub notes: Option<String>,
    pub total_volume: f64,
    pub sets: Vec<ExerciseSetResponse>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutDayResponse {
    pub id: Uuid,
    pub day_name: String,
    pub day_order: i32,
    pub is_rest_day: bool,
    pub notes: Option<String>,
    pub exercises: Vec<ExerciseResponse>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutPlanResponse {
    pub id: Uuid,
    pub name: String,
    pub client_id: Uuid,
    pub week_number: i32,
    #[serde(with = "time::serde::rfc3339")]
    pub start_date: OffsetDateTime,
    pub notes: Option<String>,
    pub created_by: Option<Uuid>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
    pub total_volume: f64,
    pub days: Vec<WorkoutDayResponse>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutPlanListItem {
    pub id: Uuid,
    pub name: String,
    pub client_id: Uuid,
    pub client_name: String,
    pub week_number: i32,
    #[serde(with = "time::serde::rfc3339")]
    pub start_date: OffsetDateTime,
    pub notes: Option<String>,
    pub day_count: i64,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl From<WorkoutPlanSummaryRow> for WorkoutPlanListItem {
    fn from(r: WorkoutPlanSummaryRow) -> Self {
        Self {
            id: r.id,
            name: r.name,
            client_id: r.client_id,
            client_name: r.client_name,
            week_number: r.week_number,
            start_date: r.start_date,
            notes: r.notes,
            day_count: r.day_count,
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn day(value: serde_json::Value) -> WorkoutDayInput {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn rest_day_with_exercises_is_rejected() {
        let d = day(json!({
            "dayName": "Sunday",
            "isRestDay": true,
            "exercises": [{ "name": "Plank", "sets": [{ "targetReps": 1 }] }]
        }));
        let errs = d.validate().unwrap_err();
        assert!(errs.errors().contains_key("__all__"));
    }

    #[test]
    fn rest_day_without_exercises_is_fine() {
        let d = day(json!({ "dayName": "Sunday", "isRestDay": true }));
        assert!(d.validate().is_ok());
        assert!(d.exercises.is_empty());
    }

    #[test]
    fn exercise_without_sets_is_rejected() {
        let d = day(json!({
            "dayName": "Monday",
            "exercises": [{ "name": "Squat", "sets": [] }]
        }));
        assert!(d.validate().is_err());
    }

    #[test]
    fn legacy_set_field_names_are_accepted() {
        let s: SetInput = serde_json::from_value(json!({
            "reps": 10, "reality": 8, "weight": 40.0, "volume": 99999.0
        }))
        .unwrap();
        assert_eq!(s.target_reps, 10);
        assert_eq!(s.actual_reps, Some(8));
    }

    #[test]
    fn nested_set_errors_surface() {
        let req: CreateWorkoutPlanRequest = serde_json::from_value(json!({
            "name": "Week 1",
            "clientId": Uuid::new_v4(),
            "days": [{
                "dayName": "Monday",
                "exercises": [{ "name": "Bench", "sets": [{ "targetReps": -1 }] }]
            }]
        }))
        .unwrap();
        assert!(req.validate().is_err());
    }

    #[test]
    fn start_date_parses_rfc3339() {
        let req: CreateWorkoutPlanRequest = serde_json::from_value(json!({
            "name": "Week 1",
            "clientId": Uuid::new_v4(),
            "startDate": "2024-03-04T00:00:00Z"
        }))
        .unwrap();
        assert_eq!(req.start_date.unwrap().year(), 2024);
        assert!(req.days.is_empty());
    }
}
