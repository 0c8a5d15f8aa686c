use std::collections::HashMap;

use sqlx::PgPool;
use time::OffsetDateTime;
use tracing::info;
use uuid::Uuid;

use super::{
    dto::{
        CreateWorkoutPlanRequest, ExerciseInput, ExerciseResponse, ExerciseSetResponse, SetInput,
        UpdateWorkoutPlanRequest, WorkoutDayInput, WorkoutDayResponse, WorkoutPlanResponse,
    },
    repo::{self, NewWorkoutPlan},
    repo_types::{ExerciseRow, ExerciseSetRow, WorkoutDayRow, WorkoutPlanRow},
};
use crate::error::{AppError, AppResult};

/// Training volume of one set: actual reps × weight, 0 until both are logged.
pub fn set_volume(actual_reps: Option<i32>, weight: Option<f64>) -> f64 {
    match (actual_reps, weight) {
        (Some(reps), Some(w)) => f64::from(reps) * w,
        _ => 0.0,
    }
}

pub fn exercise_volume(sets: &[ExerciseSetResponse]) -> f64 {
    sets.iter().map(|s| s.volume).sum()
}

/// Groups flat rows (each ordered within its parent) into plan trees.
pub fn assemble_plans(
    plans: Vec<WorkoutPlanRow>,
    days: Vec<WorkoutDayRow>,
    exercises: Vec<ExerciseRow>,
    sets: Vec<ExerciseSetRow>,
) -> Vec<WorkoutPlanResponse> {
    let mut sets_by_exercise: HashMap<Uuid, Vec<ExerciseSetResponse>> = HashMap::new();
    for s in sets {
        sets_by_exercise
            .entry(s.exercise_id)
            .or_default()
            .push(ExerciseSetResponse::from(s));
    }

    let mut exercises_by_day: HashMap<Uuid, Vec<ExerciseResponse>> = HashMap::new();
    for e in exercises {
        let sets = sets_by_exercise.remove(&e.id).unwrap_or_default();
        exercises_by_day
            .entry(e.day_id)
            .or_default()
            .push(ExerciseResponse {
                id: e.id,
                name: e.name,
                exercise_order: e.exercise_order,
                rest_seconds: e.rest_seconds,
                notes: e.notes,
                total_volume: exercise_volume(&sets),
                sets,
            });
    }

    let mut days_by_plan: HashMap<Uuid, Vec<WorkoutDayResponse>> = HashMap::new();
    for d in days {
        let exercises = exercises_by_day.remove(&d.id).unwrap_or_default();
        days_by_plan.entry(d.plan_id).or_default().push(WorkoutDayResponse {
            id: d.id,
            day_name: d.day_name,
            day_order: d.day_order,
            is_rest_day: d.is_rest_day,
            notes: d.notes,
            exercises,
        });
    }

    plans
        .into_iter()
        .map(|p| {
            let days = days_by_plan.remove(&p.id).unwrap_or_default();
            let total_volume = days
                .iter()
                .flat_map(|d| d.exercises.iter())
                .map(|e| e.total_volume)
                .sum();
            WorkoutPlanResponse {
                id: p.id,
                name: p.name,
                client_id: p.client_id,
                week_number: p.week_number,
                start_date: p.start_date,
                notes: p.notes,
                created_by: p.created_by,
                created_at: p.created_at,
                updated_at: p.updated_at,
                total_volume,
                days,
            }
        })
        .collect()
}

/// Converts a stored tree back into write inputs, dropping ids.
pub fn plan_to_inputs(plan: &WorkoutPlanResponse) -> Vec<WorkoutDayInput> {
    plan.days
        .iter()
        .map(|d| WorkoutDayInput {
            day_name: d.day_name.clone(),
            is_rest_day: d.is_rest_day,
            notes: d.notes.clone(),
            exercises: d
                .exercises
                .iter()
                .map(|e| ExerciseInput {
                    name: e.name.clone(),
                    rest_seconds: e.rest_seconds,
                    notes: e.notes.clone(),
                    sets: e
                        .sets
                        .iter()
                        .map(|s| SetInput {
                            target_reps: s.target_reps,
                            actual_reps: s.actual_reps,
                            weight: s.weight,
                        })
                        .collect(),
                })
                .collect(),
        })
        .collect()
}

pub async fn load_plans(db: &PgPool, plans: Vec<WorkoutPlanRow>) -> AppResult<Vec<WorkoutPlanResponse>> {
    if plans.is_empty() {
        return Ok(Vec::new());
    }
    let ids: Vec<Uuid> = plans.iter().map(|p| p.id).collect();
    let days = repo::list_days(db, &ids).await?;
    let exercises = repo::list_exercises(db, &ids).await?;
    let sets = repo::list_sets(db, &ids).await?;
    Ok(assemble_plans(plans, days, exercises, sets))
}

pub async fn load_plan(db: &PgPool, id: Uuid) -> AppResult<Option<WorkoutPlanResponse>> {
    let Some(plan) = repo::find_plan(db, id).await? else {
        return Ok(None);
    };
    Ok(load_plans(db, vec![plan]).await?.into_iter().next())
}

async fn load_existing(db: &PgPool, id: Uuid) -> AppResult<WorkoutPlanResponse> {
    load_plan(db, id)
        .await?
        .ok_or_else(|| AppError::not_found("Workout plan"))
}

/// Creates the plan and its whole tree in one transaction.
pub async fn create_plan(
    db: &PgPool,
    created_by: Uuid,
    req: &CreateWorkoutPlanRequest,
) -> AppResult<WorkoutPlanResponse> {
    let mut tx = db.begin().await?;
    let plan = repo::insert_plan_tx(
        &mut tx,
        &NewWorkoutPlan {
            name: req.name.trim(),
            client_id: req.client_id,
            week_number: req.week_number.unwrap_or(1),
            start_date: req.start_date.unwrap_or_else(OffsetDateTime::now_utc),
            notes: req.notes.as_deref(),
            created_by: Some(created_by),
        },
    )
    .await?;
    repo::insert_days_tx(&mut tx, plan.id, &req.days).await?;
    tx.commit().await?;

    info!(plan_id = %plan.id, client_id = %plan.client_id, days = req.days.len(), "workout plan created");
    load_existing(db, plan.id).await
}

/// Rewrites the header and replaces every child row wholesale, atomically.
pub async fn replace_plan(
    db: &PgPool,
    id: Uuid,
    req: &UpdateWorkoutPlanRequest,
) -> AppResult<WorkoutPlanResponse> {
    let mut tx = db.begin().await?;
    let plan = repo::update_plan_header_tx(
        &mut tx,
        id,
        req.name.trim(),
        req.week_number,
        req.start_date,
        req.notes.as_deref(),
    )
    .await?
    .ok_or_else(|| AppError::not_found("Workout plan"))?;
    let removed = repo::delete_days_tx(&mut tx, plan.id).await?;
    repo::insert_days_tx(&mut tx, plan.id, &req.days).await?;
    tx.commit().await?;

    info!(plan_id = %plan.id, removed_days = removed, days = req.days.len(), "workout plan replaced");
    load_existing(db, plan.id).await
}

/// Deep-copies `source` for `target_client_id`, restarting at week 1 today.
pub async fn duplicate_plan(
    db: &PgPool,
    source: &WorkoutPlanResponse,
    target_client_id: Uuid,
    created_by: Uuid,
) -> AppResult<WorkoutPlanResponse> {
    let days = plan_to_inputs(source);

    let mut tx = db.begin().await?;
    let plan = repo::insert_plan_tx(
        &mut tx,
        &NewWorkoutPlan {
            name: &source.name,
            client_id: target_client_id,
            week_number: 1,
            start_date: OffsetDateTime::now_utc(),
            notes: source.notes.as_deref(),
            created_by: Some(created_by),
        },
    )
    .await?;
    repo::insert_days_tx(&mut tx, plan.id, &days).await?;
    tx.commit().await?;

    info!(source_id = %source.id, plan_id = %plan.id, %target_client_id, "workout plan duplicated");
    load_existing(db, plan.id).await
}
