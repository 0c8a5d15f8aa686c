use axum::{
    extract::{Path, State},
    routing::{get, patch, put},
    Json, Router,
};
use tracing::{info, instrument};
use uuid::Uuid;
use validator::Validate;

use crate::{
    auth::{policy::ensure_owner_or_admin, AuthUser},
    error::{AppError, AppResult},
    extract::AppJson,
    state::AppState,
    workout_plans::dto::ExerciseSetResponse,
};

use super::{
    dto::{ExerciseDetails, LogSetBatchItem, LogSetRequest},
    repo::{self, OwnedExerciseRow},
    services,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/exercises/:id", get(get_exercise))
        .route("/exercises/:id/sets", put(log_sets))
        .route("/exercises/:id/sets/:set_id", patch(log_set))
}

async fn load_owned(state: &AppState, auth: &AuthUser, id: Uuid) -> AppResult<OwnedExerciseRow> {
    let exercise = repo::find_exercise(&state.db, id)
        .await?
        .ok_or_else(|| AppError::not_found("Exercise"))?;
    ensure_owner_or_admin(auth, exercise.client_id)?;
    Ok(exercise)
}

#[instrument(skip(state))]
pub async fn get_exercise(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ExerciseDetails>> {
    let exercise = load_owned(&state, &auth, id).await?;
    let sets: Vec<ExerciseSetResponse> = repo::list_sets(&state.db, id)
        .await?
        .into_iter()
        .map(ExerciseSetResponse::from)
        .collect();

    Ok(Json(ExerciseDetails {
        id: exercise.id,
        day_id: exercise.day_id,
        plan_id: exercise.plan_id,
        client_id: exercise.client_id,
        name: exercise.name,
        exercise_order: exercise.exercise_order,
        rest_seconds: exercise.rest_seconds,
        notes: exercise.notes,
        total_volume: sets.iter().map(|s| s.volume).sum(),
        sets,
    }))
}

#[instrument(skip(state, payload))]
pub async fn log_set(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((id, set_id)): Path<(Uuid, Uuid)>,
    AppJson(payload): AppJson<LogSetRequest>,
) -> AppResult<Json<ExerciseSetResponse>> {
    payload.validate()?;
    let exercise = load_owned(&state, &auth, id).await?;

    let mut rows = services::log_sets(&state.db, exercise.id, &[(set_id, payload)]).await?;
    let row = rows.pop().ok_or_else(|| AppError::not_found("Set"))?;
    info!(exercise_id = %exercise.id, set_id = %row.id, volume = row.volume, "set performance logged");
    Ok(Json(ExerciseSetResponse::from(row)))
}

#[instrument(skip(state, payload))]
pub async fn log_sets(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    AppJson(payload): AppJson<Vec<LogSetBatchItem>>,
) -> AppResult<Json<Vec<ExerciseSetResponse>>> {
    for item in &payload {
        item.validate()?;
    }
    let exercise = load_owned(&state, &auth, id).await?;

    let entries: Vec<(Uuid, LogSetRequest)> = payload
        .into_iter()
        .map(|i| (i.set_id, i.performance))
        .collect();
    let rows = services::log_sets(&state.db, exercise.id, &entries).await?;
    info!(exercise_id = %exercise.id, sets = rows.len(), "set performance logged");
    Ok(Json(rows.into_iter().map(ExerciseSetResponse::from).collect()))
}
