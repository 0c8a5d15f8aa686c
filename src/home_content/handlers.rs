use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, patch},
    Json, Router,
};
use tracing::{info, instrument};
use uuid::Uuid;
use validator::Validate;

use crate::{
    auth::AdminUser,
    error::{AppError, AppResult},
    extract::AppJson,
    state::AppState,
};

use super::{
    dto::{HomeContentRequest, HomeContentResponse},
    repo, services,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/home-content", get(get_current).post(upsert))
        .route("/home-content/history", get(history))
        .route("/home-content/:id", patch(update).delete(delete))
}

#[instrument(skip(state))]
pub async fn get_current(State(state): State<AppState>) -> AppResult<Json<HomeContentResponse>> {
    let row = repo::latest(&state.db)
        .await?
        .ok_or_else(|| AppError::not_found("Home content"))?;
    Ok(Json(row.into()))
}

#[instrument(skip(state, payload))]
pub async fn upsert(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    AppJson(payload): AppJson<HomeContentRequest>,
) -> AppResult<(StatusCode, Json<HomeContentResponse>)> {
    payload.validate()?;
    let (row, created) = services::upsert(&state.db, &payload).await?;
    let status = if created { StatusCode::CREATED } else { StatusCode::OK };
    Ok((status, Json(row.into())))
}

#[instrument(skip(state))]
pub async fn history(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
) -> AppResult<Json<Vec<HomeContentResponse>>> {
    let rows = repo::history(&state.db).await?;
    Ok(Json(rows.into_iter().map(HomeContentResponse::from).collect()))
}

#[instrument(skip(state, payload))]
pub async fn update(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    Path(id): Path<Uuid>,
    AppJson(payload): AppJson<HomeContentRequest>,
) -> AppResult<Json<HomeContentResponse>> {
    payload.validate()?;
    let row = repo::update(&state.db, id, &payload)
        .await?
        .ok_or_else(|| AppError::not_found("Home content"))?;
    Ok(Json(row.into()))
}

#[instrument(skip(state))]
pub async fn delete(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    if !repo::delete(&state.db, id).await? {
        return Err(AppError::not_found("Home content"));
    }
    info!(home_content_id = %id, admin_id = %admin.id, "home content deleted");
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http::Request};
    use tower::ServiceExt;

    #[tokio::test]
    async fn anonymous_upsert_is_unauthorized() {
        let res = routes()
            .with_state(AppState::fake())
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/home-content")
                    .header("content-type", "application/json")
                    .body(Body::from(r#"{"heroTitle":"Hi"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }
}
