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
    dto::{ContactInfoRequest, ContactInfoResponse},
    repo, services,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/contact-info", get(get_current).post(upsert))
        .route("/contact-info/history", get(history))
        .route("/contact-info/:id", patch(update).delete(delete))
}

#[instrument(skip(state))]
pub async fn get_current(State(state): State<AppState>) -> AppResult<Json<ContactInfoResponse>> {
    let row = repo::latest(&state.db)
        .await?
        .ok_or_else(|| AppError::not_found("Contact info"))?;
    Ok(Json(row.into()))
}

#[instrument(skip(state, payload))]
pub async fn upsert(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    AppJson(payload): AppJson<ContactInfoRequest>,
) -> AppResult<(StatusCode, Json<ContactInfoResponse>)> {
    payload.validate()?;
    let (row, created) = services::upsert(&state.db, &payload).await?;
    let status = if created { StatusCode::CREATED } else { StatusCode::OK };
    Ok((status, Json(row.into())))
}

#[instrument(skip(state))]
pub async fn history(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
) -> AppResult<Json<Vec<ContactInfoResponse>>> {
    let rows = repo::history(&state.db).await?;
    Ok(Json(rows.into_iter().map(ContactInfoResponse::from).collect()))
}

#[instrument(skip(state, payload))]
pub async fn update(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    Path(id): Path<Uuid>,
    AppJson(payload): AppJson<ContactInfoRequest>,
) -> AppResult<Json<ContactInfoResponse>> {
    payload.validate()?;
    let row = repo::update(&state.db, id, &payload)
        .await?
        .ok_or_else(|| AppError::not_found("Contact info"))?;
    Ok(Json(row.into()))
}

#[instrument(skip(state))]
pub async fn delete(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    if !repo::delete(&state.db, id).await? {
        return Err(AppError::not_found("Contact info"));
    }
    info!(contact_id = %id, admin_id = %admin.id, "contact info deleted");
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{jwt::tests::sample_user, jwt::JwtKeys, Role};
    use axum::{body::Body, extract::FromRef, http::Request};
    use tower::ServiceExt;

    #[tokio::test]
    async fn history_requires_admin() {
        let state = AppState::fake();
        let token = JwtKeys::from_ref(&state)
            .sign_access(&sample_user(Role::Client))
            .unwrap();
        let res = routes()
            .with_state(state)
            .oneshot(
                Request::builder()
                    .uri("/contact-info/history")
                    .header("authorization", format!("Bearer {token}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::FORBIDDEN);
    }
}
