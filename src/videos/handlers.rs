use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    routing::{get, patch},
    Json, Router,
};
use tracing::{info, instrument};
use uuid::Uuid;
use validator::Validate;

use crate::{
    auth::{policy::published_filter, AdminUser, MaybeAuthUser},
    error::{AppError, AppResult},
    extract::AppJson,
    pagination::{Paginated, Pagination},
    state::AppState,
};

use super::{
    dto::{CreateVideoRequest, UpdateVideoRequest, VideoFilter, VideoResponse},
    repo,
};

type Created<T> = (StatusCode, [(header::HeaderName, String); 1], Json<T>);

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/videos", get(list_videos).post(create_video))
        .route("/videos/categories", get(list_categories))
        .route(
            "/videos/:id",
            get(get_video).patch(update_video).delete(delete_video),
        )
        .route("/videos/:id/toggle-publish", patch(toggle_publish))
}

#[instrument(skip(state, viewer))]
pub async fn list_videos(
    State(state): State<AppState>,
    MaybeAuthUser(viewer): MaybeAuthUser,
    Query(p): Query<Pagination>,
    Query(filter): Query<VideoFilter>,
) -> AppResult<Json<Paginated<VideoResponse>>> {
    let p = p.normalized();
    let published = published_filter(viewer.as_ref(), filter.published);
    let category = filter.category.as_deref().map(str::trim).filter(|c| !c.is_empty());
    let rows = repo::list(&state.db, published, category, p.limit, p.offset()).await?;
    let total = repo::count(&state.db, published, category).await?;
    Ok(Json(Paginated::new(rows, total, p).map(VideoResponse::from)))
}

#[instrument(skip(state, viewer))]
pub async fn list_categories(
    State(state): State<AppState>,
    MaybeAuthUser(viewer): MaybeAuthUser,
) -> AppResult<Json<Vec<String>>> {
    let published = published_filter(viewer.as_ref(), None);
    Ok(Json(repo::categories(&state.db, published).await?))
}

#[instrument(skip(state, viewer))]
pub async fn get_video(
    State(state): State<AppState>,
    MaybeAuthUser(viewer): MaybeAuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<VideoResponse>> {
    let row = repo::find(&state.db, id)
        .await?
        .filter(|v| v.is_published || viewer.as_ref().is_some_and(|u| u.is_admin()))
        .ok_or_else(|| AppError::not_found("Video"))?;
    Ok(Json(row.into()))
}

#[instrument(skip(state, payload))]
pub async fn create_video(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    AppJson(payload): AppJson<CreateVideoRequest>,
) -> AppResult<Created<VideoResponse>> {
    payload.validate()?;
    let row = repo::insert(&state.db, &payload).await?;
    info!(video_id = %row.id, category = ?row.category, "video created");
    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, format!("/api/v1/videos/{}", row.id))],
        Json(row.into()),
    ))
}

#[instrument(skip(state, payload))]
pub async fn update_video(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    Path(id): Path<Uuid>,
    AppJson(payload): AppJson<UpdateVideoRequest>,
) -> AppResult<Json<VideoResponse>> {
    payload.validate()?;
    let row = repo::update(&state.db, id, &payload)
        .await?
        .ok_or_else(|| AppError::not_found("Video"))?;
    Ok(Json(row.into()))
}

#[instrument(skip(state))]
pub async fn toggle_publish(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<VideoResponse>> {
    let row = repo::toggle_published(&state.db, id)
        .await?
        .ok_or_else(|| AppError::not_found("Video"))?;
    info!(video_id = %id, published = row.is_published, "video publish toggled");
    Ok(Json(row.into()))
}

#[instrument(skip(state))]
pub async fn delete_video(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    if !repo::delete(&state.db, id).await? {
        return Err(AppError::not_found("Video"));
    }
    info!(video_id = %id, admin_id = %admin.id, "video deleted");
    Ok(StatusCode::NO_CONTENT)
}
