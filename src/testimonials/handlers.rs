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
    dto::{
        CreateTestimonialRequest, TestimonialFilter, TestimonialResponse, UpdateTestimonialRequest,
    },
    repo,
};

type Created<T> = (StatusCode, [(header::HeaderName, String); 1], Json<T>);

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/testimonials", get(list_testimonials).post(create_testimonial))
        .route(
            "/testimonials/:id",
            get(get_testimonial)
                .patch(update_testimonial)
                .delete(delete_testimonial),
        )
        .route("/testimonials/:id/toggle-publish", patch(toggle_publish))
}

#[instrument(skip(state, viewer))]
pub async fn list_testimonials(
    State(state): State<AppState>,
    MaybeAuthUser(viewer): MaybeAuthUser,
    Query(p): Query<Pagination>,
    Query(filter): Query<TestimonialFilter>,
) -> AppResult<Json<Paginated<TestimonialResponse>>> {
    let p = p.normalized();
    let published = published_filter(viewer.as_ref(), filter.published);
    let rows = repo::list(&state.db, published, p.limit, p.offset()).await?;
    let total = repo::count(&state.db, published).await?;
    Ok(Json(Paginated::new(rows, total, p).map(TestimonialResponse::from)))
}

#[instrument(skip(state, viewer))]
pub async fn get_testimonial(
    State(state): State<AppState>,
    MaybeAuthUser(viewer): MaybeAuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<TestimonialResponse>> {
    let row = repo::find(&state.db, id)
        .await?
        .filter(|t| t.is_published || viewer.as_ref().is_some_and(|u| u.is_admin()))
        .ok_or_else(|| AppError::not_found("Testimonial"))?;
    Ok(Json(row.into()))
}

#[instrument(skip(state, payload))]
pub async fn create_testimonial(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    AppJson(payload): AppJson<CreateTestimonialRequest>,
) -> AppResult<Created<TestimonialResponse>> {
    payload.validate()?;
    let row = repo::insert(&state.db, &payload).await?;
    info!(testimonial_id = %row.id, published = row.is_published, "testimonial created");
    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, format!("/api/v1/testimonials/{}", row.id))],
        Json(row.into()),
    ))
}

#[instrument(skip(state, payload))]
pub async fn update_testimonial(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    Path(id): Path<Uuid>,
    AppJson(payload): AppJson<UpdateTestimonialRequest>,
) -> AppResult<Json<TestimonialResponse>> {
    payload.validate()?;
    let row = repo::update(&state.db, id, &payload)
        .await?
        .ok_or_else(|| AppError::not_found("Testimonial"))?;
    Ok(Json(row.into()))
}

#[instrument(skip(state))]
pub async fn toggle_publish(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<TestimonialResponse>> {
    let row = repo::toggle_published(&state.db, id)
        .await?
        .ok_or_else(|| AppError::not_found("Testimonial"))?;
    info!(testimonial_id = %id, published = row.is_published, "testimonial publish toggled");
    Ok(Json(row.into()))
}

#[instrument(skip(state))]
pub async fn delete_testimonial(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    if !repo::delete(&state.db, id).await? {
        return Err(AppError::not_found("Testimonial"));
    }
    info!(testimonial_id = %id, admin_id = %admin.id, "testimonial deleted");
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{jwt::tests::sample_user, jwt::JwtKeys, Role};
    use axum::{body::Body, extract::FromRef, http::Request};
    use tower::ServiceExt;

    #[tokio::test]
    async fn toggle_requires_admin() {
        let state = AppState::fake();
        let token = JwtKeys::from_ref(&state)
            .sign_access(&sample_user(Role::Client))
            .unwrap();
        let res = routes()
            .with_state(state)
            .oneshot(
                Request::builder()
                    .method("PATCH")
                    .uri(format!("/testimonials/{}/toggle-publish", Uuid::new_v4()))
                    .header("authorization", format!("Bearer {token}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn public_list_rejects_a_bad_token() {
        let res = routes()
            .with_state(AppState::fake())
            .oneshot(
                Request::builder()
                    .uri("/testimonials")
                    .header("authorization", "Bearer garbage")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }
}
