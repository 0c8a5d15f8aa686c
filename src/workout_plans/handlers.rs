use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    routing::{get, post},
    Json, Router,
};
use tracing::{info, instrument};
use uuid::Uuid;
use validator::Validate;

use crate::{
    auth::{
        policy::{ensure_owner_or_admin, scope_client_filter},
        AdminUser, AuthUser,
    },
    error::{AppError, AppResult},
    extract::AppJson,
    pagination::{Paginated, Pagination},
    state::AppState,
    users::services::require_client,
};

use super::{
    dto::{
        CreateWorkoutPlanRequest, DuplicatePlanRequest, PlanFilter, UpdateWorkoutPlanRequest,
        WorkoutPlanListItem, WorkoutPlanResponse,
    },
    repo, services,
};

type Created<T> = (StatusCode, [(header::HeaderName, String); 1], Json<T>);

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/workout-plans", get(list_plans).post(create_plan))
        .route("/workout-plans/client/:client_id", get(list_client_plans))
        .route(
            "/workout-plans/:id",
            get(get_plan).put(update_plan).delete(delete_plan),
        )
        .route("/workout-plans/:id/duplicate", post(duplicate_plan))
}

fn created(plan: WorkoutPlanResponse) -> Created<WorkoutPlanResponse> {
    (
        StatusCode::CREATED,
        [(header::LOCATION, format!("/api/v1/workout-plans/{}", plan.id))],
        Json(plan),
    )
}

#[instrument(skip(state))]
pub async fn list_plans(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(p): Query<Pagination>,
    Query(filter): Query<PlanFilter>,
) -> AppResult<Json<Paginated<WorkoutPlanListItem>>> {
    let p = p.normalized();
    let client_id = scope_client_filter(&auth, filter.client_id)?;
    let rows = repo::list_plan_summaries(&state.db, client_id, p.limit, p.offset()).await?;
    let total = repo::count_plans(&state.db, client_id).await?;
    Ok(Json(Paginated::new(rows, total, p).map(WorkoutPlanListItem::from)))
}

#[instrument(skip(state))]
pub async fn list_client_plans(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(client_id): Path<Uuid>,
) -> AppResult<Json<Vec<WorkoutPlanResponse>>> {
    ensure_owner_or_admin(&auth, client_id)?;
    let plans = repo::list_plans_by_client(&state.db, client_id).await?;
    Ok(Json(services::load_plans(&state.db, plans).await?))
}

#[instrument(skip(state))]
pub async fn get_plan(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<WorkoutPlanResponse>> {
    let plan = services::load_plan(&state.db, id)
        .await?
        .ok_or_else(|| AppError::not_found("Workout plan"))?;
    ensure_owner_or_admin(&auth, plan.client_id)?;
    Ok(Json(plan))
}

#[instrument(skip(state, payload))]
pub async fn create_plan(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    AppJson(payload): AppJson<CreateWorkoutPlanRequest>,
) -> AppResult<Created<WorkoutPlanResponse>> {
    payload.validate()?;
    require_client(&state.db, payload.client_id).await?;

    let plan = services::create_plan(&state.db, admin.id, &payload).await?;
    Ok(created(plan))
}

#[instrument(skip(state, payload))]
pub async fn update_plan(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    AppJson(payload): AppJson<UpdateWorkoutPlanRequest>,
) -> AppResult<Json<WorkoutPlanResponse>> {
    payload.validate()?;
    let existing = repo::find_plan(&state.db, id)
        .await?
        .ok_or_else(|| AppError::not_found("Workout plan"))?;
    ensure_owner_or_admin(&auth, existing.client_id)?;

    let plan = services::replace_plan(&state.db, id, &payload).await?;
    Ok(Json(plan))
}

#[instrument(skip(state))]
pub async fn delete_plan(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    let existing = repo::find_plan(&state.db, id)
        .await?
        .ok_or_else(|| AppError::not_found("Workout plan"))?;
    ensure_owner_or_admin(&auth, existing.client_id)?;

    repo::delete_plan(&state.db, id).await?;
    info!(plan_id = %id, user_id = %auth.id, "workout plan deleted");
    Ok(StatusCode::NO_CONTENT)
}

#[instrument(skip(state))]
pub async fn duplicate_plan(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(id): Path<Uuid>,
    AppJson(payload): AppJson<DuplicatePlanRequest>,
) -> AppResult<Created<WorkoutPlanResponse>> {
    let source = services::load_plan(&state.db, id)
        .await?
        .ok_or_else(|| AppError::not_found("Workout plan"))?;
    require_client(&state.db, payload.target_client_id).await?;

    let plan =
        services::duplicate_plan(&state.db, &source, payload.target_client_id, admin.id).await?;
    Ok(created(plan))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{jwt::tests::sample_user, jwt::JwtKeys, Role};
    use axum::{body::Body, extract::FromRef, http::Request};
    use tower::ServiceExt;

    fn app() -> (Router, AppState) {
        let state = AppState::fake();
        (routes().with_state(state.clone()), state)
    }

    #[tokio::test]
    async fn create_requires_admin() {
        let (app, state) = app();
        let token = JwtKeys::from_ref(&state)
            .sign_access(&sample_user(Role::Client))
            .unwrap();
        let body = serde_json::json!({ "name": "Week 1", "clientId": Uuid::new_v4() });
        let res = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/workout-plans")
                    .header("authorization", format!("Bearer {token}"))
                    .header("content-type", "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::FORBIDDEN);
    }

    async fn post_as_admin(body: String) -> (StatusCode, serde_json::Value) {
        let (app, state) = app();
        let token = JwtKeys::from_ref(&state)
            .sign_access(&sample_user(Role::Admin))
            .unwrap();
        let res = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/workout-plans")
                    .header("authorization", format!("Bearer {token}"))
                    .header("content-type", "application/json")
                    .body(Body::from(body))
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = res.status();
        let bytes = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn create_without_name_is_a_bad_request() {
        let body = serde_json::json!({ "clientId": Uuid::new_v4() });
        let (status, v) = post_as_admin(body.to_string()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(v["statusCode"], 400);
        assert!(v["fields"]["name"].is_array());
    }

    #[tokio::test]
    async fn create_with_mistyped_nested_field_names_its_path() {
        let body = serde_json::json!({
            "name": "Week 1",
            "clientId": Uuid::new_v4(),
            "days": [{ "dayName": "Mon", "isRestDay": "yes" }]
        });
        let (status, v) = post_as_admin(body.to_string()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(v["fields"]["days[0].isRestDay"].is_array());
    }

    #[tokio::test]
    async fn create_with_broken_json_is_a_bad_request() {
        let (status, v) = post_as_admin("{\"name\": ".into()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(v["error"], "Bad Request");
    }

    #[tokio::test]
    async fn client_cannot_list_another_clients_plans() {
        let (app, state) = app();
        let token = JwtKeys::from_ref(&state)
            .sign_access(&sample_user(Role::Client))
            .unwrap();
        let res = app
            .oneshot(
                Request::builder()
                    .uri(format!("/workout-plans/client/{}", Uuid::new_v4()))
                    .header("authorization", format!("Bearer {token}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn listing_without_token_is_unauthorized() {
        let (app, _) = app();
        let res = app
            .oneshot(Request::builder().uri("/workout-plans").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }
}
