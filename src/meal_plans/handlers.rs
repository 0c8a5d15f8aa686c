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
        CreateMealPlanRequest, DuplicateMealPlanRequest, MealPlanFilter, MealPlanListItem,
        MealPlanResponse, UpdateMealPlanRequest,
    },
    repo, services,
};

type Created<T> = (StatusCode, [(header::HeaderName, String); 1], Json<T>);

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/meal-plans", get(list_plans).post(create_plan))
        .route("/meal-plans/client/:client_id", get(list_client_plans))
        .route(
            "/meal-plans/:id",
            get(get_plan).put(update_plan).delete(delete_plan),
        )
        .route("/meal-plans/:id/duplicate", post(duplicate_plan))
}

fn created(plan: MealPlanResponse) -> Created<MealPlanResponse> {
    (
        StatusCode::CREATED,
        [(header::LOCATION, format!("/api/v1/meal-plans/{}", plan.id))],
        Json(plan),
    )
}

#[instrument(skip(state))]
pub async fn list_plans(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(p): Query<Pagination>,
    Query(filter): Query<MealPlanFilter>,
) -> AppResult<Json<Paginated<MealPlanListItem>>> {
    let p = p.normalized();
    let client_id = scope_client_filter(&auth, filter.client_id)?;
    let rows = repo::list_plan_summaries(&state.db, client_id, p.limit, p.offset()).await?;
    let total = repo::count_plans(&state.db, client_id).await?;
    Ok(Json(Paginated::new(rows, total, p).map(MealPlanListItem::from)))
}

#[instrument(skip(state))]
pub async fn list_client_plans(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(client_id): Path<Uuid>,
) -> AppResult<Json<Vec<MealPlanResponse>>> {
    ensure_owner_or_admin(&auth, client_id)?;
    let plans = repo::list_plans_by_client(&state.db, client_id).await?;
    Ok(Json(services::load_plans(&state.db, plans).await?))
}

#[instrument(skip(state))]
pub async fn get_plan(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<MealPlanResponse>> {
    let plan = services::load_plan(&state.db, id)
        .await?
        .ok_or_else(|| AppError::not_found("Meal plan"))?;
    ensure_owner_or_admin(&auth, plan.client_id)?;
    Ok(Json(plan))
}

#[instrument(skip(state, payload))]
pub async fn create_plan(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    AppJson(payload): AppJson<CreateMealPlanRequest>,
) -> AppResult<Created<MealPlanResponse>> {
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
    AppJson(payload): AppJson<UpdateMealPlanRequest>,
) -> AppResult<Json<MealPlanResponse>> {
    payload.validate()?;
    let existing = repo::find_plan(&state.db, id)
        .await?
        .ok_or_else(|| AppError::not_found("Meal plan"))?;
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
        .ok_or_else(|| AppError::not_found("Meal plan"))?;
    ensure_owner_or_admin(&auth, existing.client_id)?;

    repo::delete_plan(&state.db, id).await?;
    info!(plan_id = %id, user_id = %auth.id, "meal plan deleted");
    Ok(StatusCode::NO_CONTENT)
}

#[instrument(skip(state))]
pub async fn duplicate_plan(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(id): Path<Uuid>,
    AppJson(payload): AppJson<DuplicateMealPlanRequest>,
) -> AppResult<Created<MealPlanResponse>> {
    let source = services::load_plan(&state.db, id)
        .await?
        .ok_or_else(|| AppError::not_found("Meal plan"))?;
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
        let body = serde_json::json!({ "name": "Cut", "clientId": Uuid::new_v4() });
        let res = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/meal-plans")
                    .header("authorization", format!("Bearer {token}"))
                    .header("content-type", "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::FORBIDDEN);
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
                    .uri(format!("/meal-plans/client/{}", Uuid::new_v4()))
                    .header("authorization", format!("Bearer {token}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn duplicate_requires_admin() {
        let (app, state) = app();
        let token = JwtKeys::from_ref(&state)
            .sign_access(&sample_user(Role::Client))
            .unwrap();
        let body = serde_json::json!({ "targetClientId": Uuid::new_v4() });
        let res = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri(format!("/meal-plans/{}/duplicate", Uuid::new_v4()))
                    .header("authorization", format!("Bearer {token}"))
                    .header("content-type", "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::FORBIDDEN);
    }
}
