use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    routing::get,
    Json, Router,
};
use time::OffsetDateTime;
use tracing::{info, instrument};
use uuid::Uuid;
use validator::Validate;

use crate::{
    auth::{
        policy::{ensure_owner_or_admin, scope_client_filter},
        AuthUser,
    },
    error::{AppError, AppResult},
    extract::AppJson,
    pagination::{Paginated, Pagination},
    state::AppState,
    users::services::require_client,
};

use super::{
    dto::{
        CreateWeightRecordRequest, UpdateWeightRecordRequest, WeightChart, WeightRecordFilter,
        WeightRecordResponse,
    },
    repo,
    repo_types::{WeightRecordChanges, WeightRecordRow},
    services,
};

type Created<T> = (StatusCode, [(header::HeaderName, String); 1], Json<T>);

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/weight-records", get(list_records).post(create_record))
        .route("/weight-records/client/:client_id", get(list_client_records))
        .route("/weight-records/client/:client_id/chart", get(client_chart))
        .route(
            "/weight-records/:id",
            get(get_record).patch(update_record).delete(delete_record),
        )
}

async fn load_owned(state: &AppState, auth: &AuthUser, id: Uuid) -> AppResult<WeightRecordRow> {
    let row = repo::find(&state.db, id)
        .await?
        .ok_or_else(|| AppError::not_found("Weight record"))?;
    ensure_owner_or_admin(auth, row.client_id)?;
    Ok(row)
}

#[instrument(skip(state, payload))]
pub async fn create_record(
    State(state): State<AppState>,
    auth: AuthUser,
    AppJson(payload): AppJson<CreateWeightRecordRequest>,
) -> AppResult<Created<WeightRecordResponse>> {
    payload.validate()?;

    let client_id = if auth.is_admin() {
        let id = payload
            .client_id
            .ok_or_else(|| AppError::BadRequest("clientId is required".into()))?;
        require_client(&state.db, id).await?;
        id
    } else {
        let id = payload.client_id.unwrap_or(auth.id);
        ensure_owner_or_admin(&auth, id)?;
        id
    };

    let row = repo::insert(
        &state.db,
        client_id,
        payload.weight,
        payload.recorded_at.unwrap_or_else(OffsetDateTime::now_utc),
        payload.notes.as_deref(),
    )
    .await?;
    info!(record_id = %row.id, %client_id, weight = row.weight, "weight recorded");

    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, format!("/api/v1/weight-records/{}", row.id))],
        Json(row.into()),
    ))
}

#[instrument(skip(state))]
pub async fn list_records(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(p): Query<Pagination>,
    Query(filter): Query<WeightRecordFilter>,
) -> AppResult<Json<Paginated<WeightRecordResponse>>> {
    let p = p.normalized();
    let client_id = scope_client_filter(&auth, filter.client_id)?;
    let rows = repo::list(&state.db, client_id, filter.from, filter.to, p.limit, p.offset()).await?;
    let total = repo::count(&state.db, client_id, filter.from, filter.to).await?;
    Ok(Json(Paginated::new(rows, total, p).map(WeightRecordResponse::from)))
}

#[instrument(skip(state))]
pub async fn list_client_records(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(client_id): Path<Uuid>,
) -> AppResult<Json<Vec<WeightRecordResponse>>> {
    ensure_owner_or_admin(&auth, client_id)?;
    let rows = repo::list_by_client(&state.db, client_id).await?;
    Ok(Json(rows.into_iter().map(WeightRecordResponse::from).collect()))
}

#[instrument(skip(state))]
pub async fn client_chart(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(client_id): Path<Uuid>,
) -> AppResult<Json<WeightChart>> {
    ensure_owner_or_admin(&auth, client_id)?;
    let rows = repo::list_by_client(&state.db, client_id).await?;
    Ok(Json(services::build_chart(rows)))
}

#[instrument(skip(state))]
pub async fn get_record(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<WeightRecordResponse>> {
    let row = load_owned(&state, &auth, id).await?;
    Ok(Json(row.into()))
}

#[instrument(skip(state, payload))]
pub async fn update_record(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    AppJson(payload): AppJson<UpdateWeightRecordRequest>,
) -> AppResult<Json<WeightRecordResponse>> {
    payload.validate()?;
    load_owned(&state, &auth, id).await?;

    let changes = WeightRecordChanges {
        weight: payload.weight,
        recorded_at: payload.recorded_at,
        notes: payload.notes,
    };
    let row = repo::update(&state.db, id, &changes)
        .await?
        .ok_or_else(|| AppError::not_found("Weight record"))?;
    Ok(Json(row.into()))
}

#[instrument(skip(state))]
pub async fn delete_record(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    load_owned(&state, &auth, id).await?;
    repo::delete(&state.db, id).await?;
    info!(record_id = %id, user_id = %auth.id, "weight record deleted");
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{jwt::tests::sample_user, jwt::JwtKeys, Role};
    use axum::{body::Body, extract::FromRef, http::Request};
    use tower::ServiceExt;

    #[tokio::test]
    async fn client_cannot_log_weight_for_someone_else() {
        let state = AppState::fake();
        let token = JwtKeys::from_ref(&state)
            .sign_access(&sample_user(Role::Client))
            .unwrap();
        let body = serde_json::json!({ "clientId": Uuid::new_v4(), "weight": 70 });
        let res = routes()
            .with_state(state)
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/weight-records")
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
    async fn out_of_range_weight_is_bad_request() {
        let state = AppState::fake();
        let token = JwtKeys::from_ref(&state)
            .sign_access(&sample_user(Role::Client))
            .unwrap();
        let res = routes()
            .with_state(state)
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/weight-records")
                    .header("authorization", format!("Bearer {token}"))
                    .header("content-type", "application/json")
                    .body(Body::from(r#"{"weight":0}"#))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn chart_of_another_client_is_forbidden() {
        let state = AppState::fake();
        let token = JwtKeys::from_ref(&state)
            .sign_access(&sample_user(Role::Client))
            .unwrap();
        let res = routes()
            .with_state(state)
            .oneshot(
                Request::builder()
                    .uri(format!("/weight-records/client/{}/chart", Uuid::new_v4()))
                    .header("authorization", format!("Bearer {token}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::FORBIDDEN);
    }
}
