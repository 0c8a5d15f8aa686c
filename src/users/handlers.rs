use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    routing::{get, patch},
    Json, Router,
};
use tracing::{info, instrument, warn};
use uuid::Uuid;
use validator::Validate;

use crate::{
    auth::{
        dto::PublicUser,
        password::hash_password,
        policy::ensure_owner_or_admin,
        repo_types::{NewUser, User, UserChanges},
        services::normalize_email,
        AdminUser, AuthUser,
    },
    error::{AppError, AppResult},
    extract::AppJson,
    pagination::{Paginated, Pagination},
    state::AppState,
};

use super::dto::{CreateUserRequest, SetRoleRequest, UpdateUserRequest, UserFilter};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/users", get(list_users).post(create_user))
        .route("/users/clients", get(list_clients))
        .route(
            "/users/:id",
            get(get_user).patch(update_user).delete(delete_user),
        )
        .route("/users/:id/role", patch(set_role))
}

#[instrument(skip(state))]
pub async fn list_users(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    Query(p): Query<Pagination>,
    Query(filter): Query<UserFilter>,
) -> AppResult<Json<Paginated<PublicUser>>> {
    let p = p.normalized();
    let search = filter.q.as_deref().map(str::trim).filter(|s| !s.is_empty());
    let rows = User::list(&state.db, filter.role, search, p.limit, p.offset()).await?;
    let total = User::count(&state.db, filter.role, search).await?;
    Ok(Json(Paginated::new(rows, total, p).map(PublicUser::from)))
}

#[instrument(skip(state))]
pub async fn list_clients(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
) -> AppResult<Json<Vec<PublicUser>>> {
    let rows = User::list_clients(&state.db).await?;
    Ok(Json(rows.into_iter().map(PublicUser::from).collect()))
}

#[instrument(skip(state))]
pub async fn get_user(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<PublicUser>> {
    let user = User::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| AppError::not_found("User"))?;
    ensure_owner_or_admin(&auth, user.id)?;
    Ok(Json(PublicUser::from(user)))
}

#[instrument(skip(state, payload))]
pub async fn create_user(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    AppJson(mut payload): AppJson<CreateUserRequest>,
) -> AppResult<(StatusCode, [(header::HeaderName, String); 1], Json<PublicUser>)> {
    payload.email = normalize_email(&payload.email);
    payload.username = payload.username.trim().to_string();
    payload.validate()?;

    let hash = hash_password(&payload.password)?;
    let user = User::create(
        &state.db,
        &NewUser {
            username: &payload.username,
            email: &payload.email,
            password_hash: &hash,
            full_name: payload.full_name.trim(),
            phone: payload.phone.as_deref(),
            role: payload.role,
        },
    )
    .await?;

    info!(admin_id = %admin.id, user_id = %user.id, role = ?user.role, "user created by admin");
    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, format!("/api/v1/users/{}", user.id))],
        Json(PublicUser::from(user)),
    ))
}

#[instrument(skip(state, payload))]
pub async fn update_user(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    AppJson(mut payload): AppJson<UpdateUserRequest>,
) -> AppResult<Json<PublicUser>> {
    payload.email = payload.email.as_deref().map(normalize_email);
    payload.username = payload.username.map(|u| u.trim().to_string());
    payload.validate()?;

    let existing = User::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| AppError::not_found("User"))?;
    ensure_owner_or_admin(&auth, existing.id)?;

    let password_hash = match payload.password.as_deref() {
        Some(_) if !auth.is_admin() => {
            return Err(AppError::Forbidden(
                "Use /me/password to change your own password".into(),
            ))
        }
        Some(plain) => Some(hash_password(plain)?),
        None => None,
    };

    let changes = UserChanges {
        username: payload.username,
        email: payload.email,
        full_name: payload.full_name,
        phone: payload.phone,
        password_hash,
    };
    let user = User::update(&state.db, id, &changes)
        .await?
        .ok_or_else(|| AppError::not_found("User"))?;
    Ok(Json(PublicUser::from(user)))
}

#[instrument(skip(state))]
pub async fn set_role(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(id): Path<Uuid>,
    AppJson(payload): AppJson<SetRoleRequest>,
) -> AppResult<Json<PublicUser>> {
    if User::find_by_id(&state.db, id).await?.is_none() {
        return Err(AppError::not_found("User"));
    }
    if id == admin.id && payload.role != crate::auth::Role::Admin {
        warn!(admin_id = %admin.id, "admin tried to demote self");
        return Err(AppError::BadRequest("You cannot change your own role".into()));
    }

    let user = User::set_role(&state.db, id, payload.role)
        .await?
        .ok_or_else(|| AppError::not_found("User"))?;
    info!(admin_id = %admin.id, user_id = %user.id, role = ?user.role, "user role changed");
    Ok(Json(PublicUser::from(user)))
}

#[instrument(skip(state))]
pub async fn delete_user(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    if User::find_by_id(&state.db, id).await?.is_none() {
        return Err(AppError::not_found("User"));
    }
    if id == admin.id {
        return Err(AppError::BadRequest("You cannot delete your own account".into()));
    }

    User::delete(&state.db, id).await?;
    info!(admin_id = %admin.id, user_id = %id, "user deleted");
    Ok(StatusCode::NO_CONTENT)
}
