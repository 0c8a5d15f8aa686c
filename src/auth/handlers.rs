use axum::{
    extract::{FromRef, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::{info, instrument, warn};
use validator::Validate;

use crate::{
    auth::{
        dto::{
            AuthResponse, ChangePasswordRequest, LoginRequest, PublicUser, RefreshRequest,
            RegisterRequest, UpdateProfileRequest,
        },
        extractors::AuthUser,
        jwt::JwtKeys,
        password::{hash_password, needs_rehash, verify_password},
        repo_types::{NewUser, Role, User, UserChanges},
        services::{is_valid_email, issue_tokens, normalize_email},
    },
    error::{AppError, AppResult},
    extract::AppJson,
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/refresh", post(refresh))
}

pub fn me_routes() -> Router<AppState> {
    Router::new()
        .route("/me", get(get_me).patch(update_me))
        .route("/me/password", post(change_password))
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    AppJson(mut payload): AppJson<RegisterRequest>,
) -> AppResult<(StatusCode, Json<AuthResponse>)> {
    payload.email = normalize_email(&payload.email);
    payload.username = payload.username.trim().to_string();
    payload.validate()?;

    // Ensure email and username are not taken
    if User::find_by_email(&state.db, &payload.email).await?.is_some() {
        warn!(email = %payload.email, "email already registered");
        return Err(AppError::Conflict("Email already registered".into()));
    }
    if User::find_by_username(&state.db, &payload.username).await?.is_some() {
        warn!(username = %payload.username, "username already taken");
        return Err(AppError::Conflict("Username already taken".into()));
    }

    let hash = hash_password(&payload.password)?;
    let user = User::create(
        &state.db,
        &NewUser {
            username: &payload.username,
            email: &payload.email,
            password_hash: &hash,
            full_name: payload.full_name.trim(),
            phone: payload.phone.as_deref(),
            role: Role::Client,
        },
    )
    .await?;

    info!(user_id = %user.id, email = %user.email, "user registered");
    let keys = JwtKeys::from_ref(&state);
    Ok((StatusCode::CREATED, Json(issue_tokens(&keys, user)?)))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    AppJson(payload): AppJson<LoginRequest>,
) -> AppResult<Json<AuthResponse>> {
    payload.validate()?;
    let identifier = payload.identifier.trim();

    let found = if is_valid_email(identifier) {
        User::find_by_email(&state.db, &normalize_email(identifier)).await?
    } else {
        User::find_by_username(&state.db, identifier).await?
    };

    let Some(user) = found else {
        warn!(%identifier, "login unknown user");
        return Err(AppError::Unauthorized("Invalid credentials".into()));
    };

    if !verify_password(&payload.password, &user.password_hash)? {
        warn!(user_id = %user.id, "login invalid password");
        return Err(AppError::Unauthorized("Invalid credentials".into()));
    }

    if needs_rehash(&user.password_hash) {
        let changes = UserChanges {
            password_hash: Some(hash_password(&payload.password)?),
            ..Default::default()
        };
        User::update(&state.db, user.id, &changes).await?;
        info!(user_id = %user.id, "password hash upgraded");
    }

    info!(user_id = %user.id, role = ?user.role, "user logged in");
    let keys = JwtKeys::from_ref(&state);
    Ok(Json(issue_tokens(&keys, user)?))
}

#[instrument(skip(state, payload))]
pub async fn refresh(
    State(state): State<AppState>,
    AppJson(payload): AppJson<RefreshRequest>,
) -> AppResult<Json<AuthResponse>> {
    let keys = JwtKeys::from_ref(&state);
    let claims = keys
        .verify_refresh(&payload.refresh_token)
        .map_err(|e| AppError::Unauthorized(e.to_string()))?;

    // Reload so a role change takes effect on the next pair
    let user = User::find_by_id(&state.db, claims.sub)
        .await?
        .ok_or_else(|| AppError::Unauthorized("User not found".into()))?;

    Ok(Json(issue_tokens(&keys, user)?))
}

#[instrument(skip(state))]
pub async fn get_me(
    State(state): State<AppState>,
    auth: AuthUser,
) -> AppResult<Json<PublicUser>> {
    let user = User::find_by_id(&state.db, auth.id)
        .await?
        .ok_or_else(|| AppError::Unauthorized("User not found".into()))?;
    Ok(Json(PublicUser::from(user)))
}

#[instrument(skip(state, payload))]
pub async fn update_me(
    State(state): State<AppState>,
    auth: AuthUser,
    AppJson(mut payload): AppJson<UpdateProfileRequest>,
) -> AppResult<Json<PublicUser>> {
    payload.email = payload.email.as_deref().map(normalize_email);
    payload.validate()?;

    let changes = UserChanges {
        email: payload.email,
        full_name: payload.full_name,
        phone: payload.phone,
        ..Default::default()
    };
    let user = User::update(&state.db, auth.id, &changes)
        .await?
        .ok_or_else(|| AppError::Unauthorized("User not found".into()))?;
    Ok(Json(PublicUser::from(user)))
}

#[instrument(skip(state, payload))]
pub async fn change_password(
    State(state): State<AppState>,
    auth: AuthUser,
    AppJson(payload): AppJson<ChangePasswordRequest>,
) -> AppResult<StatusCode> {
    payload.validate()?;

    let user = User::find_by_id(&state.db, auth.id)
        .await?
        .ok_or_else(|| AppError::Unauthorized("User not found".into()))?;
    if !verify_password(&payload.current_password, &user.password_hash)? {
        warn!(user_id = %user.id, "change password with wrong current password");
        return Err(AppError::Unauthorized("Current password is incorrect".into()));
    }

    let changes = UserChanges {
        password_hash: Some(hash_password(&payload.new_password)?),
        ..Default::default()
    };
    User::update(&state.db, user.id, &changes).await?;
    info!(user_id = %user.id, "password changed");
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http::Request};
    use tower::ServiceExt;

    fn app() -> Router {
        Router::new()
            .merge(auth_routes())
            .merge(me_routes())
            .with_state(AppState::fake())
    }

    #[tokio::test]
    async fn me_requires_token() {
        let res = app()
            .oneshot(Request::builder().uri("/me").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn register_validates_before_touching_the_database() {
        let body = serde_json::json!({
            "username": "x",
            "email": "nope",
            "password": "123",
            "fullName": ""
        });
        let res = app()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/auth/register")
                    .header("content-type", "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn refresh_rejects_garbage() {
        let res = app()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/auth/refresh")
                    .header("content-type", "application/json")
                    .body(Body::from(r#"{"refreshToken":"garbage"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }
}
