//! Sign-up, login, logout and the current-user endpoint.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};

use super::model::{LoginRequest, SignupRequest, User, normalize_email};
use super::password::{hash_password_blocking, verify_password_blocking};
use crate::error::{AuthError, DatabaseError};
use crate::web::{ApiError, ApiResult, AppState, AuthSession};

/// POST /api/auth/signup
async fn signup(
    State(state): State<AppState>,
    Json(req): Json<SignupRequest>,
) -> ApiResult<impl IntoResponse> {
    req.validate()?;

    let email = normalize_email(&req.email);
    if state.db.get_user_by_email(&email).await?.is_some() {
        return Err(AuthError::EmailTaken.into());
    }

    let password_hash = hash_password_blocking(req.password.clone()).await?;
    let user = User::new(&email, password_hash, req.name.trim());
    match state.db.create_user(&user).await {
        Ok(()) => {}
        Err(DatabaseError::Constraint(_)) => return Err(AuthError::EmailTaken.into()),
        Err(e) => return Err(e.into()),
    }

    tracing::info!(user_id = %user.id, "Account created");
    Ok((StatusCode::CREATED, Json(serde_json::json!({ "user": user }))))
}

/// POST /api/auth/login
///
/// Returns a bearer token for the new session.
async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<impl IntoResponse> {
    if req.email.trim().is_empty() || req.password.is_empty() {
        return Err(AuthError::MissingFields.into());
    }

    let user = state
        .db
        .get_user_by_email(&normalize_email(&req.email))
        .await?
        .ok_or(AuthError::InvalidCredentials)?;

    if !verify_password_blocking(req.password, user.password_hash.clone()).await? {
        tracing::info!(user_id = %user.id, "Rejected login");
        return Err(AuthError::InvalidCredentials.into());
    }

    let token = state.sessions.create(user.id).await;
    tracing::info!(user_id = %user.id, "Logged in");
    Ok(Json(serde_json::json!({ "token": token, "user": user })))
}

/// POST /api/auth/logout
async fn logout(State(state): State<AppState>, auth: AuthSession) -> StatusCode {
    state.sessions.remove(auth.token).await;
    StatusCode::NO_CONTENT
}

/// GET /api/auth/me
async fn me(State(state): State<AppState>, auth: AuthSession) -> ApiResult<Json<User>> {
    let user = state
        .db
        .get_user(auth.user_id)
        .await?
        .ok_or_else(|| ApiError::from(AuthError::Unauthorized))?;
    Ok(Json(user))
}

pub fn auth_routes(state: AppState) -> Router {
    Router::new()
        .route("/api/auth/signup", post(signup))
        .route("/api/auth/login", post(login))
        .route("/api/auth/logout", post(logout))
        .route("/api/auth/me", get(me))
        .with_state(state)
}
