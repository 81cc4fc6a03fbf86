//! HTTP surface: shared state, error mapping, bearer auth and the router.

use std::sync::Arc;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use tower_http::cors::CorsLayer;
use uuid::Uuid;

use crate::analysis::pipeline::AnalysisPipeline;
use crate::auth::session::SessionStore;
use crate::config::AppConfig;
use crate::error::{AuthError, DatabaseError};
use crate::llm::LlmProvider;
use crate::store::Database;
use crate::study::pomodoro::PomodoroError;

/// State shared by every route.
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<dyn Database>,
    pub sessions: Arc<SessionStore>,
    pub pipeline: Arc<AnalysisPipeline>,
    pub llm: Option<Arc<dyn LlmProvider>>,
    pub temperature: f32,
}

impl AppState {
    pub fn new(db: Arc<dyn Database>, llm: Option<Arc<dyn LlmProvider>>, config: &AppConfig) -> Self {
        Self {
            db,
            sessions: Arc::new(SessionStore::new(config.session_idle_timeout)),
            pipeline: Arc::new(AnalysisPipeline::new(llm.clone(), config.temperature)),
            llm,
            temperature: config.temperature,
        }
    }
}

/// Error returned by handlers, rendered as `{"error": "..."}`.
#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    Unauthorized(String),
    NotFound(String),
    Conflict(String),
    Internal,
}

impl ApiError {
    pub fn bad_request(msg: impl Into<String>) -> Self {
        ApiError::BadRequest(msg.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(m) => (StatusCode::BAD_REQUEST, m),
            ApiError::Unauthorized(m) => (StatusCode::UNAUTHORIZED, m),
            ApiError::NotFound(m) => (StatusCode::NOT_FOUND, m),
            ApiError::Conflict(m) => (StatusCode::CONFLICT, m),
            ApiError::Internal => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Something went wrong, please try again".to_string(),
            ),
        };
        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}

impl From<DatabaseError> for ApiError {
    fn from(e: DatabaseError) -> Self {
        match e {
            DatabaseError::NotFound { entity, .. } => {
                ApiError::NotFound(format!("{} not found", entity.replace('_', " ")))
            }
            other => {
                tracing::error!(error = %other, "Database error");
                ApiError::Internal
            }
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(e: AuthError) -> Self {
        match e {
            AuthError::MissingFields
            | AuthError::PasswordMismatch
            | AuthError::PasswordTooShort { .. } => ApiError::BadRequest(e.to_string()),
            AuthError::EmailTaken => ApiError::Conflict(e.to_string()),
            AuthError::InvalidCredentials | AuthError::Unauthorized => {
                ApiError::Unauthorized(e.to_string())
            }
            AuthError::Hashing(_) => {
                tracing::error!(error = %e, "Password hashing failed");
                ApiError::Internal
            }
        }
    }
}

impl From<PomodoroError> for ApiError {
    fn from(e: PomodoroError) -> Self {
        match e {
            PomodoroError::NotStarted => ApiError::NotFound(e.to_string()),
            _ => ApiError::BadRequest(e.to_string()),
        }
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

/// The caller's session, resolved from `Authorization: Bearer <token>`.
#[derive(Debug, Clone, Copy)]
pub struct AuthSession {
    pub token: Uuid,
    pub user_id: Uuid,
}

impl FromRequestParts<AppState> for AuthSession {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .and_then(|t| Uuid::parse_str(t.trim()).ok())
            .ok_or_else(|| ApiError::from(AuthError::Unauthorized))?;

        let user_id = state
            .sessions
            .touch(token)
            .await
            .ok_or_else(|| ApiError::from(AuthError::Unauthorized))?;

        Ok(AuthSession { token, user_id })
    }
}

/// GET /health
async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// Build the full application router.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .merge(crate::auth::routes::auth_routes(state.clone()))
        .merge(crate::todos::routes::action_routes(state.clone()))
        .merge(crate::health::routes::medicine_routes(state.clone()))
        .merge(crate::finance::routes::bill_routes(state.clone()))
        .merge(crate::notes::routes::note_routes(state.clone()))
        .merge(crate::study::routes::study_routes(state.clone()))
        .merge(crate::dashboard::routes::dashboard_routes(state.clone()))
        .merge(crate::analysis::routes::analysis_routes(state))
        .layer(CorsLayer::permissive())
}
