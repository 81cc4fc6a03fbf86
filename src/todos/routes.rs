//! REST endpoints for the to-do list.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use chrono::Utc;
use tracing::info;
use uuid::Uuid;

use super::model::{ActionItem, ActionSource, NewActionRequest};
use crate::error::DatabaseError;
use crate::web::{ApiError, ApiResult, AppState, AuthSession};

/// GET /api/actions
///
/// Pending items first, then by priority and age.
async fn list_actions(
    State(state): State<AppState>,
    auth: AuthSession,
) -> ApiResult<Json<Vec<ActionItem>>> {
    Ok(Json(state.db.list_actions(auth.user_id).await?))
}

/// POST /api/actions
async fn create_action(
    State(state): State<AppState>,
    auth: AuthSession,
    Json(req): Json<NewActionRequest>,
) -> ApiResult<impl IntoResponse> {
    let task = req.task.trim();
    if task.is_empty() {
        return Err(ApiError::bad_request("Task cannot be empty"));
    }

    let mut item = ActionItem::new(auth.user_id, task, req.category, ActionSource::User);
    if let Some(priority) = req.priority {
        item = item.with_priority(priority);
    }
    if let Some(due) = req.due_date {
        item = item.with_due_date(due);
    }

    state.db.insert_action(&item).await?;
    info!(action_id = %item.id, category = %item.category, "Action created");
    Ok((StatusCode::CREATED, Json(item)))
}

/// POST /api/actions/{id}/complete
///
/// Completing an already completed item leaves it unchanged.
async fn complete_action(
    State(state): State<AppState>,
    auth: AuthSession,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<ActionItem>> {
    state.db.complete_action(auth.user_id, id, Utc::now()).await?;
    let item = state
        .db
        .get_action(auth.user_id, id)
        .await?
        .ok_or_else(|| DatabaseError::NotFound {
            entity: "action_item".to_string(),
            id: id.to_string(),
        })?;
    Ok(Json(item))
}

/// DELETE /api/actions/{id}
async fn delete_action(
    State(state): State<AppState>,
    auth: AuthSession,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    state.db.delete_action(auth.user_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub fn action_routes(state: AppState) -> Router {
    Router::new()
        .route("/api/actions", get(list_actions).post(create_action))
        .route("/api/actions/{id}", delete(delete_action))
        .route("/api/actions/{id}/complete", post(complete_action))
        .with_state(state)
}
