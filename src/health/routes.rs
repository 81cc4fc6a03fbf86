//! REST endpoints for the medicine tracker.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use chrono::Utc;
use uuid::Uuid;

use super::model::{Medicine, NewMedicineRequest, TimeOfDay};
use crate::web::{ApiError, ApiResult, AppState, AuthSession};

/// GET /api/medicines
async fn list_medicines(
    State(state): State<AppState>,
    auth: AuthSession,
) -> ApiResult<Json<Vec<Medicine>>> {
    Ok(Json(state.db.list_medicines(auth.user_id).await?))
}

/// POST /api/medicines
async fn add_medicine(
    State(state): State<AppState>,
    auth: AuthSession,
    Json(req): Json<NewMedicineRequest>,
) -> ApiResult<impl IntoResponse> {
    let name = req.name.trim();
    if name.is_empty() {
        return Err(ApiError::bad_request("Medicine name is required"));
    }

    let mut medicine = Medicine::new(
        auth.user_id,
        name,
        req.dosage.trim(),
        req.frequency,
        req.time_of_day.unwrap_or(TimeOfDay::Anytime),
    );
    if let Some(end) = req.end_date {
        if end < medicine.start_date {
            return Err(ApiError::bad_request("End date cannot be before the start date"));
        }
        medicine.end_date = Some(end);
    }

    state.db.insert_medicine(&medicine).await?;
    tracing::info!(medicine_id = %medicine.id, "Medicine added");
    Ok((StatusCode::CREATED, Json(medicine)))
}

/// POST /api/medicines/{id}/taken
async fn mark_taken(
    State(state): State<AppState>,
    auth: AuthSession,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    state
        .db
        .mark_medicine_taken(auth.user_id, id, Utc::now())
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /api/medicines/{id}
async fn delete_medicine(
    State(state): State<AppState>,
    auth: AuthSession,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    state.db.delete_medicine(auth.user_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub fn medicine_routes(state: AppState) -> Router {
    Router::new()
        .route("/api/medicines", get(list_medicines).post(add_medicine))
        .route("/api/medicines/{id}", delete(delete_medicine))
        .route("/api/medicines/{id}/taken", post(mark_taken))
        .with_state(state)
}
