//! REST endpoints for bills.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::model::{Bill, NewBillRequest, monthly_total};
use crate::web::{ApiError, ApiResult, AppState, AuthSession};

#[derive(Debug, Serialize)]
struct BillList {
    bills: Vec<Bill>,
    monthly_total: Decimal,
    unpaid_total: Decimal,
}

#[derive(Debug, Deserialize)]
struct PaidRequest {
    paid: bool,
}

/// GET /api/bills
///
/// Ordered by due day, with the monthly and unpaid totals.
async fn list_bills(State(state): State<AppState>, auth: AuthSession) -> ApiResult<impl IntoResponse> {
    let bills = state.db.list_bills(auth.user_id).await?;
    let unpaid: Vec<Bill> = bills.iter().filter(|b| !b.paid_this_month).cloned().collect();
    Ok(Json(BillList {
        monthly_total: monthly_total(&bills),
        unpaid_total: monthly_total(&unpaid),
        bills,
    }))
}

/// POST /api/bills
async fn add_bill(
    State(state): State<AppState>,
    auth: AuthSession,
    Json(req): Json<NewBillRequest>,
) -> ApiResult<impl IntoResponse> {
    let name = req.name.trim();
    if name.is_empty() {
        return Err(ApiError::bad_request("Bill name is required"));
    }
    let bill = Bill::new(auth.user_id, name, req.amount, req.due_day, req.category).ok_or_else(
        || ApiError::bad_request("Amount must be non-negative and due day between 1 and 31"),
    )?;

    state.db.insert_bill(&bill).await?;
    tracing::info!(bill_id = %bill.id, "Bill added");
    Ok((StatusCode::CREATED, Json(bill)))
}

/// POST /api/bills/{id}/paid
async fn set_paid(
    State(state): State<AppState>,
    auth: AuthSession,
    Path(id): Path<Uuid>,
    Json(req): Json<PaidRequest>,
) -> ApiResult<StatusCode> {
    state.db.set_bill_paid(auth.user_id, id, req.paid).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /api/bills/{id}
async fn delete_bill(
    State(state): State<AppState>,
    auth: AuthSession,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    state.db.delete_bill(auth.user_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub fn bill_routes(state: AppState) -> Router {
    Router::new()
        .route("/api/bills", get(list_bills).post(add_bill))
        .route("/api/bills/{id}", delete(delete_bill))
        .route("/api/bills/{id}/paid", post(set_paid))
        .with_state(state)
}
