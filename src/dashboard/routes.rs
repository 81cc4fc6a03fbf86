//! REST endpoints for the dashboard, statistics and data export.

use axum::extract::{Query, State};
use axum::routing::get;
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::current_streak;
use super::metrics::{DashboardCharts, KeyMetrics, UserStatistics, dashboard_charts, key_metrics};
use crate::analysis::inputs::LifeInputs;
use crate::analysis::reflection::WeeklyProgress;
use crate::auth::model::User;
use crate::error::AuthError;
use crate::finance::model::{Bill, BudgetLine, budget_allocation};
use crate::health::model::Medicine;
use crate::notes::model::Note;
use crate::study::model::StudySession;
use crate::todos::model::ActionItem;
use crate::web::{ApiError, ApiResult, AppState, AuthSession};

#[derive(Debug, Deserialize)]
struct BudgetQuery {
    income: Decimal,
}

#[derive(Debug, Serialize)]
struct BudgetPlan {
    income: Decimal,
    lines: Vec<BudgetLine>,
}

/// Everything stored for one user.
#[derive(Debug, Serialize)]
struct Export {
    exported_at: DateTime<Utc>,
    user: User,
    actions: Vec<ActionItem>,
    medicines: Vec<Medicine>,
    bills: Vec<Bill>,
    notes: Vec<Note>,
    study_sessions: Vec<StudySession>,
    weekly_progress: Vec<WeeklyProgress>,
}

/// Last submitted form inputs, or the form defaults.
async fn session_inputs(state: &AppState, auth: AuthSession) -> LifeInputs {
    state
        .sessions
        .snapshot(auth.token)
        .await
        .and_then(|s| s.last_inputs)
        .unwrap_or_default()
}

/// GET /api/dashboard/inputs
async fn get_inputs(State(state): State<AppState>, auth: AuthSession) -> Json<LifeInputs> {
    Json(session_inputs(&state, auth).await)
}

/// PUT /api/dashboard/inputs
///
/// Stores the form in the session and returns the refreshed metrics.
async fn put_inputs(
    State(state): State<AppState>,
    auth: AuthSession,
    Json(inputs): Json<LifeInputs>,
) -> ApiResult<Json<KeyMetrics>> {
    let today = Utc::now().date_naive();
    inputs.validate(today).map_err(ApiError::BadRequest)?;

    let streak = current_streak(state.db.as_ref(), auth.user_id, today).await?;
    let metrics = key_metrics(&inputs, streak, today);

    state
        .sessions
        .with_session(auth.token, |s| s.last_inputs = Some(inputs))
        .await
        .ok_or_else(|| ApiError::from(AuthError::Unauthorized))?;
    Ok(Json(metrics))
}

/// GET /api/dashboard/metrics
async fn get_metrics(
    State(state): State<AppState>,
    auth: AuthSession,
) -> ApiResult<Json<KeyMetrics>> {
    let today = Utc::now().date_naive();
    let inputs = session_inputs(&state, auth).await;
    let streak = current_streak(state.db.as_ref(), auth.user_id, today).await?;
    Ok(Json(key_metrics(&inputs, streak, today)))
}

/// GET /api/dashboard/charts
async fn get_charts(State(state): State<AppState>, auth: AuthSession) -> Json<DashboardCharts> {
    let inputs = session_inputs(&state, auth).await;
    Json(dashboard_charts(&inputs, Utc::now().date_naive()))
}

/// GET /api/dashboard/budget?income=3000
async fn get_budget(
    _auth: AuthSession,
    Query(query): Query<BudgetQuery>,
) -> ApiResult<Json<BudgetPlan>> {
    if query.income.is_sign_negative() {
        return Err(ApiError::bad_request("Income cannot be negative"));
    }
    Ok(Json(BudgetPlan {
        income: query.income,
        lines: budget_allocation(query.income),
    }))
}

/// GET /api/stats
async fn get_stats(
    State(state): State<AppState>,
    auth: AuthSession,
) -> ApiResult<Json<UserStatistics>> {
    let counts = state.db.activity_counts(auth.user_id).await?;
    let streak = current_streak(state.db.as_ref(), auth.user_id, Utc::now().date_naive()).await?;
    Ok(Json(UserStatistics::new(counts, streak)))
}

/// GET /api/export
async fn export(State(state): State<AppState>, auth: AuthSession) -> ApiResult<Json<Export>> {
    let db = state.db.as_ref();
    let user = db
        .get_user(auth.user_id)
        .await?
        .ok_or_else(|| ApiError::from(AuthError::Unauthorized))?;

    let export = Export {
        exported_at: Utc::now(),
        actions: db.list_actions(user.id).await?,
        medicines: db.list_medicines(user.id).await?,
        bills: db.list_bills(user.id).await?,
        notes: db.list_notes(user.id).await?,
        study_sessions: db.list_study_sessions(user.id, None).await?,
        weekly_progress: db.list_weekly_progress(user.id).await?,
        user,
    };
    tracing::info!(user_id = %export.user.id, "Data exported");
    Ok(Json(export))
}

pub fn dashboard_routes(state: AppState) -> Router {
    Router::new()
        .route("/api/dashboard/inputs", get(get_inputs).put(put_inputs))
        .route("/api/dashboard/metrics", get(get_metrics))
        .route("/api/dashboard/charts", get(get_charts))
        .route("/api/dashboard/budget", get(get_budget))
        .route("/api/stats", get(get_stats))
        .route("/api/export", get(export))
        .with_state(state)
}
