//! REST endpoints for analysis runs and weekly reflections.

use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use chrono::{Duration, Utc};
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use super::extract::{ActionExtractor, classify};
use super::inputs::LifeInputs;
use super::pipeline::{AnalysisResults, InsightCard};
use super::reflection::{
    ReflectionRequest, WeekData, WeeklyProgress, week_start, write_reflection,
};
use crate::dashboard::current_streak;
use crate::error::AuthError;
use crate::store::Database;
use crate::study::model::weekly_summary;
use crate::todos::model::{ActionItem, ActionSource};
use crate::web::{ApiError, ApiResult, AppState, AuthSession};

#[derive(Debug, Serialize)]
struct AnalysisResponse {
    #[serde(flatten)]
    results: AnalysisResults,
    insight_cards: Vec<InsightCard>,
    /// Rows added to the to-do list from this run.
    action_items: Vec<ActionItem>,
}

#[derive(Debug, Serialize)]
struct ReflectionResponse {
    progress: WeeklyProgress,
    week: WeekData,
    /// False when the local summary template was used.
    from_model: bool,
}

/// POST /api/analysis
///
/// Runs the pipeline on the submitted form and files the extracted action
/// items on the caller's to-do list.
async fn run_analysis(
    State(state): State<AppState>,
    auth: AuthSession,
    Json(inputs): Json<LifeInputs>,
) -> ApiResult<Json<AnalysisResponse>> {
    let today = Utc::now().date_naive();
    inputs.validate(today).map_err(ApiError::BadRequest)?;

    let results = state.pipeline.run(&inputs, today).await;
    if let Some(err) = &results.error {
        warn!(user_id = %auth.user_id, mode = ?results.mode, error = %err, "Analysis fell back");
    }

    state
        .sessions
        .with_session(auth.token, |s| {
            s.last_inputs = Some(inputs);
            s.last_analysis = Some(results.clone());
        })
        .await
        .ok_or_else(|| ApiError::from(AuthError::Unauthorized))?;

    let extracted = ActionExtractor::new()
        .extract(&results.combined_text())
        .into_iter()
        .map(|task| {
            let category = classify(&task);
            ActionItem::new(auth.user_id, task, category, ActionSource::AiAgent)
        })
        .collect();
    let action_items = file_action_items(state.db.as_ref(), extracted).await;
    info!(
        user_id = %auth.user_id,
        mode = ?results.mode,
        actions = action_items.len(),
        "Analysis complete"
    );

    Ok(Json(AnalysisResponse {
        insight_cards: results.insight_cards(),
        results,
        action_items,
    }))
}

/// Store extracted items, skipping any row the database rejects.
///
/// Returns the items that were stored.
async fn file_action_items(db: &dyn Database, items: Vec<ActionItem>) -> Vec<ActionItem> {
    let mut filed = Vec::with_capacity(items.len());
    for item in items {
        match db.insert_action(&item).await {
            Ok(()) => filed.push(item),
            Err(e) => warn!(
                user_id = %item.user_id,
                task = %item.task,
                error = %e,
                "Failed to file action item"
            ),
        }
    }
    filed
}

/// GET /api/analysis
///
/// The last analysis run in this session.
async fn last_analysis(
    State(state): State<AppState>,
    auth: AuthSession,
) -> ApiResult<Json<AnalysisResults>> {
    state
        .sessions
        .snapshot(auth.token)
        .await
        .and_then(|s| s.last_analysis)
        .map(Json)
        .ok_or_else(|| ApiError::NotFound("No analysis has been run yet".to_string()))
}

/// POST /api/reflection
///
/// Writes and stores a review of the current week.
async fn create_reflection(
    State(state): State<AppState>,
    auth: AuthSession,
    Json(req): Json<ReflectionRequest>,
) -> ApiResult<Json<ReflectionResponse>> {
    let db = state.db.as_ref();
    let today = Utc::now().date_naive();

    let counts = db.activity_counts(auth.user_id).await?;
    let sessions = db
        .list_study_sessions(auth.user_id, Some(today - Duration::days(6)))
        .await?;
    let study = weekly_summary(&sessions, today);
    let bills = db.list_bills(auth.user_id).await?;
    let streak = current_streak(db, auth.user_id, today).await?;
    let last_inputs = state
        .sessions
        .snapshot(auth.token)
        .await
        .and_then(|s| s.last_inputs);

    let week = WeekData {
        completed_actions: counts.completed_actions,
        total_actions: counts.total_actions,
        study_hours: f64::from(study.total_minutes) / 60.0,
        avg_focus: study.avg_productivity,
        bills_paid: bills.iter().filter(|b| b.paid_this_month).count(),
        bills_total: bills.len(),
        savings: None,
        stress_level: None,
        streak,
    }
    .with_inputs(last_inputs.as_ref());

    let (reflection, from_model) =
        write_reflection(state.llm.as_deref(), &week, state.temperature).await;

    let progress = WeeklyProgress {
        id: Uuid::new_v4(),
        user_id: auth.user_id,
        week_start: week_start(today),
        health_score: req.health_score,
        finance_score: req.finance_score,
        study_score: req.study_score,
        consistency_streak: streak,
        reflection,
        created_at: Utc::now(),
    };
    db.insert_weekly_progress(&progress).await?;
    info!(user_id = %auth.user_id, from_model, "Weekly reflection stored");

    Ok(Json(ReflectionResponse {
        progress,
        week,
        from_model,
    }))
}

/// GET /api/reflection
async fn list_reflections(
    State(state): State<AppState>,
    auth: AuthSession,
) -> ApiResult<Json<Vec<WeeklyProgress>>> {
    Ok(Json(state.db.list_weekly_progress(auth.user_id).await?))
}

pub fn analysis_routes(state: AppState) -> Router {
    Router::new()
        .route("/api/analysis", post(run_analysis).get(last_analysis))
        .route("/api/reflection", post(create_reflection).get(list_reflections))
        .with_state(state)
}
