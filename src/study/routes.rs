//! REST endpoints for study sessions and the pomodoro timer.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::model::{NewStudySessionRequest, StudySession, StudySummary, weekly_summary};
use super::pomodoro::{Pomodoro, PomodoroError, PomodoroSettings, PomodoroStatus};
use crate::error::AuthError;
use crate::web::{ApiError, ApiResult, AppState, AuthSession};

#[derive(Debug, Default, Deserialize)]
struct SessionWindow {
    /// Only sessions from the last `days` days, today included.
    days: Option<u32>,
}

#[derive(Debug, Serialize)]
struct PomodoroEnded {
    focused_minutes: u32,
    /// The study session recorded for the focused time, if any.
    session: Option<StudySession>,
}

/// GET /api/study/sessions
async fn list_sessions(
    State(state): State<AppState>,
    auth: AuthSession,
    Query(window): Query<SessionWindow>,
) -> ApiResult<Json<Vec<StudySession>>> {
    let since = window
        .days
        .filter(|d| *d > 0)
        .map(|d| Utc::now().date_naive() - Duration::days(i64::from(d) - 1));
    Ok(Json(state.db.list_study_sessions(auth.user_id, since).await?))
}

/// POST /api/study/sessions
async fn log_session(
    State(state): State<AppState>,
    auth: AuthSession,
    Json(req): Json<NewStudySessionRequest>,
) -> ApiResult<impl IntoResponse> {
    let subject = req.subject.trim();
    if subject.is_empty() {
        return Err(ApiError::bad_request("Subject is required"));
    }
    if req.duration_minutes == 0 {
        return Err(ApiError::bad_request("Duration must be at least one minute"));
    }
    if !(1..=10).contains(&req.productivity_score) {
        return Err(ApiError::bad_request("Productivity score must be between 1 and 10"));
    }

    let date = req.date.unwrap_or_else(|| Utc::now().date_naive());
    let mut session = StudySession::new(
        auth.user_id,
        date,
        req.duration_minutes,
        subject,
        req.productivity_score,
    );
    session.notes = req.notes.filter(|n| !n.trim().is_empty());

    state.db.insert_study_session(&session).await?;
    info!(session_id = %session.id, minutes = session.duration_minutes, "Study session logged");
    Ok((StatusCode::CREATED, Json(session)))
}

/// GET /api/study/summary
async fn summary(State(state): State<AppState>, auth: AuthSession) -> ApiResult<Json<StudySummary>> {
    let today = Utc::now().date_naive();
    let sessions = state
        .db
        .list_study_sessions(auth.user_id, Some(today - Duration::days(6)))
        .await?;
    Ok(Json(weekly_summary(&sessions, today)))
}

/// POST /api/pomodoro/start
///
/// Replaces any timer already running in this session.
async fn start_pomodoro(
    State(state): State<AppState>,
    auth: AuthSession,
    Json(mut settings): Json<PomodoroSettings>,
) -> ApiResult<Json<PomodoroStatus>> {
    let now = Utc::now();
    if settings.subject.trim().is_empty() {
        settings.subject = "General".to_string();
    }
    let pomodoro = Pomodoro::start(settings, now)?;
    let status = pomodoro.status(now);

    state
        .sessions
        .with_session(auth.token, |s| s.pomodoro = Some(pomodoro))
        .await
        .ok_or_else(|| ApiError::from(AuthError::Unauthorized))?;
    Ok(Json(status))
}

/// Apply `op` to the running timer and return its status.
async fn with_pomodoro(
    state: &AppState,
    auth: AuthSession,
    op: impl FnOnce(&mut Pomodoro, chrono::DateTime<Utc>),
) -> ApiResult<Json<PomodoroStatus>> {
    let now = Utc::now();
    let status = state
        .sessions
        .with_session(auth.token, |s| {
            s.pomodoro.as_mut().map(|p| {
                op(p, now);
                p.status(now)
            })
        })
        .await
        .flatten()
        .ok_or(PomodoroError::NotStarted)?;
    Ok(Json(status))
}

/// GET /api/pomodoro/status
async fn pomodoro_status(
    State(state): State<AppState>,
    auth: AuthSession,
) -> ApiResult<Json<PomodoroStatus>> {
    with_pomodoro(&state, auth, |p, now| p.advance(now)).await
}

/// POST /api/pomodoro/pause
async fn pause_pomodoro(
    State(state): State<AppState>,
    auth: AuthSession,
) -> ApiResult<Json<PomodoroStatus>> {
    with_pomodoro(&state, auth, |p, now| p.pause(now)).await
}

/// POST /api/pomodoro/resume
async fn resume_pomodoro(
    State(state): State<AppState>,
    auth: AuthSession,
) -> ApiResult<Json<PomodoroStatus>> {
    with_pomodoro(&state, auth, |p, now| p.resume(now)).await
}

/// POST /api/pomodoro/skip
async fn skip_pomodoro(
    State(state): State<AppState>,
    auth: AuthSession,
) -> ApiResult<Json<PomodoroStatus>> {
    with_pomodoro(&state, auth, |p, now| p.skip_to_break(now)).await
}

/// POST /api/pomodoro/end
///
/// Stops the timer and records the focused time as a study session.
async fn end_pomodoro(
    State(state): State<AppState>,
    auth: AuthSession,
) -> ApiResult<Json<PomodoroEnded>> {
    let now = Utc::now();
    let finished = state
        .sessions
        .with_session(auth.token, |s| s.pomodoro.take())
        .await
        .flatten()
        .ok_or(PomodoroError::NotStarted)?
        .end(now);

    let session = if finished.focused_minutes > 0 {
        let session = StudySession::new(
            auth.user_id,
            now.date_naive(),
            finished.focused_minutes,
            finished.subject,
            finished.focus_level,
        );
        state.db.insert_study_session(&session).await?;
        info!(minutes = session.duration_minutes, "Pomodoro recorded as study session");
        Some(session)
    } else {
        None
    };

    Ok(Json(PomodoroEnded {
        focused_minutes: finished.focused_minutes,
        session,
    }))
}

pub fn study_routes(state: AppState) -> Router {
    Router::new()
        .route("/api/study/sessions", get(list_sessions).post(log_session))
        .route("/api/study/summary", get(summary))
        .route("/api/pomodoro/start", post(start_pomodoro))
        .route("/api/pomodoro/status", get(pomodoro_status))
        .route("/api/pomodoro/pause", post(pause_pomodoro))
        .route("/api/pomodoro/resume", post(resume_pomodoro))
        .route("/api/pomodoro/skip", post(skip_pomodoro))
        .route("/api/pomodoro/end", post(end_pomodoro))
        .with_state(state)
}
