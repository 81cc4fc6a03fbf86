//! REST endpoints for notes.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use uuid::Uuid;

use super::model::{NewNoteRequest, Note, UpdateNoteRequest};
use crate::error::DatabaseError;
use crate::web::{ApiError, ApiResult, AppState, AuthSession};

/// Optional filters for the note list.
#[derive(Debug, Default, Deserialize)]
struct NoteFilter {
    /// Exact tag match, case-insensitive.
    tag: Option<String>,
    /// Substring of title or content, case-insensitive.
    q: Option<String>,
}

impl NoteFilter {
    fn matches(&self, note: &Note) -> bool {
        let tag_ok = self.tag.as_deref().is_none_or(|tag| {
            note.tag_list()
                .iter()
                .any(|t| t.eq_ignore_ascii_case(tag.trim()))
        });
        let text_ok = self.q.as_deref().is_none_or(|q| {
            let q = q.to_lowercase();
            note.title.to_lowercase().contains(&q) || note.content.to_lowercase().contains(&q)
        });
        tag_ok && text_ok
    }
}

fn note_not_found(id: Uuid) -> DatabaseError {
    DatabaseError::NotFound {
        entity: "note".to_string(),
        id: id.to_string(),
    }
}

/// GET /api/notes
///
/// Most recently edited first.
async fn list_notes(
    State(state): State<AppState>,
    auth: AuthSession,
    Query(filter): Query<NoteFilter>,
) -> ApiResult<Json<Vec<Note>>> {
    let notes = state.db.list_notes(auth.user_id).await?;
    Ok(Json(notes.into_iter().filter(|n| filter.matches(n)).collect()))
}

/// POST /api/notes
async fn create_note(
    State(state): State<AppState>,
    auth: AuthSession,
    Json(req): Json<NewNoteRequest>,
) -> ApiResult<impl IntoResponse> {
    let title = req.title.trim();
    if title.is_empty() {
        return Err(ApiError::bad_request("Note title is required"));
    }
    let note = Note::new(auth.user_id, title, req.content, req.tags.trim());
    state.db.insert_note(&note).await?;
    Ok((StatusCode::CREATED, Json(note)))
}

/// GET /api/notes/{id}
async fn get_note(
    State(state): State<AppState>,
    auth: AuthSession,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Note>> {
    let note = state
        .db
        .get_note(auth.user_id, id)
        .await?
        .ok_or_else(|| note_not_found(id))?;
    Ok(Json(note))
}

/// PUT /api/notes/{id}
async fn update_note(
    State(state): State<AppState>,
    auth: AuthSession,
    Path(id): Path<Uuid>,
    Json(update): Json<UpdateNoteRequest>,
) -> ApiResult<Json<Note>> {
    if update.title.as_deref().is_some_and(|t| t.trim().is_empty()) {
        return Err(ApiError::bad_request("Note title is required"));
    }
    let mut note = state
        .db
        .get_note(auth.user_id, id)
        .await?
        .ok_or_else(|| note_not_found(id))?;
    note.apply(update);
    state.db.update_note(&note).await?;
    Ok(Json(note))
}

/// DELETE /api/notes/{id}
async fn delete_note(
    State(state): State<AppState>,
    auth: AuthSession,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    state.db.delete_note(auth.user_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub fn note_routes(state: AppState) -> Router {
    Router::new()
        .route("/api/notes", get(list_notes).post(create_note))
        .route(
            "/api/notes/{id}",
            get(get_note).put(update_note).delete(delete_note),
        )
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn note() -> Note {
        Note::new(Uuid::new_v4(), "Exam prep", "Chapter 4 flashcards", "study, Exams")
    }

    #[test]
    fn filter_by_tag_and_text() {
        let n = note();
        assert!(NoteFilter::default().matches(&n));
        assert!(
            NoteFilter {
                tag: Some("exams".into()),
                q: None
            }
            .matches(&n)
        );
        assert!(
            !NoteFilter {
                tag: Some("exam".into()),
                q: None
            }
            .matches(&n)
        );
        assert!(
            NoteFilter {
                tag: None,
                q: Some("FLASHCARDS".into())
            }
            .matches(&n)
        );
        assert!(
            !NoteFilter {
                tag: Some("study".into()),
                q: Some("budget".into())
            }
            .matches(&n)
        );
    }
}
