//! Notes data model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A free-form note with comma-separated tags.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Note {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub content: String,
    /// Raw tag string as entered, e.g. `"exam, chemistry"`.
    pub tags: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Note {
    pub fn new(
        user_id: Uuid,
        title: impl Into<String>,
        content: impl Into<String>,
        tags: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            user_id,
            title: title.into(),
            content: content.into(),
            tags: tags.into(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Parsed, trimmed, non-empty tags.
    pub fn tag_list(&self) -> Vec<String> {
        parse_tags(&self.tags)
    }

    /// Apply a partial update and bump `updated_at`.
    pub fn apply(&mut self, update: UpdateNoteRequest) {
        if let Some(title) = update.title {
            self.title = title;
        }
        if let Some(content) = update.content {
            self.content = content;
        }
        if let Some(tags) = update.tags {
            self.tags = tags;
        }
        self.updated_at = Utc::now();
    }
}

pub fn parse_tags(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(String::from)
        .collect()
}

/// Body of `POST /api/notes`.
#[derive(Debug, Clone, Deserialize)]
pub struct NewNoteRequest {
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub tags: String,
}

/// Body of `PUT /api/notes/{id}`; absent fields are left unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateNoteRequest {
    pub title: Option<String>,
    pub content: Option<String>,
    pub tags: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tags_are_split_and_trimmed() {
        let note = Note::new(Uuid::new_v4(), "Exam prep", "", " chem ,, bio,");
        assert_eq!(note.tag_list(), vec!["chem", "bio"]);
        assert!(parse_tags("").is_empty());
    }

    #[test]
    fn apply_only_touches_given_fields() {
        let mut note = Note::new(Uuid::new_v4(), "Title", "Body", "a");
        let created = note.created_at;
        note.apply(UpdateNoteRequest {
            content: Some("New body".into()),
            ..Default::default()
        });
        assert_eq!(note.title, "Title");
        assert_eq!(note.content, "New body");
        assert_eq!(note.tags, "a");
        assert_eq!(note.created_at, created);
        assert!(note.updated_at >= created);
    }
}
