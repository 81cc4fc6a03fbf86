//! `Database` trait: single async interface for all persistence.
//!
//! Every per-row operation takes the owning user's id; a row owned by
//! someone else is reported as `DatabaseError::NotFound`.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::analysis::reflection::WeeklyProgress;
use crate::auth::model::User;
use crate::error::DatabaseError;
use crate::finance::model::Bill;
use crate::health::model::Medicine;
use crate::notes::model::Note;
use crate::study::model::StudySession;
use crate::todos::model::ActionItem;

/// Row counts behind the user statistics panel.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ActivityCounts {
    pub total_actions: u64,
    pub completed_actions: u64,
    pub medicines: u64,
    pub bills: u64,
    pub notes: u64,
}

/// Backend-agnostic database trait.
#[async_trait]
pub trait Database: Send + Sync {
    /// Run all pending schema migrations.
    async fn run_migrations(&self) -> Result<(), DatabaseError>;

    // ── Users ───────────────────────────────────────────────────────

    /// Insert a user. A duplicate email yields `DatabaseError::Constraint`.
    async fn create_user(&self, user: &User) -> Result<(), DatabaseError>;

    /// Look up by normalized email.
    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, DatabaseError>;

    async fn get_user(&self, id: Uuid) -> Result<Option<User>, DatabaseError>;

    // ── Action items ────────────────────────────────────────────────

    async fn insert_action(&self, item: &ActionItem) -> Result<(), DatabaseError>;

    async fn get_action(&self, user_id: Uuid, id: Uuid)
    -> Result<Option<ActionItem>, DatabaseError>;

    /// Pending first, then by priority, then oldest first.
    async fn list_actions(&self, user_id: Uuid) -> Result<Vec<ActionItem>, DatabaseError>;

    /// Mark complete. Completing twice keeps the first `completed_at`.
    async fn complete_action(
        &self,
        user_id: Uuid,
        id: Uuid,
        at: DateTime<Utc>,
    ) -> Result<(), DatabaseError>;

    async fn delete_action(&self, user_id: Uuid, id: Uuid) -> Result<(), DatabaseError>;

    /// Distinct UTC dates on which at least one action was completed.
    async fn completion_dates(&self, user_id: Uuid) -> Result<Vec<NaiveDate>, DatabaseError>;

    // ── Medicines ───────────────────────────────────────────────────

    async fn insert_medicine(&self, medicine: &Medicine) -> Result<(), DatabaseError>;

    async fn list_medicines(&self, user_id: Uuid) -> Result<Vec<Medicine>, DatabaseError>;

    async fn mark_medicine_taken(
        &self,
        user_id: Uuid,
        id: Uuid,
        at: DateTime<Utc>,
    ) -> Result<(), DatabaseError>;

    async fn delete_medicine(&self, user_id: Uuid, id: Uuid) -> Result<(), DatabaseError>;

    // ── Bills ───────────────────────────────────────────────────────

    async fn insert_bill(&self, bill: &Bill) -> Result<(), DatabaseError>;

    async fn list_bills(&self, user_id: Uuid) -> Result<Vec<Bill>, DatabaseError>;

    async fn set_bill_paid(&self, user_id: Uuid, id: Uuid, paid: bool)
    -> Result<(), DatabaseError>;

    async fn delete_bill(&self, user_id: Uuid, id: Uuid) -> Result<(), DatabaseError>;

    // ── Notes ───────────────────────────────────────────────────────

    async fn insert_note(&self, note: &Note) -> Result<(), DatabaseError>;

    async fn get_note(&self, user_id: Uuid, id: Uuid) -> Result<Option<Note>, DatabaseError>;

    /// Newest first.
    async fn list_notes(&self, user_id: Uuid) -> Result<Vec<Note>, DatabaseError>;

    /// Persist title, content, tags and `updated_at`.
    async fn update_note(&self, note: &Note) -> Result<(), DatabaseError>;

    async fn delete_note(&self, user_id: Uuid, id: Uuid) -> Result<(), DatabaseError>;

    // ── Study ───────────────────────────────────────────────────────

    async fn insert_study_session(&self, session: &StudySession) -> Result<(), DatabaseError>;

    /// Sessions on or after `since` (all when `None`), newest first.
    async fn list_study_sessions(
        &self,
        user_id: Uuid,
        since: Option<NaiveDate>,
    ) -> Result<Vec<StudySession>, DatabaseError>;

    // ── Weekly progress ─────────────────────────────────────────────

    async fn insert_weekly_progress(&self, progress: &WeeklyProgress) -> Result<(), DatabaseError>;

    /// Newest week first.
    async fn list_weekly_progress(&self, user_id: Uuid)
    -> Result<Vec<WeeklyProgress>, DatabaseError>;

    // ── Stats ───────────────────────────────────────────────────────

    async fn activity_counts(&self, user_id: Uuid) -> Result<ActivityCounts, DatabaseError>;
}
