//! libSQL backend: async `Database` trait implementation.
//!
//! Supports local file and in-memory databases. Timestamps are stored as
//! RFC 3339 text, dates as `YYYY-MM-DD`, money as decimal text.

use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use libsql::{Connection, Database as LibSqlDatabase, params};
use rust_decimal::Decimal;
use tracing::{debug, info};
use uuid::Uuid;

use crate::analysis::reflection::WeeklyProgress;
use crate::auth::model::User;
use crate::error::DatabaseError;
use crate::finance::model::{Bill, BillCategory};
use crate::health::model::{Frequency, Medicine, TimeOfDay};
use crate::notes::model::Note;
use crate::store::migrations;
use crate::store::traits::{ActivityCounts, Database};
use crate::study::model::StudySession;
use crate::todos::model::{ActionItem, ActionSource, Category};

/// libSQL database backend.
///
/// Stores a single connection that is reused for all operations.
/// `libsql::Connection` is `Send + Sync` and safe for concurrent async use.
pub struct LibSqlBackend {
    #[allow(dead_code)]
    db: Arc<LibSqlDatabase>,
    conn: Connection,
}

impl LibSqlBackend {
    /// Open (or create) a local database file and run migrations.
    pub async fn new_local(path: &Path) -> Result<Self, DatabaseError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                DatabaseError::Pool(format!("Failed to create database directory: {e}"))
            })?;
        }

        let db = libsql::Builder::new_local(path)
            .build()
            .await
            .map_err(|e| DatabaseError::Pool(format!("Failed to open libSQL database: {e}")))?;

        let backend = Self::from_database(db)?;
        backend.run_migrations().await?;
        info!(path = %path.display(), "Database opened");
        Ok(backend)
    }

    /// Create an in-memory database (for tests).
    pub async fn new_memory() -> Result<Self, DatabaseError> {
        let db = libsql::Builder::new_local(":memory:")
            .build()
            .await
            .map_err(|e| {
                DatabaseError::Pool(format!("Failed to create in-memory database: {e}"))
            })?;

        let backend = Self::from_database(db)?;
        backend.run_migrations().await?;
        Ok(backend)
    }

    fn from_database(db: LibSqlDatabase) -> Result<Self, DatabaseError> {
        let conn = db
            .connect()
            .map_err(|e| DatabaseError::Pool(format!("Failed to create connection: {e}")))?;
        Ok(Self {
            db: Arc::new(db),
            conn,
        })
    }

    /// Get the connection.
    fn conn(&self) -> &Connection {
        &self.conn
    }

    async fn count(&self, sql: &str, user_id: Uuid) -> Result<u64, DatabaseError> {
        let mut rows = self
            .conn()
            .query(sql, params![user_id.to_string()])
            .await
            .map_err(|e| DatabaseError::Query(format!("count: {e}")))?;
        let row = rows
            .next()
            .await
            .map_err(|e| DatabaseError::Query(format!("count row: {e}")))?;
        let n: i64 = match row {
            Some(row) => row.get(0).unwrap_or(0),
            None => 0,
        };
        Ok(u64::try_from(n).unwrap_or(0))
    }
}

// ── Helper functions ────────────────────────────────────────────────

/// Parse an RFC 3339 or SQLite datetime string into DateTime<Utc>.
fn parse_datetime(s: &str) -> DateTime<Utc> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return dt.with_timezone(&Utc);
    }
    if let Ok(ndt) = chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f") {
        return ndt.and_utc();
    }
    DateTime::<Utc>::MIN_UTC
}

fn parse_optional_datetime(s: Option<String>) -> Option<DateTime<Utc>> {
    s.filter(|s| !s.is_empty()).map(|s| parse_datetime(&s))
}

fn parse_date(s: &str) -> Result<NaiveDate, DatabaseError> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map_err(|e| DatabaseError::Serialization(format!("bad date '{s}': {e}")))
}

fn parse_optional_date(s: Option<String>) -> Option<NaiveDate> {
    s.and_then(|s| NaiveDate::parse_from_str(&s, "%Y-%m-%d").ok())
}

fn parse_uuid(s: &str, field: &str) -> Result<Uuid, DatabaseError> {
    Uuid::parse_str(s).map_err(|e| DatabaseError::Serialization(format!("{field}: {e}")))
}

/// Read a required text column, tagging errors with the field name.
fn text(row: &libsql::Row, idx: i32, field: &str) -> Result<String, DatabaseError> {
    row.get::<String>(idx)
        .map_err(|e| DatabaseError::Query(format!("{field}: {e}")))
}

/// Read a required integer column.
fn int(row: &libsql::Row, idx: i32, field: &str) -> Result<i64, DatabaseError> {
    row.get::<i64>(idx)
        .map_err(|e| DatabaseError::Query(format!("{field}: {e}")))
}

/// Map "no row touched" to a not-found error.
fn ensure_affected(affected: u64, entity: &str, id: Uuid) -> Result<(), DatabaseError> {
    if affected == 0 {
        Err(DatabaseError::NotFound {
            entity: entity.to_string(),
            id: id.to_string(),
        })
    } else {
        Ok(())
    }
}

// ── Row mappers ─────────────────────────────────────────────────────

const USER_COLUMNS: &str = "id, email, password_hash, name, created_at";

fn row_to_user(row: &libsql::Row) -> Result<User, DatabaseError> {
    let id: String = text(row, 0, "user.id")?;
    let created: String = text(row, 4, "user.created_at")?;
    Ok(User {
        id: parse_uuid(&id, "user.id")?,
        email: text(row, 1, "user.email")?,
        password_hash: text(row, 2, "user.password_hash")?,
        name: text(row, 3, "user.name")?,
        created_at: parse_datetime(&created),
    })
}

const ACTION_COLUMNS: &str =
    "id, user_id, task, category, source, priority, due_date, completed, created_at, completed_at";

fn row_to_action(row: &libsql::Row) -> Result<ActionItem, DatabaseError> {
    let id: String = text(row, 0, "action.id")?;
    let user_id: String = text(row, 1, "action.user_id")?;
    let category: String = text(row, 3, "action.category")?;
    let source: String = text(row, 4, "action.source")?;
    let priority: i64 = row.get(5).unwrap_or(2);
    let completed: i64 = row.get(7).unwrap_or(0);
    let created: String = text(row, 8, "action.created_at")?;

    Ok(ActionItem {
        id: parse_uuid(&id, "action.id")?,
        user_id: parse_uuid(&user_id, "action.user_id")?,
        task: text(row, 2, "action.task")?,
        category: category.parse().unwrap_or(Category::General),
        source: ActionSource::parse(&source),
        priority: i32::try_from(priority).unwrap_or(2),
        due_date: parse_optional_date(row.get::<String>(6).ok()),
        completed: completed != 0,
        created_at: parse_datetime(&created),
        completed_at: parse_optional_datetime(row.get::<String>(9).ok()),
    })
}

const MEDICINE_COLUMNS: &str = "id, user_id, name, dosage, frequency, time_of_day, start_date, end_date, reminder_enabled, last_taken";

fn row_to_medicine(row: &libsql::Row) -> Result<Medicine, DatabaseError> {
    let id: String = text(row, 0, "medicine.id")?;
    let user_id: String = text(row, 1, "medicine.user_id")?;
    let frequency: String = text(row, 4, "medicine.frequency")?;
    let time_of_day: String = row.get(5).unwrap_or_else(|_| "anytime".to_string());
    let start: String = text(row, 6, "medicine.start_date")?;
    let reminder: i64 = row.get(8).unwrap_or(1);

    Ok(Medicine {
        id: parse_uuid(&id, "medicine.id")?,
        user_id: parse_uuid(&user_id, "medicine.user_id")?,
        name: text(row, 2, "medicine.name")?,
        dosage: row.get(3).unwrap_or_default(),
        frequency: Frequency::parse(&frequency),
        time_of_day: TimeOfDay::parse(&time_of_day),
        start_date: parse_date(&start)?,
        end_date: parse_optional_date(row.get::<String>(7).ok()),
        reminder_enabled: reminder != 0,
        last_taken: parse_optional_datetime(row.get::<String>(9).ok()),
    })
}

const BILL_COLUMNS: &str =
    "id, user_id, name, amount, due_day, category, is_recurring, paid_this_month";

fn row_to_bill(row: &libsql::Row) -> Result<Bill, DatabaseError> {
    let id: String = text(row, 0, "bill.id")?;
    let user_id: String = text(row, 1, "bill.user_id")?;
    let amount: String = text(row, 3, "bill.amount")?;
    let due_day: i64 = int(row, 4, "bill.due_day")?;
    let category: String = text(row, 5, "bill.category")?;
    let recurring: i64 = row.get(6).unwrap_or(1);
    let paid: i64 = row.get(7).unwrap_or(0);

    Ok(Bill {
        id: parse_uuid(&id, "bill.id")?,
        user_id: parse_uuid(&user_id, "bill.user_id")?,
        name: text(row, 2, "bill.name")?,
        amount: Decimal::from_str(&amount)
            .map_err(|e| DatabaseError::Serialization(format!("bill.amount: {e}")))?,
        due_day: u8::try_from(due_day).unwrap_or(1),
        category: BillCategory::parse(&category),
        is_recurring: recurring != 0,
        paid_this_month: paid != 0,
    })
}

const NOTE_COLUMNS: &str = "id, user_id, title, content, tags, created_at, updated_at";

fn row_to_note(row: &libsql::Row) -> Result<Note, DatabaseError> {
    let id: String = text(row, 0, "note.id")?;
    let user_id: String = text(row, 1, "note.user_id")?;
    let created: String = text(row, 5, "note.created_at")?;
    let updated: String = text(row, 6, "note.updated_at")?;

    Ok(Note {
        id: parse_uuid(&id, "note.id")?,
        user_id: parse_uuid(&user_id, "note.user_id")?,
        title: text(row, 2, "note.title")?,
        content: row.get(3).unwrap_or_default(),
        tags: row.get(4).unwrap_or_default(),
        created_at: parse_datetime(&created),
        updated_at: parse_datetime(&updated),
    })
}

const STUDY_COLUMNS: &str =
    "id, user_id, date, duration_minutes, subject, productivity_score, notes";

fn row_to_study_session(row: &libsql::Row) -> Result<StudySession, DatabaseError> {
    let id: String = text(row, 0, "study.id")?;
    let user_id: String = text(row, 1, "study.user_id")?;
    let date: String = text(row, 2, "study.date")?;
    let minutes: i64 = int(row, 3, "study.duration_minutes")?;
    let score: i64 = int(row, 5, "study.productivity_score")?;

    Ok(StudySession {
        id: parse_uuid(&id, "study.id")?,
        user_id: parse_uuid(&user_id, "study.user_id")?,
        date: parse_date(&date)?,
        duration_minutes: u32::try_from(minutes).unwrap_or(0),
        subject: text(row, 4, "study.subject")?,
        productivity_score: u8::try_from(score).unwrap_or(1),
        notes: row.get::<String>(6).ok(),
    })
}

const PROGRESS_COLUMNS: &str = "id, user_id, week_start, health_score, finance_score, study_score, consistency_streak, reflection, created_at";

fn row_to_progress(row: &libsql::Row) -> Result<WeeklyProgress, DatabaseError> {
    let id: String = text(row, 0, "progress.id")?;
    let user_id: String = text(row, 1, "progress.user_id")?;
    let week_start: String = text(row, 2, "progress.week_start")?;
    let score = |idx: i32| {
        row.get::<i64>(idx)
            .ok()
            .and_then(|v| i32::try_from(v).ok())
    };
    let streak: i64 = row.get(6).unwrap_or(0);
    let created: String = text(row, 8, "progress.created_at")?;

    Ok(WeeklyProgress {
        id: parse_uuid(&id, "progress.id")?,
        user_id: parse_uuid(&user_id, "progress.user_id")?,
        week_start: parse_date(&week_start)?,
        health_score: score(3),
        finance_score: score(4),
        study_score: score(5),
        consistency_streak: u32::try_from(streak).unwrap_or(0),
        reflection: row.get(7).unwrap_or_default(),
        created_at: parse_datetime(&created),
    })
}

#[async_trait]
impl Database for LibSqlBackend {
    async fn run_migrations(&self) -> Result<(), DatabaseError> {
        migrations::run_migrations(self.conn()).await
    }

    // ── Users ───────────────────────────────────────────────────────

    async fn create_user(&self, user: &User) -> Result<(), DatabaseError> {
        self.conn()
            .execute(
                "INSERT INTO users (id, email, password_hash, name, created_at) VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    user.id.to_string(),
                    user.email.as_str(),
                    user.password_hash.as_str(),
                    user.name.as_str(),
                    user.created_at.to_rfc3339(),
                ],
            )
            .await
            .map_err(|e| {
                let msg = e.to_string();
                if msg.contains("UNIQUE") {
                    DatabaseError::Constraint(format!("users.email: {msg}"))
                } else {
                    DatabaseError::Query(format!("create_user: {msg}"))
                }
            })?;
        debug!(id = %user.id, "User created");
        Ok(())
    }

    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, DatabaseError> {
        let mut rows = self
            .conn()
            .query(
                &format!("SELECT {USER_COLUMNS} FROM users WHERE email = ?1"),
                params![email],
            )
            .await
            .map_err(|e| DatabaseError::Query(format!("get_user_by_email: {e}")))?;

        match rows.next().await {
            Ok(Some(row)) => Ok(Some(row_to_user(&row)?)),
            Ok(None) => Ok(None),
            Err(e) => Err(DatabaseError::Query(format!("get_user_by_email row: {e}"))),
        }
    }

    async fn get_user(&self, id: Uuid) -> Result<Option<User>, DatabaseError> {
        let mut rows = self
            .conn()
            .query(
                &format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?1"),
                params![id.to_string()],
            )
            .await
            .map_err(|e| DatabaseError::Query(format!("get_user: {e}")))?;

        match rows.next().await {
            Ok(Some(row)) => Ok(Some(row_to_user(&row)?)),
            Ok(None) => Ok(None),
            Err(e) => Err(DatabaseError::Query(format!("get_user row: {e}"))),
        }
    }

    // ── Action items ────────────────────────────────────────────────

    async fn insert_action(&self, item: &ActionItem) -> Result<(), DatabaseError> {
        self.conn()
            .execute(
                "INSERT INTO action_items (id, user_id, task, category, source, priority, due_date, completed, created_at, completed_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
                params![
                    item.id.to_string(),
                    item.user_id.to_string(),
                    item.task.as_str(),
                    item.category.as_str(),
                    item.source.as_str(),
                    i64::from(item.priority),
                    item.due_date.map(|d| d.to_string()),
                    item.completed as i64,
                    item.created_at.to_rfc3339(),
                    item.completed_at.map(|d| d.to_rfc3339()),
                ],
            )
            .await
            .map_err(|e| DatabaseError::Query(format!("insert_action: {e}")))?;
        debug!(id = %item.id, category = %item.category, "Action item created");
        Ok(())
    }

    async fn get_action(
        &self,
        user_id: Uuid,
        id: Uuid,
    ) -> Result<Option<ActionItem>, DatabaseError> {
        let mut rows = self
            .conn()
            .query(
                &format!("SELECT {ACTION_COLUMNS} FROM action_items WHERE id = ?1 AND user_id = ?2"),
                params![id.to_string(), user_id.to_string()],
            )
            .await
            .map_err(|e| DatabaseError::Query(format!("get_action: {e}")))?;

        match rows.next().await {
            Ok(Some(row)) => Ok(Some(row_to_action(&row)?)),
            Ok(None) => Ok(None),
            Err(e) => Err(DatabaseError::Query(format!("get_action row: {e}"))),
        }
    }

    async fn list_actions(&self, user_id: Uuid) -> Result<Vec<ActionItem>, DatabaseError> {
        let mut rows = self
            .conn()
            .query(
                &format!("SELECT {ACTION_COLUMNS} FROM action_items WHERE user_id = ?1 ORDER BY completed ASC, priority ASC, created_at ASC"),
                params![user_id.to_string()],
            )
            .await
            .map_err(|e| DatabaseError::Query(format!("list_actions: {e}")))?;

        let mut items = Vec::new();
        while let Some(row) = rows
            .next()
            .await
            .map_err(|e| DatabaseError::Query(format!("list_actions row: {e}")))?
        {
            items.push(row_to_action(&row)?);
        }
        Ok(items)
    }

    async fn complete_action(
        &self,
        user_id: Uuid,
        id: Uuid,
        at: DateTime<Utc>,
    ) -> Result<(), DatabaseError> {
        let affected = self
            .conn()
            .execute(
                "UPDATE action_items SET completed = 1, completed_at = COALESCE(completed_at, ?1) WHERE id = ?2 AND user_id = ?3",
                params![at.to_rfc3339(), id.to_string(), user_id.to_string()],
            )
            .await
            .map_err(|e| DatabaseError::Query(format!("complete_action: {e}")))?;
        ensure_affected(affected, "action_item", id)
    }

    async fn delete_action(&self, user_id: Uuid, id: Uuid) -> Result<(), DatabaseError> {
        let affected = self
            .conn()
            .execute(
                "DELETE FROM action_items WHERE id = ?1 AND user_id = ?2",
                params![id.to_string(), user_id.to_string()],
            )
            .await
            .map_err(|e| DatabaseError::Query(format!("delete_action: {e}")))?;
        ensure_affected(affected, "action_item", id)
    }

    async fn completion_dates(&self, user_id: Uuid) -> Result<Vec<NaiveDate>, DatabaseError> {
        let mut rows = self
            .conn()
            .query(
                "SELECT completed_at FROM action_items WHERE user_id = ?1 AND completed = 1 AND completed_at IS NOT NULL",
                params![user_id.to_string()],
            )
            .await
            .map_err(|e| DatabaseError::Query(format!("completion_dates: {e}")))?;

        let mut dates = Vec::new();
        while let Some(row) = rows
            .next()
            .await
            .map_err(|e| DatabaseError::Query(format!("completion_dates row: {e}")))?
        {
            let raw: String = text(&row, 0, "action.completed_at")?;
            dates.push(parse_datetime(&raw).date_naive());
        }
        dates.sort_unstable();
        dates.dedup();
        Ok(dates)
    }

    // ── Medicines ───────────────────────────────────────────────────

    async fn insert_medicine(&self, medicine: &Medicine) -> Result<(), DatabaseError> {
        self.conn()
            .execute(
                "INSERT INTO medicines (id, user_id, name, dosage, frequency, time_of_day, start_date, end_date, reminder_enabled, last_taken)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
                params![
                    medicine.id.to_string(),
                    medicine.user_id.to_string(),
                    medicine.name.as_str(),
                    medicine.dosage.as_str(),
                    medicine.frequency.as_str(),
                    medicine.time_of_day.as_str(),
                    medicine.start_date.to_string(),
                    medicine.end_date.map(|d| d.to_string()),
                    medicine.reminder_enabled as i64,
                    medicine.last_taken.map(|d| d.to_rfc3339()),
                ],
            )
            .await
            .map_err(|e| DatabaseError::Query(format!("insert_medicine: {e}")))?;
        debug!(id = %medicine.id, "Medicine created");
        Ok(())
    }

    async fn list_medicines(&self, user_id: Uuid) -> Result<Vec<Medicine>, DatabaseError> {
        let mut rows = self
            .conn()
            .query(
                &format!("SELECT {MEDICINE_COLUMNS} FROM medicines WHERE user_id = ?1 ORDER BY name ASC"),
                params![user_id.to_string()],
            )
            .await
            .map_err(|e| DatabaseError::Query(format!("list_medicines: {e}")))?;

        let mut medicines = Vec::new();
        while let Some(row) = rows
            .next()
            .await
            .map_err(|e| DatabaseError::Query(format!("list_medicines row: {e}")))?
        {
            medicines.push(row_to_medicine(&row)?);
        }
        medicines.sort_by_key(|m| m.time_of_day);
        Ok(medicines)
    }

    async fn mark_medicine_taken(
        &self,
        user_id: Uuid,
        id: Uuid,
        at: DateTime<Utc>,
    ) -> Result<(), DatabaseError> {
        let affected = self
            .conn()
            .execute(
                "UPDATE medicines SET last_taken = ?1 WHERE id = ?2 AND user_id = ?3",
                params![at.to_rfc3339(), id.to_string(), user_id.to_string()],
            )
            .await
            .map_err(|e| DatabaseError::Query(format!("mark_medicine_taken: {e}")))?;
        ensure_affected(affected, "medicine", id)
    }

    async fn delete_medicine(&self, user_id: Uuid, id: Uuid) -> Result<(), DatabaseError> {
        let affected = self
            .conn()
            .execute(
                "DELETE FROM medicines WHERE id = ?1 AND user_id = ?2",
                params![id.to_string(), user_id.to_string()],
            )
            .await
            .map_err(|e| DatabaseError::Query(format!("delete_medicine: {e}")))?;
        ensure_affected(affected, "medicine", id)
    }

    // ── Bills ───────────────────────────────────────────────────────

    async fn insert_bill(&self, bill: &Bill) -> Result<(), DatabaseError> {
        self.conn()
            .execute(
                "INSERT INTO bills (id, user_id, name, amount, due_day, category, is_recurring, paid_this_month)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                params![
                    bill.id.to_string(),
                    bill.user_id.to_string(),
                    bill.name.as_str(),
                    bill.amount.to_string(),
                    i64::from(bill.due_day),
                    bill.category.as_str(),
                    bill.is_recurring as i64,
                    bill.paid_this_month as i64,
                ],
            )
            .await
            .map_err(|e| DatabaseError::Query(format!("insert_bill: {e}")))?;
        debug!(id = %bill.id, "Bill created");
        Ok(())
    }

    async fn list_bills(&self, user_id: Uuid) -> Result<Vec<Bill>, DatabaseError> {
        let mut rows = self
            .conn()
            .query(
                &format!("SELECT {BILL_COLUMNS} FROM bills WHERE user_id = ?1 ORDER BY due_day ASC"),
                params![user_id.to_string()],
            )
            .await
            .map_err(|e| DatabaseError::Query(format!("list_bills: {e}")))?;

        let mut bills = Vec::new();
        while let Some(row) = rows
            .next()
            .await
            .map_err(|e| DatabaseError::Query(format!("list_bills row: {e}")))?
        {
            bills.push(row_to_bill(&row)?);
        }
        Ok(bills)
    }

    async fn set_bill_paid(
        &self,
        user_id: Uuid,
        id: Uuid,
        paid: bool,
    ) -> Result<(), DatabaseError> {
        let affected = self
            .conn()
            .execute(
                "UPDATE bills SET paid_this_month = ?1 WHERE id = ?2 AND user_id = ?3",
                params![paid as i64, id.to_string(), user_id.to_string()],
            )
            .await
            .map_err(|e| DatabaseError::Query(format!("set_bill_paid: {e}")))?;
        ensure_affected(affected, "bill", id)
    }

    async fn delete_bill(&self, user_id: Uuid, id: Uuid) -> Result<(), DatabaseError> {
        let affected = self
            .conn()
            .execute(
                "DELETE FROM bills WHERE id = ?1 AND user_id = ?2",
                params![id.to_string(), user_id.to_string()],
            )
            .await
            .map_err(|e| DatabaseError::Query(format!("delete_bill: {e}")))?;
        ensure_affected(affected, "bill", id)
    }

    // ── Notes ───────────────────────────────────────────────────────

    async fn insert_note(&self, note: &Note) -> Result<(), DatabaseError> {
        self.conn()
            .execute(
                "INSERT INTO notes (id, user_id, title, content, tags, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    note.id.to_string(),
                    note.user_id.to_string(),
                    note.title.as_str(),
                    note.content.as_str(),
                    note.tags.as_str(),
                    note.created_at.to_rfc3339(),
                    note.updated_at.to_rfc3339(),
                ],
            )
            .await
            .map_err(|e| DatabaseError::Query(format!("insert_note: {e}")))?;
        debug!(id = %note.id, "Note created");
        Ok(())
    }

    async fn get_note(&self, user_id: Uuid, id: Uuid) -> Result<Option<Note>, DatabaseError> {
        let mut rows = self
            .conn()
            .query(
                &format!("SELECT {NOTE_COLUMNS} FROM notes WHERE id = ?1 AND user_id = ?2"),
                params![id.to_string(), user_id.to_string()],
            )
            .await
            .map_err(|e| DatabaseError::Query(format!("get_note: {e}")))?;

        match rows.next().await {
            Ok(Some(row)) => Ok(Some(row_to_note(&row)?)),
            Ok(None) => Ok(None),
            Err(e) => Err(DatabaseError::Query(format!("get_note row: {e}"))),
        }
    }

    async fn list_notes(&self, user_id: Uuid) -> Result<Vec<Note>, DatabaseError> {
        let mut rows = self
            .conn()
            .query(
                &format!("SELECT {NOTE_COLUMNS} FROM notes WHERE user_id = ?1 ORDER BY updated_at DESC"),
                params![user_id.to_string()],
            )
            .await
            .map_err(|e| DatabaseError::Query(format!("list_notes: {e}")))?;

        let mut notes = Vec::new();
        while let Some(row) = rows
            .next()
            .await
            .map_err(|e| DatabaseError::Query(format!("list_notes row: {e}")))?
        {
            notes.push(row_to_note(&row)?);
        }
        Ok(notes)
    }

    async fn update_note(&self, note: &Note) -> Result<(), DatabaseError> {
        let affected = self
            .conn()
            .execute(
                "UPDATE notes SET title = ?1, content = ?2, tags = ?3, updated_at = ?4 WHERE id = ?5 AND user_id = ?6",
                params![
                    note.title.as_str(),
                    note.content.as_str(),
                    note.tags.as_str(),
                    note.updated_at.to_rfc3339(),
                    note.id.to_string(),
                    note.user_id.to_string(),
                ],
            )
            .await
            .map_err(|e| DatabaseError::Query(format!("update_note: {e}")))?;
        ensure_affected(affected, "note", note.id)
    }

    async fn delete_note(&self, user_id: Uuid, id: Uuid) -> Result<(), DatabaseError> {
        let affected = self
            .conn()
            .execute(
                "DELETE FROM notes WHERE id = ?1 AND user_id = ?2",
                params![id.to_string(), user_id.to_string()],
            )
            .await
            .map_err(|e| DatabaseError::Query(format!("delete_note: {e}")))?;
        ensure_affected(affected, "note", id)
    }

    // ── Study ───────────────────────────────────────────────────────

    async fn insert_study_session(&self, session: &StudySession) -> Result<(), DatabaseError> {
        self.conn()
            .execute(
                "INSERT INTO study_sessions (id, user_id, date, duration_minutes, subject, productivity_score, notes)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    session.id.to_string(),
                    session.user_id.to_string(),
                    session.date.to_string(),
                    i64::from(session.duration_minutes),
                    session.subject.as_str(),
                    i64::from(session.productivity_score),
                    session.notes.clone(),
                ],
            )
            .await
            .map_err(|e| DatabaseError::Query(format!("insert_study_session: {e}")))?;
        debug!(id = %session.id, minutes = session.duration_minutes, "Study session recorded");
        Ok(())
    }

    async fn list_study_sessions(
        &self,
        user_id: Uuid,
        since: Option<NaiveDate>,
    ) -> Result<Vec<StudySession>, DatabaseError> {
        // ISO dates compare correctly as text.
        let since = since.map(|d| d.to_string()).unwrap_or_default();
        let mut rows = self
            .conn()
            .query(
                &format!("SELECT {STUDY_COLUMNS} FROM study_sessions WHERE user_id = ?1 AND date >= ?2 ORDER BY date DESC"),
                params![user_id.to_string(), since],
            )
            .await
            .map_err(|e| DatabaseError::Query(format!("list_study_sessions: {e}")))?;

        let mut sessions = Vec::new();
        while let Some(row) = rows
            .next()
            .await
            .map_err(|e| DatabaseError::Query(format!("list_study_sessions row: {e}")))?
        {
            sessions.push(row_to_study_session(&row)?);
        }
        Ok(sessions)
    }

    // ── Weekly progress ─────────────────────────────────────────────

    async fn insert_weekly_progress(&self, progress: &WeeklyProgress) -> Result<(), DatabaseError> {
        self.conn()
            .execute(
                "INSERT INTO weekly_progress (id, user_id, week_start, health_score, finance_score, study_score, consistency_streak, reflection, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
                params![
                    progress.id.to_string(),
                    progress.user_id.to_string(),
                    progress.week_start.to_string(),
                    progress.health_score.map(i64::from),
                    progress.finance_score.map(i64::from),
                    progress.study_score.map(i64::from),
                    i64::from(progress.consistency_streak),
                    progress.reflection.as_str(),
                    progress.created_at.to_rfc3339(),
                ],
            )
            .await
            .map_err(|e| DatabaseError::Query(format!("insert_weekly_progress: {e}")))?;
        debug!(id = %progress.id, week = %progress.week_start, "Weekly progress stored");
        Ok(())
    }

    async fn list_weekly_progress(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<WeeklyProgress>, DatabaseError> {
        let mut rows = self
            .conn()
            .query(
                &format!("SELECT {PROGRESS_COLUMNS} FROM weekly_progress WHERE user_id = ?1 ORDER BY week_start DESC, created_at DESC"),
                params![user_id.to_string()],
            )
            .await
            .map_err(|e| DatabaseError::Query(format!("list_weekly_progress: {e}")))?;

        let mut out = Vec::new();
        while let Some(row) = rows
            .next()
            .await
            .map_err(|e| DatabaseError::Query(format!("list_weekly_progress row: {e}")))?
        {
            out.push(row_to_progress(&row)?);
        }
        Ok(out)
    }

    // ── Stats ───────────────────────────────────────────────────────

    async fn activity_counts(&self, user_id: Uuid) -> Result<ActivityCounts, DatabaseError> {
        Ok(ActivityCounts {
            total_actions: self
                .count("SELECT COUNT(*) FROM action_items WHERE user_id = ?1", user_id)
                .await?,
            completed_actions: self
                .count(
                    "SELECT COUNT(*) FROM action_items WHERE user_id = ?1 AND completed = 1",
                    user_id,
                )
                .await?,
            medicines: self
                .count("SELECT COUNT(*) FROM medicines WHERE user_id = ?1", user_id)
                .await?,
            bills: self
                .count("SELECT COUNT(*) FROM bills WHERE user_id = ?1", user_id)
                .await?,
            notes: self
                .count("SELECT COUNT(*) FROM notes WHERE user_id = ?1", user_id)
                .await?,
        })
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone};
    use rust_decimal_macros::dec;

    use super::*;

    async fn backend_with_user() -> (LibSqlBackend, Uuid) {
        let db = LibSqlBackend::new_memory().await.unwrap();
        let user = User::new("ann@example.com", "hash".into(), "Ann");
        db.create_user(&user).await.unwrap();
        (db, user.id)
    }

    #[tokio::test]
    async fn user_roundtrip_and_unique_email() {
        let (db, id) = backend_with_user().await;
        let found = db.get_user_by_email("ann@example.com").await.unwrap().unwrap();
        assert_eq!(found.id, id);
        assert_eq!(found.name, "Ann");
        assert_eq!(db.get_user(id).await.unwrap().unwrap().email, "ann@example.com");

        let dup = User::new("ANN@example.com", "hash2".into(), "Other Ann");
        let err = db.create_user(&dup).await.unwrap_err();
        assert!(matches!(err, DatabaseError::Constraint(_)));
        assert!(db.get_user_by_email("bob@example.com").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn action_roundtrip_preserves_fields() {
        let (db, user) = backend_with_user().await;
        let due = NaiveDate::from_ymd_opt(2026, 6, 1).unwrap();
        let item = ActionItem::new(user, "Book dentist appointment", Category::Health, ActionSource::AiAgent)
            .with_priority(1)
            .with_due_date(due);
        db.insert_action(&item).await.unwrap();

        let loaded = db.get_action(user, item.id).await.unwrap().unwrap();
        assert_eq!(loaded.task, item.task);
        assert_eq!(loaded.category, Category::Health);
        assert_eq!(loaded.source, ActionSource::AiAgent);
        assert_eq!(loaded.priority, 1);
        assert_eq!(loaded.due_date, Some(due));
        assert!(!loaded.completed);
        assert_eq!(loaded.created_at.timestamp(), item.created_at.timestamp());
    }

    #[tokio::test]
    async fn completing_twice_matches_completing_once() {
        let (db, user) = backend_with_user().await;
        let item = ActionItem::new(user, "Pay the power bill", Category::Finance, ActionSource::User);
        db.insert_action(&item).await.unwrap();

        let first = Utc.with_ymd_and_hms(2026, 5, 1, 8, 0, 0).unwrap();
        db.complete_action(user, item.id, first).await.unwrap();
        let once = db.get_action(user, item.id).await.unwrap().unwrap();

        db.complete_action(user, item.id, first + Duration::hours(3)).await.unwrap();
        let twice = db.get_action(user, item.id).await.unwrap().unwrap();

        assert_eq!(once, twice);
        assert!(twice.completed);
        assert_eq!(twice.completed_at, Some(first));
    }

    #[tokio::test]
    async fn other_users_rows_are_not_found() {
        let (db, user) = backend_with_user().await;
        let stranger = Uuid::new_v4();
        let item = ActionItem::new(user, "Stretch for ten minutes", Category::Health, ActionSource::User);
        db.insert_action(&item).await.unwrap();

        assert!(db.get_action(stranger, item.id).await.unwrap().is_none());
        let err = db.complete_action(stranger, item.id, Utc::now()).await.unwrap_err();
        assert!(matches!(err, DatabaseError::NotFound { .. }));
        let err = db.delete_action(stranger, item.id).await.unwrap_err();
        assert!(matches!(err, DatabaseError::NotFound { .. }));

        db.delete_action(user, item.id).await.unwrap();
        assert!(db.list_actions(user).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn list_actions_puts_pending_first() {
        let (db, user) = backend_with_user().await;
        let done = ActionItem::new(user, "Already finished task", Category::General, ActionSource::User)
            .with_priority(1);
        let low = ActionItem::new(user, "Low priority errand", Category::Personal, ActionSource::User)
            .with_priority(3);
        let high = ActionItem::new(user, "High priority errand", Category::Personal, ActionSource::User)
            .with_priority(1);
        for item in [&done, &low, &high] {
            db.insert_action(item).await.unwrap();
        }
        db.complete_action(user, done.id, Utc::now()).await.unwrap();

        let ids: Vec<Uuid> = db.list_actions(user).await.unwrap().iter().map(|a| a.id).collect();
        assert_eq!(ids, vec![high.id, low.id, done.id]);
    }

    #[tokio::test]
    async fn completion_dates_are_distinct_and_sorted() {
        let (db, user) = backend_with_user().await;
        let day1 = Utc.with_ymd_and_hms(2026, 5, 1, 8, 0, 0).unwrap();
        let day2 = Utc.with_ymd_and_hms(2026, 5, 2, 8, 0, 0).unwrap();
        for at in [day2, day1, day1 + Duration::hours(2)] {
            let item = ActionItem::new(user, "Some completed task", Category::General, ActionSource::User);
            db.insert_action(&item).await.unwrap();
            db.complete_action(user, item.id, at).await.unwrap();
        }
        let dates = db.completion_dates(user).await.unwrap();
        assert_eq!(dates, vec![day1.date_naive(), day2.date_naive()]);
    }

    #[tokio::test]
    async fn medicine_roundtrip_and_taken() {
        let (db, user) = backend_with_user().await;
        let med = Medicine::new(user, "Vitamin D", "1000 IU", Frequency::Daily, TimeOfDay::Morning);
        db.insert_medicine(&med).await.unwrap();

        let at = Utc.with_ymd_and_hms(2026, 5, 1, 7, 30, 0).unwrap();
        db.mark_medicine_taken(user, med.id, at).await.unwrap();
        let loaded = db.list_medicines(user).await.unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].name, "Vitamin D");
        assert_eq!(loaded[0].dosage, "1000 IU");
        assert_eq!(loaded[0].frequency, Frequency::Daily);
        assert_eq!(loaded[0].time_of_day, TimeOfDay::Morning);
        assert_eq!(loaded[0].start_date, med.start_date);
        assert_eq!(loaded[0].last_taken, Some(at));

        db.delete_medicine(user, med.id).await.unwrap();
        assert!(db.list_medicines(user).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn bill_roundtrip_keeps_decimal_amount() {
        let (db, user) = backend_with_user().await;
        let bill = Bill::new(user, "Internet", dec!(59.99), 15, BillCategory::Utilities).unwrap();
        db.insert_bill(&bill).await.unwrap();
        db.set_bill_paid(user, bill.id, true).await.unwrap();

        let loaded = db.list_bills(user).await.unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].amount, dec!(59.99));
        assert_eq!(loaded[0].due_day, 15);
        assert_eq!(loaded[0].category, BillCategory::Utilities);
        assert!(loaded[0].paid_this_month);

        db.delete_bill(user, bill.id).await.unwrap();
        assert!(db.delete_bill(user, bill.id).await.is_err());
    }

    #[tokio::test]
    async fn note_update_roundtrip() {
        let (db, user) = backend_with_user().await;
        let mut note = Note::new(user, "Ideas", "first draft", "work, ideas");
        db.insert_note(&note).await.unwrap();

        note.content = "second draft".into();
        note.updated_at = note.created_at + Duration::minutes(5);
        db.update_note(&note).await.unwrap();

        let loaded = db.get_note(user, note.id).await.unwrap().unwrap();
        assert_eq!(loaded.content, "second draft");
        assert_eq!(loaded.tag_list(), vec!["work", "ideas"]);
        assert_eq!(loaded.updated_at.timestamp(), note.updated_at.timestamp());

        db.delete_note(user, note.id).await.unwrap();
        assert!(db.get_note(user, note.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn study_sessions_filter_by_date() {
        let (db, user) = backend_with_user().await;
        let old = StudySession::new(user, NaiveDate::from_ymd_opt(2026, 4, 1).unwrap(), 30, "History", 5);
        let mut recent = StudySession::new(user, NaiveDate::from_ymd_opt(2026, 4, 20).unwrap(), 45, "Math", 8);
        recent.notes = Some("chapter 4".into());
        db.insert_study_session(&old).await.unwrap();
        db.insert_study_session(&recent).await.unwrap();

        let all = db.list_study_sessions(user, None).await.unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].id, recent.id);

        let since = db
            .list_study_sessions(user, NaiveDate::from_ymd_opt(2026, 4, 14))
            .await
            .unwrap();
        assert_eq!(since, vec![recent]);
    }

    #[tokio::test]
    async fn weekly_progress_roundtrip() {
        let (db, user) = backend_with_user().await;
        let progress = WeeklyProgress {
            id: Uuid::new_v4(),
            user_id: user,
            week_start: NaiveDate::from_ymd_opt(2026, 4, 13).unwrap(),
            health_score: Some(7),
            finance_score: None,
            study_score: Some(6),
            consistency_streak: 3,
            reflection: "Solid week.".into(),
            created_at: Utc.with_ymd_and_hms(2026, 4, 19, 20, 0, 0).unwrap(),
        };
        db.insert_weekly_progress(&progress).await.unwrap();
        assert_eq!(db.list_weekly_progress(user).await.unwrap(), vec![progress]);
    }

    #[tokio::test]
    async fn activity_counts_tally_rows() {
        let (db, user) = backend_with_user().await;
        let a = ActionItem::new(user, "First useful task", Category::General, ActionSource::User);
        let b = ActionItem::new(user, "Second useful task", Category::General, ActionSource::User);
        db.insert_action(&a).await.unwrap();
        db.insert_action(&b).await.unwrap();
        db.complete_action(user, a.id, Utc::now()).await.unwrap();
        db.insert_note(&Note::new(user, "n", "", "")).await.unwrap();

        let counts = db.activity_counts(user).await.unwrap();
        assert_eq!(counts.total_actions, 2);
        assert_eq!(counts.completed_actions, 1);
        assert_eq!(counts.notes, 1);
        assert_eq!(counts.medicines, 0);
        assert_eq!(counts.bills, 0);
    }

    #[tokio::test]
    async fn local_file_persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("lifeops.db");
        let user = User::new("c@d.e", "hash".into(), "Cy");
        {
            let db = LibSqlBackend::new_local(&path).await.unwrap();
            db.create_user(&user).await.unwrap();
        }
        let db = LibSqlBackend::new_local(&path).await.unwrap();
        assert!(db.get_user(user.id).await.unwrap().is_some());
    }
}
