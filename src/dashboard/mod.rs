//! Dashboard metrics, chart series, statistics and export.

pub mod metrics;
pub mod routes;

use chrono::NaiveDate;
use uuid::Uuid;

use crate::error::DatabaseError;
use crate::store::Database;

/// The user's current completion streak as of `today`.
pub async fn current_streak(
    db: &dyn Database,
    user_id: Uuid,
    today: NaiveDate,
) -> Result<u32, DatabaseError> {
    let dates = db.completion_dates(user_id).await?;
    Ok(metrics::consistency_streak(&dates, today))
}
