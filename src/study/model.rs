//! Study session records and the weekly summary.

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A completed block of study time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudySession {
    pub id: Uuid,
    pub user_id: Uuid,
    pub date: NaiveDate,
    pub duration_minutes: u32,
    pub subject: String,
    /// 1-10.
    pub productivity_score: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl StudySession {
    pub fn new(
        user_id: Uuid,
        date: NaiveDate,
        duration_minutes: u32,
        subject: impl Into<String>,
        productivity_score: u8,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            date,
            duration_minutes,
            subject: subject.into(),
            productivity_score: productivity_score.clamp(1, 10),
            notes: None,
        }
    }
}

/// Body of `POST /api/study/sessions`.
#[derive(Debug, Clone, Deserialize)]
pub struct NewStudySessionRequest {
    pub duration_minutes: u32,
    pub subject: String,
    pub productivity_score: u8,
    #[serde(default)]
    pub date: Option<NaiveDate>,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Totals over the trailing seven days.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StudySummary {
    pub total_minutes: u32,
    pub avg_productivity: f64,
    pub session_count: usize,
}

/// Summarise sessions dated within the seven days ending `today`.
pub fn weekly_summary(sessions: &[StudySession], today: NaiveDate) -> StudySummary {
    let from = today - Duration::days(6);
    let recent: Vec<&StudySession> = sessions
        .iter()
        .filter(|s| s.date >= from && s.date <= today)
        .collect();

    let total_minutes = recent.iter().map(|s| s.duration_minutes).sum();
    let avg_productivity = if recent.is_empty() {
        0.0
    } else {
        let sum: u32 = recent.iter().map(|s| u32::from(s.productivity_score)).sum();
        f64::from(sum) / recent.len() as f64
    };

    StudySummary {
        total_minutes,
        avg_productivity,
        session_count: recent.len(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 5, d).unwrap()
    }

    #[test]
    fn productivity_is_clamped() {
        let s = StudySession::new(Uuid::new_v4(), day(1), 30, "Math", 14);
        assert_eq!(s.productivity_score, 10);
        let s = StudySession::new(Uuid::new_v4(), day(1), 30, "Math", 0);
        assert_eq!(s.productivity_score, 1);
    }

    #[test]
    fn summary_covers_last_seven_days_only() {
        let user = Uuid::new_v4();
        let sessions = vec![
            StudySession::new(user, day(20), 50, "Math", 8),
            StudySession::new(user, day(14), 25, "Bio", 6),
            StudySession::new(user, day(13), 90, "Old", 2),
        ];
        let summary = weekly_summary(&sessions, day(20));
        assert_eq!(summary.session_count, 2);
        assert_eq!(summary.total_minutes, 75);
        assert!((summary.avg_productivity - 7.0).abs() < f64::EPSILON);
    }

    #[test]
    fn empty_summary_is_zeroed() {
        let summary = weekly_summary(&[], day(1));
        assert_eq!(summary.session_count, 0);
        assert_eq!(summary.total_minutes, 0);
        assert_eq!(summary.avg_productivity, 0.0);
    }
}
