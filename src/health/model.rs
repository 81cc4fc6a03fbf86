//! Medicine vault data model.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// How often a medicine is taken.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Frequency {
    Daily,
    TwiceDaily,
    Weekly,
    AsNeeded,
}

impl Frequency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Frequency::Daily => "daily",
            Frequency::TwiceDaily => "twice_daily",
            Frequency::Weekly => "weekly",
            Frequency::AsNeeded => "as_needed",
        }
    }

    pub fn parse(s: &str) -> Self {
        match s {
            "twice_daily" => Frequency::TwiceDaily,
            "weekly" => Frequency::Weekly,
            "as_needed" => Frequency::AsNeeded,
            _ => Frequency::Daily,
        }
    }
}

/// Preferred time of day; the declaration order is the display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeOfDay {
    Morning,
    Afternoon,
    Evening,
    Night,
    Anytime,
}

impl TimeOfDay {
    pub fn as_str(&self) -> &'static str {
        match self {
            TimeOfDay::Morning => "morning",
            TimeOfDay::Afternoon => "afternoon",
            TimeOfDay::Evening => "evening",
            TimeOfDay::Night => "night",
            TimeOfDay::Anytime => "anytime",
        }
    }

    pub fn parse(s: &str) -> Self {
        match s {
            "morning" => TimeOfDay::Morning,
            "afternoon" => TimeOfDay::Afternoon,
            "evening" => TimeOfDay::Evening,
            "night" => TimeOfDay::Night,
            _ => TimeOfDay::Anytime,
        }
    }
}

/// A tracked medicine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Medicine {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub dosage: String,
    pub frequency: Frequency,
    pub time_of_day: TimeOfDay,
    pub start_date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
    pub reminder_enabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_taken: Option<DateTime<Utc>>,
}

impl Medicine {
    pub fn new(
        user_id: Uuid,
        name: impl Into<String>,
        dosage: impl Into<String>,
        frequency: Frequency,
        time_of_day: TimeOfDay,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            name: name.into(),
            dosage: dosage.into(),
            frequency,
            time_of_day,
            start_date: Utc::now().date_naive(),
            end_date: None,
            reminder_enabled: true,
            last_taken: None,
        }
    }

    /// Whether the course is still running on `today`.
    pub fn is_active_on(&self, today: NaiveDate) -> bool {
        self.end_date.is_none_or(|end| end >= today)
    }
}

/// Body of `POST /api/medicines`.
#[derive(Debug, Clone, Deserialize)]
pub struct NewMedicineRequest {
    pub name: String,
    #[serde(default)]
    pub dosage: String,
    pub frequency: Frequency,
    #[serde(default)]
    pub time_of_day: Option<TimeOfDay>,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enums_roundtrip_through_db_strings() {
        for f in [
            Frequency::Daily,
            Frequency::TwiceDaily,
            Frequency::Weekly,
            Frequency::AsNeeded,
        ] {
            assert_eq!(Frequency::parse(f.as_str()), f);
        }
        for t in [
            TimeOfDay::Morning,
            TimeOfDay::Afternoon,
            TimeOfDay::Evening,
            TimeOfDay::Night,
            TimeOfDay::Anytime,
        ] {
            assert_eq!(TimeOfDay::parse(t.as_str()), t);
        }
    }

    #[test]
    fn active_window() {
        let today = NaiveDate::from_ymd_opt(2026, 3, 10).unwrap();
        let mut med = Medicine::new(
            Uuid::new_v4(),
            "Vitamin D",
            "1000 IU",
            Frequency::Daily,
            TimeOfDay::Morning,
        );
        assert!(med.is_active_on(today));
        med.end_date = NaiveDate::from_ymd_opt(2026, 3, 10);
        assert!(med.is_active_on(today));
        med.end_date = NaiveDate::from_ymd_opt(2026, 3, 9);
        assert!(!med.is_active_on(today));
    }

    #[test]
    fn time_of_day_orders_through_the_day() {
        assert!(TimeOfDay::Morning < TimeOfDay::Evening);
        assert!(TimeOfDay::Night < TimeOfDay::Anytime);
    }
}
