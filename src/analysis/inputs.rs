//! Dashboard form inputs that drive metrics and the analysis prompts.

use chrono::{Duration, NaiveDate, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

/// Furthest exam date the form accepts, in days from today.
pub const MAX_EXAM_HORIZON_DAYS: i64 = 365;

/// Self-reported exercise habit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExerciseFrequency {
    Rarely,
    OneToTwoPerWeek,
    ThreeToFourPerWeek,
    Daily,
}

impl ExerciseFrequency {
    pub fn label(&self) -> &'static str {
        match self {
            ExerciseFrequency::Rarely => "Rarely",
            ExerciseFrequency::OneToTwoPerWeek => "1-2 times/week",
            ExerciseFrequency::ThreeToFourPerWeek => "3-4 times/week",
            ExerciseFrequency::Daily => "Daily",
        }
    }
}

/// Everything the user enters on the dashboard form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LifeInputs {
    /// 1 (relaxed) to 10 (extremely stressed).
    pub stress_level: u8,
    pub sleep_hours: u8,
    pub exercise_frequency: ExerciseFrequency,
    pub exam_date: Option<NaiveDate>,
    pub current_study_hours: u8,
    pub monthly_budget: Decimal,
    pub current_expenses: Decimal,
    pub financial_goals: String,
    pub problem: String,
}

impl Default for LifeInputs {
    fn default() -> Self {
        Self {
            stress_level: 5,
            sleep_hours: 7,
            exercise_frequency: ExerciseFrequency::Rarely,
            exam_date: Some(Utc::now().date_naive() + Duration::days(30)),
            current_study_hours: 3,
            monthly_budget: dec!(2000),
            current_expenses: dec!(1500),
            financial_goals: "Save for emergency fund, reduce unnecessary expenses".to_string(),
            problem: "I'm stressed about my upcoming exam but also need to manage my budget and health"
                .to_string(),
        }
    }
}

impl LifeInputs {
    /// Range checks matching the dashboard form's widgets.
    pub fn validate(&self, today: NaiveDate) -> Result<(), String> {
        if !(1..=10).contains(&self.stress_level) {
            return Err("Stress level must be between 1 and 10".to_string());
        }
        if self.sleep_hours > 12 {
            return Err("Sleep hours must be between 0 and 12".to_string());
        }
        if self.current_study_hours > 12 {
            return Err("Study hours must be between 0 and 12".to_string());
        }
        if self.monthly_budget.is_sign_negative() || self.current_expenses.is_sign_negative() {
            return Err("Budget and expenses cannot be negative".to_string());
        }
        if self.days_until_exam(today) > MAX_EXAM_HORIZON_DAYS {
            return Err(format!(
                "Exam date must be within {MAX_EXAM_HORIZON_DAYS} days"
            ));
        }
        Ok(())
    }

    /// Whole days from `today` to the exam; 0 when no exam is set.
    pub fn days_until_exam(&self, today: NaiveDate) -> i64 {
        self.exam_date
            .map(|exam| (exam - today).num_days())
            .unwrap_or(0)
    }

    /// `budget - expenses`, negative when overspending.
    pub fn monthly_savings(&self) -> Decimal {
        self.monthly_budget - self.current_expenses
    }

    pub fn exam_date_label(&self) -> String {
        self.exam_date
            .map(|d| d.to_string())
            .unwrap_or_else(|| "Not specified".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn savings_are_signed() {
        let inputs = LifeInputs {
            monthly_budget: dec!(2000),
            current_expenses: dec!(1800),
            ..Default::default()
        };
        assert_eq!(inputs.monthly_savings(), dec!(200));

        let over = LifeInputs {
            monthly_budget: dec!(1000),
            current_expenses: dec!(1250),
            ..Default::default()
        };
        assert_eq!(over.monthly_savings(), dec!(-250));
    }

    #[test]
    fn days_until_exam() {
        let today = NaiveDate::from_ymd_opt(2026, 5, 1).unwrap();
        let inputs = LifeInputs {
            exam_date: NaiveDate::from_ymd_opt(2026, 5, 15),
            ..Default::default()
        };
        assert_eq!(inputs.days_until_exam(today), 14);

        let none = LifeInputs {
            exam_date: None,
            ..Default::default()
        };
        assert_eq!(none.days_until_exam(today), 0);
        assert_eq!(none.exam_date_label(), "Not specified");
    }

    #[test]
    fn partial_json_fills_defaults() {
        let inputs: LifeInputs =
            serde_json::from_str(r#"{"stress_level": 8, "monthly_budget": "2000"}"#).unwrap();
        assert_eq!(inputs.stress_level, 8);
        assert_eq!(inputs.sleep_hours, 7);
        assert_eq!(inputs.exercise_frequency, ExerciseFrequency::Rarely);
    }

    #[test]
    fn validation_rejects_out_of_range() {
        let today = NaiveDate::from_ymd_opt(2026, 5, 1).unwrap();
        let bad = LifeInputs {
            stress_level: 0,
            ..Default::default()
        };
        assert!(bad.validate(today).is_err());
        let bad = LifeInputs {
            current_expenses: dec!(-1),
            ..Default::default()
        };
        assert!(bad.validate(today).is_err());
        let ok = LifeInputs {
            exam_date: Some(today + Duration::days(30)),
            ..Default::default()
        };
        assert!(ok.validate(today).is_ok());
    }

    #[test]
    fn validation_bounds_exam_date() {
        let today = NaiveDate::from_ymd_opt(2026, 5, 1).unwrap();
        let at_limit = LifeInputs {
            exam_date: Some(today + Duration::days(MAX_EXAM_HORIZON_DAYS)),
            ..Default::default()
        };
        assert!(at_limit.validate(today).is_ok());

        for far in [NaiveDate::from_ymd_opt(9999, 12, 31).unwrap(), NaiveDate::MAX] {
            let inputs = LifeInputs {
                exam_date: Some(far),
                ..Default::default()
            };
            let err = inputs.validate(today).unwrap_err();
            assert!(err.contains("365"));
        }

        // Past exams fall back to the weekly plan and stay valid.
        let past = LifeInputs {
            exam_date: NaiveDate::from_ymd_opt(1, 1, 1),
            ..Default::default()
        };
        assert!(past.validate(today).is_ok());
    }
}
