//! Dashboard numbers and chart series computed from the form inputs and
//! the stored rows.

use chrono::{Duration, NaiveDate};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::analysis::inputs::{LifeInputs, MAX_EXAM_HORIZON_DAYS};
use crate::store::ActivityCounts;

/// Coarse stress reading shown next to the gauge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum StressBand {
    Low,
    Moderate,
    High,
}

impl StressBand {
    pub fn from_level(level: u8) -> Self {
        match level {
            0..3 => StressBand::Low,
            3..7 => StressBand::Moderate,
            _ => StressBand::High,
        }
    }
}

/// The four headline numbers at the top of the dashboard.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KeyMetrics {
    pub stress_level: u8,
    pub stress_band: StressBand,
    pub sleep_hours: u8,
    pub days_until_exam: i64,
    /// `budget - expenses`, negative when overspending.
    pub monthly_savings: Decimal,
    pub consistency_streak: u32,
}

pub fn key_metrics(inputs: &LifeInputs, streak: u32, today: NaiveDate) -> KeyMetrics {
    KeyMetrics {
        stress_level: inputs.stress_level,
        stress_band: StressBand::from_level(inputs.stress_level),
        sleep_hours: inputs.sleep_hours,
        days_until_exam: inputs.days_until_exam(today),
        monthly_savings: inputs.monthly_savings(),
        consistency_streak: streak,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GaugeBand {
    pub from: u8,
    pub to: u8,
    pub color: &'static str,
}

/// Stress gauge on a 0-10 axis.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HealthGauge {
    pub title: &'static str,
    pub value: u8,
    pub min: u8,
    pub max: u8,
    pub bands: Vec<GaugeBand>,
}

pub fn health_gauge(inputs: &LifeInputs) -> HealthGauge {
    HealthGauge {
        title: "Stress Level",
        value: inputs.stress_level,
        min: 0,
        max: 10,
        bands: vec![
            GaugeBand { from: 0, to: 3, color: "green" },
            GaugeBand { from: 3, to: 7, color: "yellow" },
            GaugeBand { from: 7, to: 10, color: "red" },
        ],
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSlice {
    pub label: &'static str,
    pub value: Decimal,
    pub color: &'static str,
}

/// Budget pie: budget, expenses and savings clamped at zero.
pub fn finance_breakdown(inputs: &LifeInputs) -> Vec<ChartSlice> {
    let savings = inputs.monthly_savings().max(Decimal::ZERO);
    vec![
        ChartSlice {
            label: "Budget",
            value: inputs.monthly_budget,
            color: "#2E86AB",
        },
        ChartSlice {
            label: "Recommended Expenses",
            value: inputs.current_expenses,
            color: "#A23B72",
        },
        ChartSlice {
            label: "Savings",
            value: savings,
            color: "#F18F01",
        },
    ]
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StudyDay {
    pub date: NaiveDate,
    pub label: String,
    pub hours: f64,
}

/// Recommended hours per day from today up to the exam.
///
/// Full hours until the final three days, 70% on those, a light 2 hours
/// on the last one. Without an upcoming exam the plan covers a week.
/// Plans never run past `MAX_EXAM_HORIZON_DAYS`.
pub fn study_schedule(inputs: &LifeInputs, today: NaiveDate) -> Vec<StudyDay> {
    let days = match inputs.days_until_exam(today) {
        n if n <= 0 => 7,
        n => n.min(MAX_EXAM_HORIZON_DAYS),
    };
    let daily = f64::from(inputs.current_study_hours);

    (0..days)
        .map(|i| {
            let hours = if i < days - 3 {
                daily
            } else if i == days - 1 {
                2.0
            } else {
                daily * 0.7
            };
            let date = today + Duration::days(i);
            StudyDay {
                date,
                label: date.format("%b %d").to_string(),
                hours,
            }
        })
        .collect()
}

/// Every chart on the dashboard.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardCharts {
    pub health_gauge: HealthGauge,
    pub finance: Vec<ChartSlice>,
    pub study_schedule: Vec<StudyDay>,
}

pub fn dashboard_charts(inputs: &LifeInputs, today: NaiveDate) -> DashboardCharts {
    DashboardCharts {
        health_gauge: health_gauge(inputs),
        finance: finance_breakdown(inputs),
        study_schedule: study_schedule(inputs, today),
    }
}

/// Consecutive days with a completed action, ending today or yesterday.
///
/// `dates` must be sorted ascending; duplicates are ignored.
pub fn consistency_streak(dates: &[NaiveDate], today: NaiveDate) -> u32 {
    let Some(&last) = dates.last() else {
        return 0;
    };
    if last != today && last != today - Duration::days(1) {
        return 0;
    }

    let mut streak = 1;
    let mut expected = last - Duration::days(1);
    for &date in dates.iter().rev().skip(1) {
        if date == expected {
            streak += 1;
            expected -= Duration::days(1);
        } else if date < expected {
            break;
        }
    }
    streak
}

/// Account-wide counts for the profile page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserStatistics {
    #[serde(flatten)]
    pub counts: ActivityCounts,
    /// Completed actions as a percentage of all actions, one decimal.
    pub completion_rate: f64,
    pub consistency_streak: u32,
}

impl UserStatistics {
    pub fn new(counts: ActivityCounts, streak: u32) -> Self {
        let completion_rate = if counts.total_actions == 0 {
            0.0
        } else {
            let pct = counts.completed_actions as f64 / counts.total_actions as f64 * 100.0;
            (pct * 10.0).round() / 10.0
        };
        Self {
            counts,
            completion_rate,
            consistency_streak: streak,
        }
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;

    fn day(m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, m, d).unwrap()
    }

    fn stressed() -> LifeInputs {
        LifeInputs {
            stress_level: 8,
            sleep_hours: 5,
            monthly_budget: dec!(2000),
            current_expenses: dec!(1800),
            exam_date: None,
            ..Default::default()
        }
    }

    #[test]
    fn headline_numbers_for_a_stressed_student() {
        let inputs = stressed();
        let metrics = key_metrics(&inputs, 3, day(5, 1));
        assert_eq!(metrics.monthly_savings, dec!(200));
        assert_eq!(metrics.stress_level, 8);
        assert_eq!(metrics.stress_band, StressBand::High);
        assert_eq!(metrics.days_until_exam, 0);
        assert_eq!(health_gauge(&inputs).value, 8);
    }

    #[test]
    fn stress_bands() {
        assert_eq!(StressBand::from_level(1), StressBand::Low);
        assert_eq!(StressBand::from_level(2), StressBand::Low);
        assert_eq!(StressBand::from_level(3), StressBand::Moderate);
        assert_eq!(StressBand::from_level(6), StressBand::Moderate);
        assert_eq!(StressBand::from_level(7), StressBand::High);
        assert_eq!(StressBand::from_level(10), StressBand::High);
    }

    #[test]
    fn finance_savings_never_negative() {
        let over = LifeInputs {
            monthly_budget: dec!(1000),
            current_expenses: dec!(1400),
            ..Default::default()
        };
        let slices = finance_breakdown(&over);
        assert_eq!(slices[2].label, "Savings");
        assert_eq!(slices[2].value, Decimal::ZERO);
        assert_eq!(finance_breakdown(&stressed())[2].value, dec!(200));
    }

    #[test]
    fn schedule_tapers_before_exam() {
        let inputs = LifeInputs {
            current_study_hours: 4,
            exam_date: Some(day(5, 11)),
            ..Default::default()
        };
        let plan = study_schedule(&inputs, day(5, 1));
        let hours: Vec<f64> = plan.iter().map(|d| d.hours).collect();
        assert_eq!(hours.len(), 10);
        assert!(hours[..7].iter().all(|h| *h == 4.0));
        assert!((hours[7] - 2.8).abs() < 1e-9);
        assert!((hours[8] - 2.8).abs() < 1e-9);
        assert_eq!(hours[9], 2.0);
        assert_eq!(plan[0].label, "May 01");
        assert_eq!(plan[9].date, day(5, 10));
    }

    #[test]
    fn schedule_defaults_to_a_week() {
        let past = LifeInputs {
            exam_date: Some(day(4, 1)),
            ..Default::default()
        };
        assert_eq!(study_schedule(&past, day(5, 1)).len(), 7);
        assert_eq!(study_schedule(&stressed(), day(5, 1)).len(), 7);
    }

    #[test]
    fn schedule_is_capped_for_distant_exams() {
        let inputs = LifeInputs {
            exam_date: Some(NaiveDate::MAX),
            ..Default::default()
        };
        let plan = study_schedule(&inputs, day(5, 1));
        assert_eq!(plan.len(), MAX_EXAM_HORIZON_DAYS as usize);
        assert_eq!(plan.last().map(|d| d.hours), Some(2.0));
    }

    #[test]
    fn short_schedules() {
        let inputs = LifeInputs {
            current_study_hours: 3,
            exam_date: Some(day(5, 2)),
            ..Default::default()
        };
        let plan = study_schedule(&inputs, day(5, 1));
        assert_eq!(plan.len(), 1);
        assert_eq!(plan[0].hours, 2.0);
    }

    #[test]
    fn streak_counts_back_from_today_or_yesterday() {
        let today = day(5, 10);
        assert_eq!(consistency_streak(&[], today), 0);
        assert_eq!(
            consistency_streak(&[day(5, 7), day(5, 8), day(5, 9), day(5, 10)], today),
            4
        );
        // Yesterday still counts; the gap on the 6th ends the run.
        assert_eq!(
            consistency_streak(&[day(5, 5), day(5, 7), day(5, 8), day(5, 9)], today),
            3
        );
        assert_eq!(consistency_streak(&[day(5, 7), day(5, 8)], today), 0);
        assert_eq!(consistency_streak(&[day(5, 9), day(5, 10), day(5, 10)], today), 2);
    }

    #[test]
    fn completion_rate_rounds_to_one_decimal() {
        let counts = ActivityCounts {
            total_actions: 3,
            completed_actions: 1,
            ..Default::default()
        };
        let stats = UserStatistics::new(counts, 0);
        assert_eq!(stats.completion_rate, 33.3);
        assert_eq!(UserStatistics::new(ActivityCounts::default(), 0).completion_rate, 0.0);
    }
}
