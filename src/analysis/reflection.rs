//! Weekly reflection: gather the week's numbers, ask the reflection coach
//! for a review, fall back to a local summary when the model is unavailable.

use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::analysis::inputs::LifeInputs;
use crate::analysis::prompts;
use crate::llm::{ChatMessage, CompletionRequest, LlmProvider};

/// A stored weekly review.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeeklyProgress {
    pub id: Uuid,
    pub user_id: Uuid,
    /// Monday of the reviewed week.
    pub week_start: NaiveDate,
    pub health_score: Option<i32>,
    pub finance_score: Option<i32>,
    pub study_score: Option<i32>,
    pub consistency_streak: u32,
    pub reflection: String,
    pub created_at: DateTime<Utc>,
}

/// Optional self-assessed scores sent with `POST /api/reflection`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReflectionRequest {
    pub health_score: Option<i32>,
    pub finance_score: Option<i32>,
    pub study_score: Option<i32>,
}

/// Numbers the weekly review is written from.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeekData {
    pub completed_actions: u64,
    pub total_actions: u64,
    pub study_hours: f64,
    pub avg_focus: f64,
    pub bills_paid: usize,
    pub bills_total: usize,
    pub savings: Option<Decimal>,
    pub stress_level: Option<u8>,
    pub streak: u32,
}

impl WeekData {
    /// Fold in the most recent dashboard inputs, if any.
    pub fn with_inputs(mut self, inputs: Option<&LifeInputs>) -> Self {
        if let Some(inputs) = inputs {
            self.savings = Some(inputs.monthly_savings());
            self.stress_level = Some(inputs.stress_level);
        }
        self
    }

    fn completion_rate(&self) -> f64 {
        if self.total_actions == 0 {
            0.0
        } else {
            self.completed_actions as f64 / self.total_actions as f64 * 100.0
        }
    }

    /// One line per metric, embedded in the reflection prompt.
    pub fn as_prompt_context(&self) -> String {
        let savings = self
            .savings
            .map(|s| format!("${s}"))
            .unwrap_or_else(|| "not recorded".to_string());
        let stress = self
            .stress_level
            .map(|s| format!("{s}/10"))
            .unwrap_or_else(|| "not recorded".to_string());
        format!(
            "- Actions completed: {}/{}\n\
             - Study hours: {:.1}\n\
             - Average focus: {:.1}/10\n\
             - Bills paid: {}/{}\n\
             - Monthly savings: {savings}\n\
             - Stress level: {stress}\n\
             - Consistency streak: {} days",
            self.completed_actions,
            self.total_actions,
            self.study_hours,
            self.avg_focus,
            self.bills_paid,
            self.bills_total,
            self.streak,
        )
    }
}

/// Monday of the week containing `day`.
pub fn week_start(day: NaiveDate) -> NaiveDate {
    day - Duration::days(i64::from(day.weekday().num_days_from_monday()))
}

/// Locally templated review used when the model cannot be reached.
pub fn weekly_summary_template(data: &WeekData) -> String {
    let mut out = String::from("## Weekly Summary\n\n");
    out.push_str(&format!(
        "**Tasks:** {} of {} completed ({:.0}%)\n",
        data.completed_actions,
        data.total_actions,
        data.completion_rate()
    ));
    out.push_str(&format!(
        "**Study:** {:.1} hours at an average focus of {:.1}/10\n",
        data.study_hours, data.avg_focus
    ));
    out.push_str(&format!(
        "**Bills:** {} of {} paid\n",
        data.bills_paid, data.bills_total
    ));
    if let Some(savings) = data.savings {
        out.push_str(&format!("**Savings:** ${savings} this month\n"));
    }
    out.push_str(&format!("**Streak:** {} days\n\n", data.streak));

    out.push_str("### Next Week\n");
    if data.completion_rate() < 50.0 {
        out.push_str("- Pick three must-do tasks each morning and finish them first\n");
    } else {
        out.push_str("- Keep the current task rhythm going\n");
    }
    if data.study_hours < 5.0 {
        out.push_str("- Schedule at least one focused study block per day\n");
    }
    if data.stress_level.is_some_and(|s| s >= 7) {
        out.push_str("- Protect sleep and add a short daily walk to bring stress down\n");
    }
    if data.savings.is_some_and(|s| s.is_sign_negative()) {
        out.push_str("- Review spending: expenses are above budget\n");
    }
    out
}

/// Ask the reflection coach for a review. Returns the text and whether it
/// came from the model.
pub async fn write_reflection(
    llm: Option<&dyn LlmProvider>,
    data: &WeekData,
    temperature: f32,
) -> (String, bool) {
    let Some(llm) = llm else {
        return (weekly_summary_template(data), false);
    };

    let request = CompletionRequest::new(vec![
        ChatMessage::system(prompts::REFLECTION_PERSONA.preamble()),
        ChatMessage::user(prompts::reflection_task(data)),
    ])
    .with_temperature(temperature);

    match llm.complete(request).await {
        Ok(resp) if !resp.content.trim().is_empty() => (resp.content, true),
        Ok(_) => {
            tracing::warn!("Reflection model returned empty text, using template");
            (weekly_summary_template(data), false)
        }
        Err(e) => {
            tracing::warn!(error = %e, "Reflection model failed, using template");
            (weekly_summary_template(data), false)
        }
    }
}
