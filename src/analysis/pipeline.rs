//! Sequential analysis pipeline with two fallback tiers.
//!
//! health → finance → study → coordination, each stage awaited in turn.
//! Any stage error abandons the current path for the next one down:
//! persona agents, then plain prompts with a templated plan, then fixed
//! texts. `run` never fails.

use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::analysis::extract::{self, cross_domain_insights, parse_structured_output};
use crate::analysis::inputs::LifeInputs;
use crate::analysis::prompts::{self, Persona};
use crate::error::{LlmError, PipelineError};
use crate::llm::{ChatMessage, CompletionRequest, LlmProvider};

/// Which path produced a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisMode {
    /// Persona agents, coordinator included.
    Orchestrated,
    /// Plain prompts, locally templated coordination.
    Direct,
    /// Fixed default texts, no model output.
    Fallback,
}

/// Coordinator's verdict on the domain recommendations.
///
/// Models are loose with JSON types, so marks may arrive as booleans and
/// the score as a float or a numeric string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationReport {
    #[serde(default)]
    pub summary: String,
    #[serde(default, deserialize_with = "loose_mark")]
    pub health_approved: String,
    #[serde(default, deserialize_with = "loose_mark")]
    pub finance_approved: String,
    #[serde(default, deserialize_with = "loose_mark")]
    pub study_approved: String,
    #[serde(deserialize_with = "loose_score")]
    pub overall_score: u32,
}

fn loose_mark<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) => s,
        serde_json::Value::Bool(true) => "✅".to_string(),
        serde_json::Value::Bool(false) => "❌".to_string(),
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    })
}

/// Rounded and clamped to 0-100.
fn loose_score<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    let score = match &value {
        serde_json::Value::Number(n) => n.as_f64(),
        serde_json::Value::String(s) => s.trim().trim_end_matches('%').trim().parse::<f64>().ok(),
        _ => None,
    }
    .filter(|n| n.is_finite())
    .ok_or_else(|| serde::de::Error::custom(format!("not a score: {value}")))?;
    Ok(score.round().clamp(0.0, 100.0) as u32)
}

impl ValidationReport {
    fn approved(summary: &str, mark: &str, score: u32) -> Self {
        Self {
            summary: summary.to_string(),
            health_approved: mark.to_string(),
            finance_approved: mark.to_string(),
            study_approved: mark.to_string(),
            overall_score: score,
        }
    }
}

/// A per-agent card for the results view.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InsightCard {
    pub title: String,
    pub content: String,
    pub agent: &'static str,
    pub color: &'static str,
}

/// Card colour for an agent label.
pub fn agent_color(agent: &str) -> &'static str {
    match agent {
        "Health" => "#4CAF50",
        "Finance" => "#FF9800",
        "Study" => "#2196F3",
        "Coordinator" => "#9C27B0",
        "Reflection" => "#607D8B",
        _ => "#2E86AB",
    }
}

/// Output of one pipeline run.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisResults {
    pub mode: AnalysisMode,
    pub health: String,
    pub finance: String,
    pub study: String,
    pub coordination: String,
    pub cross_domain_insights: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub validation_report: Option<ValidationReport>,
    /// The swallowed error that pushed the run down a tier.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub generated_at: DateTime<Utc>,
}

impl AnalysisResults {
    /// All four texts joined, as fed to action item extraction.
    pub fn combined_text(&self) -> String {
        [&self.health, &self.finance, &self.study, &self.coordination]
            .iter()
            .map(|s| s.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn action_items(&self) -> Vec<String> {
        extract::extract_action_items(&self.combined_text())
    }

    pub fn insight_cards(&self) -> Vec<InsightCard> {
        [
            ("Health Insights", &self.health, prompts::HEALTH_PERSONA.agent),
            ("Finance Insights", &self.finance, prompts::FINANCE_PERSONA.agent),
            ("Study Insights", &self.study, prompts::STUDY_PERSONA.agent),
            ("Integrated Plan", &self.coordination, prompts::COORDINATOR_PERSONA.agent),
        ]
        .into_iter()
        .map(|(title, content, agent)| InsightCard {
            title: title.to_string(),
            content: content.clone(),
            agent,
            color: agent_color(agent),
        })
        .collect()
    }

    fn fallback(error: &dyn std::fmt::Display) -> Self {
        Self {
            mode: AnalysisMode::Fallback,
            health: prompts::DEFAULT_HEALTH.to_string(),
            finance: prompts::DEFAULT_FINANCE.to_string(),
            study: prompts::DEFAULT_STUDY.to_string(),
            coordination: prompts::DEFAULT_COORDINATION.to_string(),
            cross_domain_insights: prompts::DEFAULT_INSIGHTS.to_string(),
            validation_report: Some(ValidationReport::approved(
                "Analysis Completed (Fallback Mode)",
                "✅",
                85,
            )),
            error: Some(error.to_string()),
            generated_at: Utc::now(),
        }
    }
}

/// Runs the analysis against an optional model.
pub struct AnalysisPipeline {
    llm: Option<Arc<dyn LlmProvider>>,
    temperature: f32,
}

impl AnalysisPipeline {
    pub fn new(llm: Option<Arc<dyn LlmProvider>>, temperature: f32) -> Self {
        Self { llm, temperature }
    }

    /// Run the analysis. Never fails; see `AnalysisResults::mode`.
    pub async fn run(&self, inputs: &LifeInputs, today: NaiveDate) -> AnalysisResults {
        let Some(llm) = self.llm.as_deref() else {
            info!("No model configured, using default analysis");
            return AnalysisResults::fallback(&LlmError::NotConfigured);
        };

        let orchestrated_err = match self.run_orchestrated(llm, inputs, today).await {
            Ok(results) => {
                info!(model = llm.model_name(), "Orchestrated analysis complete");
                return results;
            }
            Err(e) => e,
        };
        warn!(error = %orchestrated_err, "Orchestrated analysis failed, trying direct prompts");

        match self.run_direct(llm, inputs, today).await {
            Ok(mut results) => {
                info!(model = llm.model_name(), "Direct analysis complete");
                results.error = Some(orchestrated_err.to_string());
                results
            }
            Err(e) => {
                warn!(error = %e, "Direct analysis failed, using default analysis");
                AnalysisResults::fallback(&e)
            }
        }
    }

    async fn run_orchestrated(
        &self,
        llm: &dyn LlmProvider,
        inputs: &LifeInputs,
        today: NaiveDate,
    ) -> Result<AnalysisResults, PipelineError> {
        let health = self
            .ask(llm, "health", Some(&prompts::HEALTH_PERSONA), prompts::health_task(inputs))
            .await?;
        let finance = self
            .ask(llm, "finance", Some(&prompts::FINANCE_PERSONA), prompts::finance_task(inputs))
            .await?;
        let study = self
            .ask(llm, "study", Some(&prompts::STUDY_PERSONA), prompts::study_task(inputs, today))
            .await?;
        let coordination = self
            .ask(
                llm,
                "coordination",
                Some(&prompts::COORDINATOR_PERSONA),
                prompts::coordination_task(inputs, &health, &finance, &study),
            )
            .await?;

        let validation_report =
            serde_json::from_value::<ValidationReport>(parse_structured_output(&coordination)).ok();

        Ok(AnalysisResults {
            mode: AnalysisMode::Orchestrated,
            cross_domain_insights: cross_domain_insights(&coordination),
            health,
            finance,
            study,
            coordination,
            validation_report,
            error: None,
            generated_at: Utc::now(),
        })
    }

    async fn run_direct(
        &self,
        llm: &dyn LlmProvider,
        inputs: &LifeInputs,
        today: NaiveDate,
    ) -> Result<AnalysisResults, PipelineError> {
        let health = self
            .ask(llm, "health", None, prompts::direct_health(inputs))
            .await?;
        let finance = self
            .ask(llm, "finance", None, prompts::direct_finance(inputs))
            .await?;
        let study = self
            .ask(llm, "study", None, prompts::direct_study(inputs, today))
            .await?;

        Ok(AnalysisResults {
            mode: AnalysisMode::Direct,
            health,
            finance,
            study,
            coordination: prompts::templated_coordination(inputs),
            cross_domain_insights: prompts::DIRECT_INSIGHTS.to_string(),
            validation_report: Some(ValidationReport::approved(
                "Direct Analysis Complete",
                "✅ Verified",
                95,
            )),
            error: None,
            generated_at: Utc::now(),
        })
    }

    async fn ask(
        &self,
        llm: &dyn LlmProvider,
        domain: &'static str,
        persona: Option<&Persona>,
        prompt: String,
    ) -> Result<String, PipelineError> {
        let mut messages = Vec::with_capacity(2);
        if let Some(persona) = persona {
            messages.push(ChatMessage::system(persona.preamble()));
        }
        messages.push(ChatMessage::user(prompt));

        let request = CompletionRequest::new(messages).with_temperature(self.temperature);
        let response = llm
            .complete(request)
            .await
            .map_err(|source| PipelineError::Stage { domain, source })?;

        if response.content.trim().is_empty() {
            return Err(PipelineError::EmptyResponse { domain });
        }
        info!(
            domain,
            output_tokens = response.output_tokens,
            "Analysis stage complete"
        );
        Ok(response.content)
    }
}
