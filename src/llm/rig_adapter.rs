//! Bridges rig's `CompletionModel` to our `LlmProvider` trait.
//!
//! Each request is run through a one-shot rig agent: system messages become
//! the agent preamble, the remaining messages form the prompt.

use async_trait::async_trait;
use rig::agent::AgentBuilder;
use rig::completion::{CompletionModel, Prompt};
use tracing::debug;

use crate::error::LlmError;
use crate::llm::provider::{
    CompletionRequest, CompletionResponse, FinishReason, LlmProvider, Role,
};

/// Anthropic rejects requests without an explicit token budget.
const DEFAULT_MAX_TOKENS: u32 = 2048;

/// `LlmProvider` backed by any rig completion model.
pub struct RigAdapter<M: CompletionModel> {
    model: M,
    model_name: String,
}

impl<M: CompletionModel> RigAdapter<M> {
    pub fn new(model: M, model_name: &str) -> Self {
        Self {
            model,
            model_name: model_name.to_string(),
        }
    }
}

/// Flatten non-system messages into a single prompt string.
fn prompt_text(request: &CompletionRequest) -> String {
    request
        .messages
        .iter()
        .filter(|m| m.role != Role::System)
        .map(|m| match m.role {
            Role::Assistant => format!("Assistant: {}", m.content),
            _ => m.content.clone(),
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

#[async_trait]
impl<M> LlmProvider for RigAdapter<M>
where
    M: CompletionModel + 'static,
{
    fn model_name(&self) -> &str {
        &self.model_name
    }

    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError> {
        let mut builder = AgentBuilder::new(self.model.clone())
            .max_tokens(u64::from(request.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS)));
        if let Some(preamble) = request.system_prompt() {
            builder = builder.preamble(&preamble);
        }
        if let Some(temperature) = request.temperature {
            builder = builder.temperature(f64::from(temperature));
        }
        let agent = builder.build();

        let prompt = prompt_text(&request);
        debug!(model = %self.model_name, prompt_len = prompt.len(), "Sending completion");

        let content = agent
            .prompt(prompt)
            .await
            .map_err(|e| LlmError::RequestFailed {
                provider: self.model_name.clone(),
                reason: e.to_string(),
            })?;

        Ok(CompletionResponse {
            content,
            input_tokens: 0,
            output_tokens: 0,
            finish_reason: FinishReason::Stop,
        })
    }
}
