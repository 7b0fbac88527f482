//! Model Agent Runner
//!
//! Shared execution pattern for model-backed adapters:
//! 1. Log entry -> 2. Build prompt -> 3. Call model -> 4. Read output under the
//! contract -> 5. Log result

use serde_json::Value;

use super::{AgentOutput, AgentResult};
use crate::ai::provider::{GenerationRequest, LlmProvider};
use crate::ai::validation::OutputReader;
use crate::registry::Agent;
use crate::types::{LogsiftError, Result, capitalize_first, non_blank};
use crate::workflow::ContextSnapshot;

/// Field every contract carries
pub const CONFIDENCE_FIELD: &str = "confidenceScore";

/// Adapter-specific behaviour for [`run_model_agent`]
#[allow(clippy::type_complexity)]
pub struct ModelAgentConfig<'a> {
    /// Adapter kind (e.g., "summarizer", "traceback")
    pub kind: &'a str,
    /// Prompt builder over the context snapshot
    pub build_prompt: Box<dyn Fn(&ContextSnapshot) -> String + Send + Sync + 'a>,
    /// JSON Schema sent with the request
    pub schema: Value,
    /// Reads the typed output; violations are recorded on the reader
    pub parse_result: Box<dyn Fn(&mut OutputReader<'_>) -> AgentOutput + Send + Sync + 'a>,
    /// Debug message formatter for logging
    pub debug_result: Box<dyn Fn(&AgentOutput) -> String + Send + Sync + 'a>,
}

/// Run one model-backed agent invocation.
///
/// Model errors and contract violations both surface as `ModelInvocation`
/// naming the agent. The agent's instructions become the system prompt and
/// its model overrides the provider default.
pub async fn run_model_agent(
    provider: &dyn LlmProvider,
    agent: &Agent,
    context: &ContextSnapshot,
    config: ModelAgentConfig<'_>,
) -> Result<AgentResult> {
    tracing::debug!(
        "{}Adapter: invoking '{}' on {}",
        capitalize_first(config.kind),
        agent.id,
        non_blank(&agent.model).unwrap_or(provider.model())
    );

    let prompt = (config.build_prompt)(context);

    let mut request = GenerationRequest::new(prompt, config.schema);
    if let Some(instructions) = non_blank(&agent.instructions) {
        request = request.with_system(instructions);
    }
    if let Some(model) = non_blank(&agent.model) {
        request = request.with_model(model);
    }

    let response = provider.generate(&request).await.map_err(|e| {
        LogsiftError::model_invocation(&agent.id, format!("model call failed: {}", e))
    })?;

    let mut reader = OutputReader::new(&response.content);
    let output = (config.parse_result)(&mut reader);
    let confidence = reader.confidence(CONFIDENCE_FIELD);

    for warning in reader.warnings() {
        tracing::warn!("{} output from '{}': {}", config.kind, agent.id, warning);
    }
    reader.finish().map_err(|e| {
        LogsiftError::model_invocation(&agent.id, format!("output failed validation: {}", e))
    })?;

    tracing::debug!(
        "{}Adapter: {} (confidence {:.2}, {} tokens)",
        capitalize_first(config.kind),
        (config.debug_result)(&output),
        confidence,
        response.usage.total()
    );

    Ok(AgentResult::new(agent, confidence, output))
}
