//! Generic Adapter
//!
//! Runs user-defined agents. The agent's instructions carry the task; the
//! whole context is offered as input and any response fields are kept.

use serde_json::{Value, json};

use super::helpers::CONFIDENCE_FIELD;
use super::{
    AgentAdapter, AgentOutput, AgentResult, GenericOutput, ModelAgentConfig, run_model_agent,
};
use crate::ai::provider::SharedProvider;
use crate::ai::validation::OutputReader;
use crate::registry::Agent;
use crate::types::Result;
use crate::workflow::{ContextSnapshot, slot};

const ANALYSIS_FIELD: &str = "analysis";

pub struct GenericAdapter {
    provider: SharedProvider,
}

impl GenericAdapter {
    pub fn new(provider: SharedProvider) -> Self {
        Self { provider }
    }

    fn build_prompt(ctx: &ContextSnapshot) -> String {
        let mut prompt = String::from(
            "Carry out your instructions on the error context below. \
             Put your findings in `analysis` and rate your confidence.\n",
        );
        for (name, value) in ctx.iter() {
            if value.trim().is_empty() {
                continue;
            }
            prompt.push_str(&format!("\n## {}\n{}\n", name, value));
        }
        prompt
    }

    fn schema() -> Value {
        json!({
            "type": "object",
            "description": "Findings of a user-defined agent",
            "required": [ANALYSIS_FIELD, CONFIDENCE_FIELD],
            "properties": {
                ANALYSIS_FIELD: {"type": "string"},
                CONFIDENCE_FIELD: {"type": "number", "minimum": 0, "maximum": 1}
            }
        })
    }

    fn parse_result(reader: &mut OutputReader<'_>) -> AgentOutput {
        let analysis = reader.optional_str(ANALYSIS_FIELD);
        let fields = reader
            .object()
            .map(|map| {
                map.iter()
                    .filter(|(k, _)| k.as_str() != ANALYSIS_FIELD && k.as_str() != CONFIDENCE_FIELD)
                    .map(|(k, v)| (k.clone(), v.clone()))
                    .collect()
            })
            .unwrap_or_default();

        AgentOutput::Generic(GenericOutput { analysis, fields })
    }
}

#[async_trait::async_trait]
impl AgentAdapter for GenericAdapter {
    fn name(&self) -> &str {
        "generic"
    }

    fn reads(&self) -> &'static [&'static str] {
        &[
            slot::LOGS,
            slot::ANALYSIS,
            slot::TECH_STACK,
            slot::ENVIRONMENT,
        ]
    }

    async fn invoke(&self, agent: &Agent, context: &ContextSnapshot) -> Result<AgentResult> {
        run_model_agent(
            self.provider.as_ref(),
            agent,
            context,
            ModelAgentConfig {
                kind: "generic",
                build_prompt: Box::new(Self::build_prompt),
                schema: Self::schema(),
                parse_result: Box::new(Self::parse_result),
                debug_result: Box::new(|output| match output {
                    AgentOutput::Generic(g) => format!("{} extra fields", g.fields.len()),
                    other => other.kind().to_string(),
                }),
            },
        )
        .await
    }
}
