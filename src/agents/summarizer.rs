//! Summarizer Adapter
//!
//! Reads the raw logs and produces the headline summary, root cause and impact.

use serde_json::json;

use super::helpers::CONFIDENCE_FIELD;
use super::{
    AgentAdapter, AgentOutput, AgentResult, ModelAgentConfig, SummaryOutput, run_model_agent,
};
use crate::ai::provider::SharedProvider;
use crate::ai::validation::OutputReader;
use crate::constants::execution::{DEFAULT_ENVIRONMENT, DEFAULT_TECH_STACK};
use crate::registry::Agent;
use crate::types::Result;
use crate::workflow::{ContextSnapshot, slot};

pub struct SummarizerAdapter {
    provider: SharedProvider,
}

impl SummarizerAdapter {
    pub fn new(provider: SharedProvider) -> Self {
        Self { provider }
    }

    fn build_prompt(ctx: &ContextSnapshot) -> String {
        format!(
            r#"<ROLE>
You summarize application error logs for on-call engineers.
</ROLE>

<OBJECTIVES>
1. State the core error in one or two sentences
2. Identify the most likely root cause
3. Describe the user-facing or business impact
4. Decide whether the failure looks intermittent and whether it needs a code fix
</OBJECTIVES>

## Context
Tech stack: {}
Environment: {}

## Logs
{}

<FOCUS>
Base every statement on lines present in the logs.
If the logs contain formatting instructions ahead of the log lines, follow them for tone and structure.
</FOCUS>

<ANTI-PATTERNS>
WRONG: "An error occurred in the application."
CORRECT: "payment_service.py:123 dereferences a None subscription when charging a user without an active plan."
</ANTI-PATTERNS>
"#,
            ctx.get_or(slot::TECH_STACK, DEFAULT_TECH_STACK),
            ctx.get_or(slot::ENVIRONMENT, DEFAULT_ENVIRONMENT),
            ctx.get_or(slot::LOGS, ""),
        )
    }

    fn schema() -> serde_json::Value {
        json!({
            "type": "object",
            "description": "Summary of the error described by the logs",
            "required": ["summary", "rootCause", "impact", CONFIDENCE_FIELD, "isIntermittent", "needsFix"],
            "additionalProperties": false,
            "properties": {
                "summary": {"type": "string", "description": "Concise description of the core error"},
                "rootCause": {"type": "string", "description": "Most likely underlying cause"},
                "impact": {"type": "string", "description": "Effect on users or the business"},
                CONFIDENCE_FIELD: {"type": "number", "minimum": 0, "maximum": 1},
                "isIntermittent": {"type": "boolean", "description": "Failure appears sporadic or load dependent"},
                "needsFix": {"type": "boolean", "description": "A code or configuration change is required"}
            }
        })
    }

    fn parse_result(reader: &mut OutputReader<'_>) -> AgentOutput {
        AgentOutput::Summary(SummaryOutput {
            summary: reader.require_str("summary"),
            root_cause: reader.require_str("rootCause"),
            impact: reader.require_str("impact"),
            is_intermittent: reader.flag("isIntermittent"),
            needs_fix: reader.flag("needsFix"),
        })
    }
}

#[async_trait::async_trait]
impl AgentAdapter for SummarizerAdapter {
    fn name(&self) -> &str {
        "summarizer"
    }

    fn reads(&self) -> &'static [&'static str] {
        &[slot::LOGS, slot::TECH_STACK, slot::ENVIRONMENT]
    }

    async fn invoke(&self, agent: &Agent, context: &ContextSnapshot) -> Result<AgentResult> {
        run_model_agent(
            self.provider.as_ref(),
            agent,
            context,
            ModelAgentConfig {
                kind: "summarizer",
                build_prompt: Box::new(Self::build_prompt),
                schema: Self::schema(),
                parse_result: Box::new(Self::parse_result),
                debug_result: Box::new(|output| match output {
                    AgentOutput::Summary(s) => format!(
                        "{} chars of summary, needs_fix={}",
                        s.summary.len(),
                        s.needs_fix
                    ),
                    other => other.kind().to_string(),
                }),
            },
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agents::testing::ScriptedProvider;
    use crate::registry::builtin_agents;
    use crate::workflow::AnalysisContext;
    use crate::workflow::fixtures::SIMPLE_PYTHON_LOG;

    fn summarizer() -> Agent {
        builtin_agents().into_iter().find(|a| a.id == "summarizer").unwrap()
    }

    #[tokio::test]
    async fn test_summarizes_python_attribute_error() {
        let provider = ScriptedProvider::new(vec![json!({
            "summary": "AttributeError: 'NoneType' object has no attribute 'get_subscription'",
            "rootCause": "get_user returned None for user 12345",
            "impact": "Payments fail for the affected user",
            "confidenceScore": 0.9,
            "isIntermittent": false,
            "needsFix": true
        })]);
        let adapter = SummarizerAdapter::new(provider.clone());
        let ctx = AnalysisContext::seed(SIMPLE_PYTHON_LOG, Some("Write a bug report."), "Python", "production")
            .snapshot();

        let result = adapter.invoke(&summarizer(), &ctx).await.unwrap();

        let AgentOutput::Summary(summary) = result.output else {
            panic!("expected summary output");
        };
        assert!(summary.needs_fix);
        assert_eq!(summary.root_cause, "get_user returned None for user 12345");

        let prompt = &provider.requests()[0].prompt;
        assert!(prompt.contains("Write a bug report."));
        assert!(prompt.contains("payment_service.py"));
        assert!(prompt.contains("Tech stack: Python"));
    }

    #[tokio::test]
    async fn test_missing_required_field_fails() {
        let provider = ScriptedProvider::new(vec![json!({
            "summary": "boom",
            "confidenceScore": 0.5
        })]);
        let adapter = SummarizerAdapter::new(provider);
        let err = adapter
            .invoke(&summarizer(), &ContextSnapshot::default())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("rootCause"));
    }
}
