//! Solution Adapter
//!
//! Proposes a fix from the accumulated analysis. Also accepts the older
//! single-field `solution` response and lifts fenced code out of the
//! description when no separate code is returned.

use serde_json::json;

use super::helpers::CONFIDENCE_FIELD;
use super::{
    AgentAdapter, AgentOutput, AgentResult, ModelAgentConfig, SolutionOutput, run_model_agent,
};
use crate::ai::provider::SharedProvider;
use crate::ai::validation::OutputReader;
use crate::constants::execution::{DEFAULT_ENVIRONMENT, DEFAULT_TECH_STACK};
use crate::registry::Agent;
use crate::types::{Result, non_blank};
use crate::workflow::{ContextSnapshot, slot};

const FENCE: &str = "```";
const LEGACY_SOLUTION_FIELD: &str = "solution";

pub struct SolutionAdapter {
    provider: SharedProvider,
}

impl SolutionAdapter {
    pub fn new(provider: SharedProvider) -> Self {
        Self { provider }
    }

    fn build_prompt(ctx: &ContextSnapshot) -> String {
        // Without an upstream analysis the solution works from the logs
        let analysis = ctx
            .get(slot::ANALYSIS)
            .and_then(non_blank)
            .unwrap_or_else(|| ctx.get_or(slot::LOGS, ""));

        let traceback = match ctx.get(slot::TRACEBACK).and_then(non_blank) {
            Some(trace) => format!("\n## Traceback\n{}\n", trace),
            None => String::new(),
        };

        format!(
            r#"<ROLE>
You are a senior software architect proposing a fix for a production error.
</ROLE>

<OBJECTIVES>
1. Explain the change that resolves the root cause
2. Provide a code snippet demonstrating the fix in a fenced code block
3. List concrete steps to verify the fix
4. Recommend how to prevent this class of failure
</OBJECTIVES>

## Context
Tech stack: {}
Environment: {}

## Analysis
{}
{}
<ANTI-PATTERNS>
WRONG: "Add error handling."
CORRECT: "Guard the None user returned by get_user before calling get_subscription, and return a 404 to the caller."
</ANTI-PATTERNS>
"#,
            ctx.get_or(slot::TECH_STACK, DEFAULT_TECH_STACK),
            ctx.get_or(slot::ENVIRONMENT, DEFAULT_ENVIRONMENT),
            analysis,
            traceback,
        )
    }

    fn schema() -> serde_json::Value {
        json!({
            "type": "object",
            "description": "Proposed fix for the analyzed error",
            "required": ["solutionDescription", "solutionCode", "verificationSteps", "prevention", CONFIDENCE_FIELD],
            "additionalProperties": false,
            "properties": {
                "solutionDescription": {"type": "string", "description": "Explanation of the change"},
                "solutionCode": {"type": "string", "description": "Code snippet in a fenced block"},
                "verificationSteps": {"type": "string", "description": "How to confirm the fix works"},
                "prevention": {"type": "string", "description": "How to avoid recurrence"},
                CONFIDENCE_FIELD: {"type": "number", "minimum": 0, "maximum": 1}
            }
        })
    }

    fn parse_result(reader: &mut OutputReader<'_>) -> AgentOutput {
        let description =
            if !reader.has("solutionDescription") && reader.has(LEGACY_SOLUTION_FIELD) {
                reader.require_str(LEGACY_SOLUTION_FIELD)
            } else {
                reader.require_str("solutionDescription")
            };

        let code = reader
            .optional_str("solutionCode")
            .filter(|c| !c.trim().is_empty())
            .unwrap_or_else(|| extract_code_block(&description).to_string());

        AgentOutput::Solution(SolutionOutput {
            description,
            code,
            verification_steps: reader.optional_str("verificationSteps").unwrap_or_default(),
            prevention: reader.optional_str("prevention").unwrap_or_default(),
        })
    }
}

/// Text from the first code fence through the last one.
///
/// Returns an empty string unless at least two fences are present.
pub fn extract_code_block(text: &str) -> &str {
    match (text.find(FENCE), text.rfind(FENCE)) {
        (Some(start), Some(end)) if end > start => &text[start..end + FENCE.len()],
        _ => "",
    }
}

#[async_trait::async_trait]
impl AgentAdapter for SolutionAdapter {
    fn name(&self) -> &str {
        "solution"
    }

    fn reads(&self) -> &'static [&'static str] {
        &[slot::ANALYSIS, slot::TECH_STACK, slot::ENVIRONMENT, slot::TRACEBACK]
    }

    async fn invoke(&self, agent: &Agent, context: &ContextSnapshot) -> Result<AgentResult> {
        run_model_agent(
            self.provider.as_ref(),
            agent,
            context,
            ModelAgentConfig {
                kind: "solution",
                build_prompt: Box::new(Self::build_prompt),
                schema: Self::schema(),
                parse_result: Box::new(Self::parse_result),
                debug_result: Box::new(|output| match output {
                    AgentOutput::Solution(s) => format!(
                        "{} chars of description, {} chars of code",
                        s.description.len(),
                        s.code.len()
                    ),
                    other => other.kind().to_string(),
                }),
            },
        )
        .await
    }
}
