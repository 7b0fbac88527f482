//! Traceback Adapter
//!
//! Parses the stack trace for the exception type and the frames that matter.
//! When the model lists no frames, frames are lifted from the raw trace.

use regex::Regex;
use serde_json::json;
use std::sync::LazyLock;

use super::helpers::CONFIDENCE_FIELD;
use super::{
    AgentAdapter, AgentOutput, AgentResult, ModelAgentConfig, TracebackOutput, run_model_agent,
};
use crate::ai::provider::SharedProvider;
use crate::ai::validation::OutputReader;
use crate::constants::execution::{DEFAULT_ENVIRONMENT, DEFAULT_TECH_STACK};
use crate::registry::Agent;
use crate::types::Result;
use crate::workflow::{ContextSnapshot, slot};

/// Python `File "x.py", line N, in f` and JVM `at pkg.Class.method(File.java:N)` frames
static FRAME_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^\s*(File "[^"]+", line \d+(?:, in \S+)?|at [\w$.<>]+\([^)]*\))"#)
        .expect("frame pattern is valid")
});

const MAX_FALLBACK_FRAMES: usize = 10;

pub struct TracebackAdapter {
    provider: SharedProvider,
}

impl TracebackAdapter {
    pub fn new(provider: SharedProvider) -> Self {
        Self { provider }
    }

    fn build_prompt(ctx: &ContextSnapshot) -> String {
        format!(
            r#"<ROLE>
You are a debugging specialist reading a stack trace.
</ROLE>

<OBJECTIVES>
1. Name the primary exception type exactly as it appears
2. List the frames most relevant to the failure, innermost application frame first
3. Explain the execution flow that led to the error
</OBJECTIVES>

## Context
Tech stack: {}
Environment: {}

## Traceback
{}

<FOCUS>
Prefer application frames over framework and library frames.
Copy frames verbatim from the trace.
</FOCUS>
"#,
            ctx.get_or(slot::TECH_STACK, DEFAULT_TECH_STACK),
            ctx.get_or(slot::ENVIRONMENT, DEFAULT_ENVIRONMENT),
            ctx.get_or(slot::TRACEBACK, ""),
        )
    }

    fn schema() -> serde_json::Value {
        json!({
            "type": "object",
            "description": "Stack trace analysis",
            "required": ["analysis", "exceptionType", "relevantFrames", CONFIDENCE_FIELD, "isIntermittent", "needsFix"],
            "additionalProperties": false,
            "properties": {
                "analysis": {"type": "string", "description": "Execution flow that led to the error"},
                "exceptionType": {"type": "string", "description": "Primary exception type"},
                "relevantFrames": {"type": "array", "items": {"type": "string"}, "maxItems": 20},
                CONFIDENCE_FIELD: {"type": "number", "minimum": 0, "maximum": 1},
                "isIntermittent": {"type": "boolean"},
                "needsFix": {"type": "boolean"}
            }
        })
    }

    fn parse_result(reader: &mut OutputReader<'_>) -> AgentOutput {
        AgentOutput::Traceback(TracebackOutput {
            analysis: reader.require_str("analysis"),
            exception_type: reader.require_str("exceptionType"),
            relevant_frames: reader.str_array("relevantFrames"),
            is_intermittent: reader.flag("isIntermittent"),
            needs_fix: reader.flag("needsFix"),
        })
    }
}

/// Frame lines found in a raw trace, in order of appearance
pub fn extract_frames(trace: &str) -> Vec<String> {
    trace
        .lines()
        .filter_map(|line| FRAME_LINE.captures(line))
        .filter_map(|caps| caps.get(1).map(|m| m.as_str().to_string()))
        .take(MAX_FALLBACK_FRAMES)
        .collect()
}

#[async_trait::async_trait]
impl AgentAdapter for TracebackAdapter {
    fn name(&self) -> &str {
        "traceback"
    }

    fn reads(&self) -> &'static [&'static str] {
        &[slot::TRACEBACK, slot::TECH_STACK, slot::ENVIRONMENT]
    }

    async fn invoke(&self, agent: &Agent, context: &ContextSnapshot) -> Result<AgentResult> {
        let mut result = run_model_agent(
            self.provider.as_ref(),
            agent,
            context,
            ModelAgentConfig {
                kind: "traceback",
                build_prompt: Box::new(Self::build_prompt),
                schema: Self::schema(),
                parse_result: Box::new(Self::parse_result),
                debug_result: Box::new(|output| match output {
                    AgentOutput::Traceback(t) => format!(
                        "{} with {} frames",
                        t.exception_type,
                        t.relevant_frames.len()
                    ),
                    other => other.kind().to_string(),
                }),
            },
        )
        .await?;

        if let AgentOutput::Traceback(output) = &mut result.output
            && output.relevant_frames.is_empty()
        {
            output.relevant_frames = extract_frames(context.get_or(slot::TRACEBACK, ""));
            tracing::debug!(
                "TracebackAdapter: model listed no frames, lifted {} from the trace",
                output.relevant_frames.len()
            );
        }

        Ok(result)
    }
}
