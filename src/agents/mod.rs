//! Agent Invocation Adapters
//!
//! An adapter turns one [`Agent`] plus a [`ContextSnapshot`] into a normalized
//! [`AgentResult`]. Built-in adapters call the model service; anything
//! implementing [`AgentAdapter`] can be plugged in per agent id or per role.

pub mod generic;
pub mod helpers;
pub mod solution;
pub mod summarizer;
pub mod traceback;

pub use generic::GenericAdapter;
pub use helpers::{ModelAgentConfig, run_model_agent};
pub use solution::SolutionAdapter;
pub use summarizer::SummarizerAdapter;
pub use traceback::TracebackAdapter;

use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::Arc;

use crate::ai::provider::SharedProvider;
use crate::registry::{Agent, AgentRole};
use crate::types::Result;
use crate::workflow::ContextSnapshot;

/// Normalized output of one agent invocation
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentResult {
    pub agent_id: String,
    pub role: AgentRole,
    /// Always within [0, 1]
    pub confidence_score: f64,
    pub output: AgentOutput,
}

impl AgentResult {
    pub fn new(agent: &Agent, confidence_score: f64, output: AgentOutput) -> Self {
        Self {
            agent_id: agent.id.clone(),
            role: agent.role.clone(),
            confidence_score: confidence_score.clamp(0.0, 1.0),
            output,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum AgentOutput {
    Summary(SummaryOutput),
    Traceback(TracebackOutput),
    Solution(SolutionOutput),
    Generic(GenericOutput),
}

impl AgentOutput {
    /// Main prose of the output, whatever its kind
    pub fn analysis_text(&self) -> Option<&str> {
        match self {
            Self::Summary(s) => Some(&s.summary),
            Self::Traceback(t) => Some(&t.analysis),
            Self::Solution(s) => Some(&s.description),
            Self::Generic(g) => g.analysis.as_deref(),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Summary(_) => "summary",
            Self::Traceback(_) => "traceback",
            Self::Solution(_) => "solution",
            Self::Generic(_) => "generic",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryOutput {
    pub summary: String,
    pub root_cause: String,
    pub impact: String,
    pub is_intermittent: bool,
    pub needs_fix: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TracebackOutput {
    pub analysis: String,
    pub exception_type: String,
    pub relevant_frames: Vec<String>,
    pub is_intermittent: bool,
    pub needs_fix: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SolutionOutput {
    pub description: String,
    pub code: String,
    pub verification_steps: String,
    pub prevention: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenericOutput {
    pub analysis: Option<String>,
    /// Remaining response fields, kept verbatim
    pub fields: Map<String, Value>,
}

/// Pluggable invocation strategy for one kind of agent
#[async_trait::async_trait]
pub trait AgentAdapter: Send + Sync {
    /// Adapter name for logging
    fn name(&self) -> &str;

    /// Context slots this adapter reads
    fn reads(&self) -> &'static [&'static str];

    /// Run `agent` against the context.
    ///
    /// Fails with `ModelInvocation` when the model errors or its output breaks
    /// the adapter's contract.
    async fn invoke(&self, agent: &Agent, context: &ContextSnapshot) -> Result<AgentResult>;
}

pub type SharedAdapter = Arc<dyn AgentAdapter>;

/// Adapter lookup: explicit agent id first, then role
#[derive(Default, Clone)]
pub struct AdapterRegistry {
    by_agent: HashMap<String, SharedAdapter>,
    by_role: HashMap<AgentRole, SharedAdapter>,
}

impl AdapterRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Model-backed adapters for the built-in roles and `Generic`.
    ///
    /// `Custom` roles have no adapter until one is registered.
    pub fn builtin(provider: SharedProvider) -> Self {
        let mut registry = Self::new();
        registry.register_role(
            AgentRole::Summarizer,
            Arc::new(SummarizerAdapter::new(Arc::clone(&provider))),
        );
        registry.register_role(
            AgentRole::Traceback,
            Arc::new(TracebackAdapter::new(Arc::clone(&provider))),
        );
        registry.register_role(
            AgentRole::Solution,
            Arc::new(SolutionAdapter::new(Arc::clone(&provider))),
        );
        registry.register_role(AgentRole::Generic, Arc::new(GenericAdapter::new(provider)));
        registry
    }

    /// Bind an adapter to one agent id; wins over any role binding
    pub fn register_agent(
        &mut self,
        agent_id: impl Into<String>,
        adapter: SharedAdapter,
    ) -> Option<SharedAdapter> {
        self.by_agent.insert(agent_id.into(), adapter)
    }

    pub fn register_role(&mut self, role: AgentRole, adapter: SharedAdapter) -> Option<SharedAdapter> {
        self.by_role.insert(role, adapter)
    }

    pub fn resolve(&self, agent: &Agent) -> Option<SharedAdapter> {
        self.by_agent
            .get(&agent.id)
            .or_else(|| self.by_role.get(&agent.role))
            .cloned()
    }
}

impl std::fmt::Debug for AdapterRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut agents: Vec<&String> = self.by_agent.keys().collect();
        agents.sort();
        let mut roles: Vec<String> = self.by_role.keys().map(|r| r.to_string()).collect();
        roles.sort();
        f.debug_struct("AdapterRegistry")
            .field("agents", &agents)
            .field("roles", &roles)
            .finish()
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! Stub adapters and a scripted provider shared by the crate's tests.

    use super::*;
    use crate::ai::provider::{GenerationRequest, LlmProvider, LlmResponse};
    use crate::types::LogsiftError;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Returns a fixed result and records the snapshots it received
    pub struct StubAdapter {
        pub confidence: f64,
        pub output: AgentOutput,
        pub delay: Option<std::time::Duration>,
        pub seen: Mutex<Vec<ContextSnapshot>>,
    }

    impl StubAdapter {
        pub fn new(confidence: f64, output: AgentOutput) -> Arc<Self> {
            Arc::new(Self {
                confidence,
                output,
                delay: None,
                seen: Mutex::new(Vec::new()),
            })
        }

        /// Like [`StubAdapter::new`], but sleeps on the tokio clock before answering
        pub fn delayed(confidence: f64, output: AgentOutput, delay: std::time::Duration) -> Arc<Self> {
            Arc::new(Self {
                confidence,
                output,
                delay: Some(delay),
                seen: Mutex::new(Vec::new()),
            })
        }

        pub fn seen(&self) -> Vec<ContextSnapshot> {
            self.seen.lock().unwrap().clone()
        }
    }

    #[async_trait::async_trait]
    impl AgentAdapter for StubAdapter {
        fn name(&self) -> &str {
            "stub"
        }

        fn reads(&self) -> &'static [&'static str] {
            &[]
        }

        async fn invoke(&self, agent: &Agent, context: &ContextSnapshot) -> Result<AgentResult> {
            self.seen.lock().unwrap().push(context.clone());
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            Ok(AgentResult::new(agent, self.confidence, self.output.clone()))
        }
    }

    /// Always fails with a model error
    pub struct FailingAdapter;

    #[async_trait::async_trait]
    impl AgentAdapter for FailingAdapter {
        fn name(&self) -> &str {
            "failing"
        }

        fn reads(&self) -> &'static [&'static str] {
            &[]
        }

        async fn invoke(&self, agent: &Agent, _context: &ContextSnapshot) -> Result<AgentResult> {
            Err(LogsiftError::model_invocation(&agent.id, "model service returned 503"))
        }
    }

    /// Never completes within any reasonable timeout
    pub struct HangingAdapter;

    #[async_trait::async_trait]
    impl AgentAdapter for HangingAdapter {
        fn name(&self) -> &str {
            "hanging"
        }

        fn reads(&self) -> &'static [&'static str] {
            &[]
        }

        async fn invoke(&self, _agent: &Agent, _context: &ContextSnapshot) -> Result<AgentResult> {
            tokio::time::sleep(std::time::Duration::from_secs(3600)).await;
            unreachable!("hanging adapter completed")
        }
    }

    /// Replays queued responses and records every request
    #[derive(Default)]
    pub struct ScriptedProvider {
        responses: Mutex<VecDeque<Result<Value>>>,
        requests: Mutex<Vec<GenerationRequest>>,
    }

    impl ScriptedProvider {
        pub fn new(responses: Vec<Value>) -> Arc<Self> {
            Arc::new(Self {
                responses: Mutex::new(responses.into_iter().map(Ok).collect()),
                requests: Mutex::new(Vec::new()),
            })
        }

        pub fn failing(error: LogsiftError) -> Arc<Self> {
            Arc::new(Self {
                responses: Mutex::new(VecDeque::from([Err(error)])),
                requests: Mutex::new(Vec::new()),
            })
        }

        pub fn requests(&self) -> Vec<GenerationRequest> {
            self.requests.lock().unwrap().clone()
        }
    }

    #[async_trait::async_trait]
    impl LlmProvider for ScriptedProvider {
        async fn generate(&self, request: &GenerationRequest) -> Result<LlmResponse> {
            self.requests.lock().unwrap().push(request.clone());
            let next = self
                .responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(LogsiftError::llm("script exhausted")));
            next.map(LlmResponse::content_only)
        }

        fn name(&self) -> &str {
            "scripted"
        }

        fn model(&self) -> &str {
            "scripted-model"
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::*;
    use super::*;

    fn generic_output() -> AgentOutput {
        AgentOutput::Generic(GenericOutput::default())
    }

    #[test]
    fn test_resolve_prefers_agent_binding() {
        let by_role: SharedAdapter = StubAdapter::new(0.1, generic_output());
        let by_agent: SharedAdapter = StubAdapter::new(0.9, generic_output());

        let mut registry = AdapterRegistry::new();
        registry.register_role(AgentRole::Summarizer, Arc::clone(&by_role));
        registry.register_agent("summarizer", Arc::clone(&by_agent));

        let builtin = Agent::new("summarizer", "S", "m", AgentRole::Summarizer);
        let clone = Agent::new("agent_1", "S (Clone)", "m", AgentRole::Summarizer);

        assert!(Arc::ptr_eq(&registry.resolve(&builtin).unwrap(), &by_agent));
        assert!(Arc::ptr_eq(&registry.resolve(&clone).unwrap(), &by_role));
    }

    #[test]
    fn test_custom_role_unresolved_by_default() {
        let registry = AdapterRegistry::builtin(ScriptedProvider::new(vec![]));
        let custom = Agent::new("agent_x", "X", "m", AgentRole::Custom("billing".into()));
        let generic = Agent::new("agent_y", "Y", "m", AgentRole::Generic);

        assert!(registry.resolve(&custom).is_none());
        assert!(registry.resolve(&generic).is_some());
        assert_eq!(
            registry
                .resolve(&Agent::new("traceback", "T", "m", AgentRole::Traceback))
                .unwrap()
                .name(),
            "traceback"
        );
    }

    #[test]
    fn test_agent_result_clamps_confidence() {
        let agent = Agent::new("a", "A", "m", AgentRole::Generic);
        assert_eq!(AgentResult::new(&agent, 1.7, generic_output()).confidence_score, 1.0);
    }

    #[test]
    fn test_analysis_text() {
        let output = AgentOutput::Traceback(TracebackOutput {
            analysis: "call chain".into(),
            ..Default::default()
        });
        assert_eq!(output.analysis_text(), Some("call chain"));
        assert_eq!(output.kind(), "traceback");
        assert_eq!(generic_output().analysis_text(), None);
    }
}
