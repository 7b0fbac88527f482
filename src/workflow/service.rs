//! Analysis Service
//!
//! Request boundary: validates input, resolves the formatting directive and
//! the workflow, runs the executor, and turns every outcome into an
//! [`AnalysisResponse`]. Nothing past this point returns `Err` or panics.

use serde::{Deserialize, Serialize};
use tracing::{error, info};

use super::definition::Workflow;
use super::executor::{ExecutionInput, WorkflowExecutor, WorkflowRun};
use super::report::AnalysisReport;
use crate::agents::AdapterRegistry;
use crate::ai::provider::create_provider;
use crate::config::{Config, ExecutionConfig, Preferences};
use crate::registry::{SharedRegistry, formatting_template};
use crate::types::{LogsiftError, Result, ValidationError, ValidationErrorKind, non_blank};

/// One analysis request
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AnalysisRequest {
    pub logs: String,
    /// Free-form formatting directive; takes precedence over `template_id`
    pub template_prompt: Option<String>,
    /// Id of a built-in formatting template
    pub template_id: Option<String>,
    /// Explicit agent sequence; the active workflow template is used when absent
    pub workflow: Option<Workflow>,
    pub tech_stack: Option<String>,
    pub environment: Option<String>,
}

impl AnalysisRequest {
    pub fn new(logs: impl Into<String>) -> Self {
        Self {
            logs: logs.into(),
            ..Default::default()
        }
    }

    pub fn with_template_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.template_prompt = Some(prompt.into());
        self
    }

    pub fn with_template_id(mut self, id: impl Into<String>) -> Self {
        self.template_id = Some(id.into());
        self
    }

    pub fn with_workflow(mut self, workflow: Workflow) -> Self {
        self.workflow = Some(workflow);
        self
    }

    pub fn with_tech_stack(mut self, tech_stack: impl Into<String>) -> Self {
        self.tech_stack = Some(tech_stack.into());
        self
    }

    pub fn with_environment(mut self, environment: impl Into<String>) -> Self {
        self.environment = Some(environment.into());
        self
    }
}

/// Either a report or a user-facing error message, never both
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResponse {
    pub data: Option<AnalysisReport>,
    pub error: Option<String>,
}

impl AnalysisResponse {
    pub fn success(report: AnalysisReport) -> Self {
        Self {
            data: Some(report),
            error: None,
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            data: None,
            error: Some(message.into()),
        }
    }

    pub fn is_success(&self) -> bool {
        self.data.is_some()
    }
}

pub struct AnalysisService {
    registry: SharedRegistry,
    executor: WorkflowExecutor,
}

impl AnalysisService {
    pub fn new(registry: SharedRegistry, executor: WorkflowExecutor) -> Self {
        Self { registry, executor }
    }

    /// Service backed by the configured model provider and built-in adapters
    pub fn from_config(config: &Config, registry: SharedRegistry) -> Result<Self> {
        let provider = create_provider(&config.llm.to_provider_config())?;
        let executor = WorkflowExecutor::new(
            AdapterRegistry::builtin(provider),
            config.execution.clone(),
        );
        Ok(Self::new(registry, executor))
    }

    pub fn registry(&self) -> &SharedRegistry {
        &self.registry
    }

    fn config(&self) -> &ExecutionConfig {
        self.executor.config()
    }

    pub async fn analyze(&self, request: AnalysisRequest, preferences: &Preferences) -> AnalysisResponse {
        match self.run(request, preferences).await {
            Ok(run) => {
                info!(
                    "Analysis {} ready (confidence {:.2})",
                    run.report.id, run.report.confidence_score
                );
                AnalysisResponse::success(run.report)
            }
            Err(e) => {
                error!("Analysis failed: {}", e);
                AnalysisResponse::failure(e.to_string())
            }
        }
    }

    /// Full run with the executor summary, for callers that want skipped agents
    pub async fn run(&self, request: AnalysisRequest, preferences: &Preferences) -> Result<WorkflowRun> {
        self.check_logs(&request.logs)?;
        let directive = self.directive(&request)?;
        let workflow = self.workflow(request.workflow, preferences)?;

        let mut input = ExecutionInput::new(request.logs);
        input.directive = directive;
        input.tech_stack = request.tech_stack;
        input.environment = request.environment;

        self.executor.execute(&workflow, &input).await
    }

    fn check_logs(&self, logs: &str) -> Result<()> {
        let min = self.config().min_log_chars;
        let chars = logs.trim().chars().count();
        if chars < min {
            return Err(ValidationError::new(
                ValidationErrorKind::InputTooShort,
                format!("Logs must be at least {} characters long.", min),
            )
            .with_field("logs")
            .with_comparison(format!(">= {}", min), chars.to_string())
            .into());
        }
        Ok(())
    }

    fn directive(&self, request: &AnalysisRequest) -> Result<Option<String>> {
        if let Some(prompt) = request.template_prompt.as_deref().and_then(non_blank) {
            return Ok(Some(prompt.to_string()));
        }
        match request.template_id.as_deref().and_then(non_blank) {
            Some(id) => formatting_template(id)
                .map(|t| Some(t.prompt.to_string()))
                .ok_or_else(|| {
                    ValidationError::new(
                        ValidationErrorKind::General,
                        format!("Unknown formatting template '{}'", id),
                    )
                    .with_field("templateId")
                    .into()
                }),
            None => Ok(None),
        }
    }

    fn workflow(&self, submitted: Option<Workflow>, preferences: &Preferences) -> Result<Workflow> {
        match submitted {
            Some(workflow) if preferences.sync_enabled => Ok(self.registry.refresh(&workflow)),
            Some(workflow) => Ok(workflow),
            None => self
                .registry
                .resolve_template(&preferences.active_workflow)
                .map_err(|e| match e {
                    LogsiftError::TemplateNotFound(id) => ValidationError::new(
                        ValidationErrorKind::General,
                        format!("Unknown workflow template '{}'", id),
                    )
                    .with_field("activeWorkflow")
                    .into(),
                    other => other,
                }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agents::testing::{FailingAdapter, StubAdapter};
    use crate::agents::{AgentOutput, SolutionOutput, SummaryOutput, TracebackOutput};
    use crate::registry::{AgentDraft, AgentRegistry, AgentRole, QUICK_SUMMARY, builtin_agents};
    use crate::workflow::context::slot;
    use crate::workflow::fixtures::{CONFUSING_LOG, SIMPLE_PYTHON_LOG};
    use std::sync::Arc;

    struct Harness {
        service: AnalysisService,
        summarizer: Arc<StubAdapter>,
    }

    fn harness_with(traceback_fails: bool) -> Harness {
        let summarizer = StubAdapter::new(
            0.9,
            AgentOutput::Summary(SummaryOutput {
                summary: "Payment failed on a None user".to_string(),
                ..Default::default()
            }),
        );
        let mut adapters = AdapterRegistry::new();
        adapters.register_role(AgentRole::Summarizer, summarizer.clone());
        if traceback_fails {
            adapters.register_role(AgentRole::Traceback, Arc::new(FailingAdapter));
        } else {
            adapters.register_role(
                AgentRole::Traceback,
                StubAdapter::new(
                    0.8,
                    AgentOutput::Traceback(TracebackOutput {
                        exception_type: "AttributeError".to_string(),
                        ..Default::default()
                    }),
                ),
            );
        }
        adapters.register_role(
            AgentRole::Solution,
            StubAdapter::new(
                0.95,
                AgentOutput::Solution(SolutionOutput {
                    description: "Guard the None user".to_string(),
                    ..Default::default()
                }),
            ),
        );

        let executor = WorkflowExecutor::new(adapters, ExecutionConfig::default());
        Harness {
            service: AnalysisService::new(AgentRegistry::with_builtins().shared(), executor),
            summarizer,
        }
    }

    fn harness() -> Harness {
        harness_with(false)
    }

    #[tokio::test]
    async fn test_default_preferences_run_full_analysis() {
        let h = harness();
        let response = h
            .service
            .analyze(AnalysisRequest::new(SIMPLE_PYTHON_LOG), &Preferences::default())
            .await;

        assert!(response.is_success());
        assert!(response.error.is_none());
        let report = response.data.unwrap();
        assert!((report.confidence_score - 0.883_333).abs() < 1e-4);
        assert_eq!(report.traceback.unwrap().exception_type, "AttributeError");
    }

    #[tokio::test]
    async fn test_short_logs_rejected_without_running() {
        let h = harness();
        let response = h
            .service
            .analyze(AnalysisRequest::new("   too short   "), &Preferences::default())
            .await;

        assert!(response.data.is_none());
        assert!(response.error.unwrap().contains("at least 50 characters"));
        assert!(h.summarizer.seen().is_empty());
    }

    #[tokio::test]
    async fn test_short_logs_error_is_validation() {
        let h = harness();
        let err = h
            .service
            .run(AnalysisRequest::new("x".repeat(49)), &Preferences::default())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            LogsiftError::Validation(ref v) if v.kind == ValidationErrorKind::InputTooShort
        ));
    }

    #[tokio::test]
    async fn test_failing_agent_yields_error_response() {
        let h = harness_with(true);
        let response = h
            .service
            .analyze(AnalysisRequest::new(SIMPLE_PYTHON_LOG), &Preferences::default())
            .await;

        assert_eq!(response.data, None);
        let message = response.error.unwrap();
        assert!(message.contains("traceback"));
        assert!(message.contains("503"));
    }

    #[tokio::test]
    async fn test_empty_workflow_yields_error_response() {
        let h = harness();
        let request = AnalysisRequest::new(SIMPLE_PYTHON_LOG).with_workflow(Workflow::default());
        let response = h.service.analyze(request, &Preferences::default()).await;

        assert!(!response.is_success());
        assert!(response.error.is_some());
    }

    #[tokio::test]
    async fn test_template_prompt_beats_template_id() {
        let h = harness();
        let request = AnalysisRequest::new(CONFUSING_LOG)
            .with_template_id("executive-summary-brief")
            .with_template_prompt("Answer in one sentence.");
        h.service.analyze(request, &Preferences::default()).await;

        let logs = h.summarizer.seen()[0].get(slot::LOGS).unwrap().to_string();
        assert!(logs.starts_with("Answer in one sentence.\n\n"));
    }

    #[tokio::test]
    async fn test_template_id_resolves_directive() {
        let h = harness();
        let template = &crate::registry::formatting_templates()[0];
        let request = AnalysisRequest::new(CONFUSING_LOG).with_template_id(template.id);
        assert!(h.service.analyze(request, &Preferences::default()).await.is_success());

        let logs = h.summarizer.seen()[0].get(slot::LOGS).unwrap().to_string();
        assert!(logs.starts_with(template.prompt));
    }

    #[tokio::test]
    async fn test_unknown_template_id_is_error() {
        let h = harness();
        let request = AnalysisRequest::new(CONFUSING_LOG).with_template_id("limerick");
        let response = h.service.analyze(request, &Preferences::default()).await;
        assert!(response.error.unwrap().contains("limerick"));
    }

    #[tokio::test]
    async fn test_active_workflow_preference() {
        let h = harness();
        let prefs = Preferences {
            active_workflow: QUICK_SUMMARY.to_string(),
            sync_enabled: true,
        };
        let run = h
            .service
            .run(AnalysisRequest::new(SIMPLE_PYTHON_LOG), &prefs)
            .await
            .unwrap();
        assert_eq!(run.invoked_agents, vec!["summarizer", "solution"]);
        assert!(run.report.traceback.is_none());

        let missing = Preferences {
            active_workflow: "nightly".to_string(),
            sync_enabled: true,
        };
        let err = h
            .service
            .run(AnalysisRequest::new(SIMPLE_PYTHON_LOG), &missing)
            .await
            .unwrap_err();
        assert!(err.is_validation());
    }

    #[tokio::test]
    async fn test_sync_refreshes_submitted_agents() {
        let h = harness();
        let registry = h.service.registry().clone();
        let custom = registry
            .create(
                AgentDraft::new("Billing Impact")
                    .with_role(AgentRole::Summarizer)
                    .with_instructions("Focus on revenue."),
            )
            .unwrap();

        // stale copy submitted by a client
        let mut stale = custom.clone();
        stale.role = AgentRole::Custom("billing".into());
        let mut agents = builtin_agents();
        agents.push(stale);
        let request = AnalysisRequest::new(SIMPLE_PYTHON_LOG).with_workflow(Workflow::new(agents));

        let synced = h
            .service
            .run(request.clone(), &Preferences::default())
            .await
            .unwrap();
        assert!(synced.skipped_agents.is_empty());
        assert_eq!(synced.invoked_agents.len(), 4);

        let unsynced_prefs = Preferences {
            sync_enabled: false,
            ..Default::default()
        };
        let unsynced = h.service.run(request, &unsynced_prefs).await.unwrap();
        assert_eq!(unsynced.skipped_agents, vec![custom.id]);
    }

    #[test]
    fn test_request_deserializes_camel_case() {
        let request: AnalysisRequest = serde_json::from_str(
            r#"{"logs": "boom", "templateId": "sre-ticket", "techStack": "Go"}"#,
        )
        .unwrap();
        assert_eq!(request.template_id.as_deref(), Some("sre-ticket"));
        assert_eq!(request.tech_stack.as_deref(), Some("Go"));
        assert!(request.workflow.is_none());
    }
}
