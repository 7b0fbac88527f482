//! Workflow Executor
//!
//! Runs a workflow's agents one after another, threading the analysis
//! context, merging each result into the partial report and averaging the
//! confidence of every merged result.
//!
//! ## Failure model
//!
//! - Agent without an adapter: skipped with a warning, listed in
//!   [`WorkflowRun::skipped_agents`]
//! - Adapter error or timeout: the run aborts with `ModelInvocation`; no
//!   partial report is returned

use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info, instrument, warn};

use super::confidence::ConfidenceAccumulator;
use super::context::AnalysisContext;
use super::definition::Workflow;
use super::merge::MergeRules;
use super::report::{AnalysisReport, PartialReport};
use crate::agents::{AdapterRegistry, AgentAdapter, AgentResult};
use crate::ai::timeout::{Deadline, with_timeout};
use crate::config::ExecutionConfig;
use crate::constants::execution::{DEFAULT_ENVIRONMENT, DEFAULT_TECH_STACK};
use crate::registry::Agent;
use crate::types::{LogsiftError, Result, non_blank, truncate_to_token_limit};

/// Raw input for one run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecutionInput {
    /// Raw logs. Truncated to `max_prompt_log_tokens` before seeding, so the
    /// `traceback` slot also holds the truncated text.
    pub logs: String,
    /// Formatting directive placed ahead of the logs
    pub directive: Option<String>,
    pub tech_stack: Option<String>,
    pub environment: Option<String>,
}

impl ExecutionInput {
    pub fn new(logs: impl Into<String>) -> Self {
        Self {
            logs: logs.into(),
            ..Default::default()
        }
    }

    pub fn with_directive(mut self, directive: impl Into<String>) -> Self {
        self.directive = Some(directive.into());
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

/// Outcome of a successful run
#[derive(Debug, Clone)]
pub struct WorkflowRun {
    pub report: AnalysisReport,
    /// Agents merged into the report, in order
    pub invoked_agents: Vec<String>,
    /// Agents skipped because no adapter resolved
    pub skipped_agents: Vec<String>,
    pub elapsed: Duration,
}

#[derive(Debug)]
pub struct WorkflowExecutor {
    adapters: AdapterRegistry,
    merge_rules: MergeRules,
    config: ExecutionConfig,
}

impl WorkflowExecutor {
    pub fn new(adapters: AdapterRegistry, config: ExecutionConfig) -> Self {
        Self {
            adapters,
            merge_rules: MergeRules::builtin(),
            config,
        }
    }

    pub fn with_merge_rules(mut self, merge_rules: MergeRules) -> Self {
        self.merge_rules = merge_rules;
        self
    }

    pub fn config(&self) -> &ExecutionConfig {
        &self.config
    }

    #[instrument(skip(self, workflow, input), fields(agents = workflow.len()))]
    pub async fn execute(&self, workflow: &Workflow, input: &ExecutionInput) -> Result<WorkflowRun> {
        workflow.validate()?;

        let started = Instant::now();
        let deadline = Deadline::after(self.config.run_timeout());

        let tech_stack = input
            .tech_stack
            .as_deref()
            .and_then(non_blank)
            .unwrap_or(DEFAULT_TECH_STACK);
        let environment = input
            .environment
            .as_deref()
            .and_then(non_blank)
            .unwrap_or(DEFAULT_ENVIRONMENT);

        let logs = self.bounded_logs(&input.logs);
        let mut context =
            AnalysisContext::seed(&logs, input.directive.as_deref(), tech_stack, environment);
        let mut report = PartialReport::new(tech_stack, environment);
        let mut confidence = ConfidenceAccumulator::new();
        let mut invoked_agents = Vec::with_capacity(workflow.len());
        let mut skipped_agents = Vec::new();

        info!(
            "Starting analysis {} with agents [{}]",
            report.id,
            workflow.agent_ids().join(", ")
        );

        for (step, agent) in workflow.agents.iter().enumerate() {
            let Some(adapter) = self.adapters.resolve(agent) else {
                warn!(
                    "No adapter for agent '{}' (role {}), skipping",
                    agent.id, agent.role
                );
                skipped_agents.push(agent.id.clone());
                continue;
            };

            debug!(
                "Step {}/{}: '{}' via {} adapter",
                step + 1,
                workflow.len(),
                agent.id,
                adapter.name()
            );

            let result = self
                .invoke_step(adapter.as_ref(), agent, &context, &deadline)
                .await
                .inspect_err(|e| warn!("Analysis {} aborted: {}", report.id, e))?;

            self.merge_rules.apply(&mut report, &mut context, &result);
            confidence.add(result.confidence_score);
            invoked_agents.push(agent.id.clone());
        }

        let report = report.finalize(confidence.mean());
        let elapsed = started.elapsed();

        info!(
            "Analysis {} finished in {:.1}s: {} merged, {} skipped, confidence {:.2}",
            report.id,
            elapsed.as_secs_f64(),
            invoked_agents.len(),
            skipped_agents.len(),
            report.confidence_score
        );

        Ok(WorkflowRun {
            report,
            invoked_agents,
            skipped_agents,
            elapsed,
        })
    }

    /// Invoke one adapter under the step budget, normalizing every failure
    /// into `ModelInvocation` for the agent.
    async fn invoke_step(
        &self,
        adapter: &dyn AgentAdapter,
        agent: &Agent,
        context: &AnalysisContext,
        deadline: &Deadline,
    ) -> Result<AgentResult> {
        let budget = deadline.budget(self.config.step_timeout());
        if budget.is_zero() {
            return Err(LogsiftError::model_invocation(
                &agent.id,
                format!(
                    "run deadline of {}s exceeded before the agent started",
                    deadline.total().as_secs()
                ),
            ));
        }

        let snapshot = context.snapshot();
        let operation = format!("agent '{}'", agent.id);

        match with_timeout(budget, adapter.invoke(agent, &snapshot), &operation).await {
            Ok(result) => Ok(result),
            Err(err @ LogsiftError::ModelInvocation { .. }) => Err(err),
            Err(LogsiftError::Timeout { duration, .. }) => Err(LogsiftError::model_invocation(
                &agent.id,
                format!("timed out after {:.1}s", duration.as_secs_f64()),
            )),
            Err(other) => Err(LogsiftError::model_invocation(&agent.id, other.to_string())),
        }
    }

    fn bounded_logs(&self, logs: &str) -> String {
        let bounded = truncate_to_token_limit(logs, self.config.max_prompt_log_tokens);
        if bounded.len() < logs.len() {
            warn!(
                "Logs exceed {} estimated tokens, truncated from {} to {} bytes",
                self.config.max_prompt_log_tokens,
                logs.len(),
                bounded.len()
            );
        }
        bounded
    }
}
