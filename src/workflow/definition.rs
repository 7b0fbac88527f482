//! Workflow Definition
//!
//! An ordered sequence of agents. The order is the execution order.

use serde::{Deserialize, Serialize};

use crate::registry::{Agent, WorkflowTemplate};
use crate::types::{LogsiftError, Result};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Workflow {
    pub agents: Vec<Agent>,
}

impl Workflow {
    /// Custom-mode workflow built directly from agents
    pub fn new(agents: Vec<Agent>) -> Self {
        Self { agents }
    }

    /// Resolve a template's agent ids with `lookup`.
    ///
    /// Ids that do not resolve are dropped.
    pub fn from_template<F>(template: &WorkflowTemplate, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<Agent>,
    {
        let agents = template
            .agents
            .iter()
            .filter_map(|id| {
                let agent = lookup(id);
                if agent.is_none() {
                    tracing::debug!(
                        "Template '{}' references unknown agent '{}', dropping it",
                        template.id,
                        id
                    );
                }
                agent
            })
            .collect();

        Self { agents }
    }

    /// Rejects a workflow without agents
    pub fn validate(&self) -> Result<()> {
        if self.agents.is_empty() {
            return Err(LogsiftError::empty_workflow());
        }
        Ok(())
    }

    pub fn agent_ids(&self) -> Vec<&str> {
        self.agents.iter().map(|a| a.id.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }
}
