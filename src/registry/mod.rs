//! Agent Registry
//!
//! Agent definitions, built-in catalogue, workflow templates and the
//! formatting template catalog.

mod agent;
mod builtin;
#[allow(clippy::module_inception)]
mod registry;
mod templates;

pub use agent::{Agent, AgentDraft, AgentRole, WorkflowTemplate};
pub use builtin::{FULL_ANALYSIS, QUICK_SUMMARY, builtin_agents, builtin_workflow_templates};
pub use registry::{
    AgentRegistry, DocumentFormat, ImportSummary, RegistryDocument, SharedRegistry,
};
pub use templates::{FormattingTemplate, formatting_template, formatting_templates};
