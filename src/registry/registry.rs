//! Agent Registry
//!
//! In-memory catalogue of agents and workflow templates. Readers run
//! concurrently; writers take the lock briefly and the last write wins.
//! [`AgentRegistry::load_from`] and [`AgentRegistry::save_to`] bridge the
//! catalogue to the SQLite store.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use super::agent::{Agent, AgentDraft, WorkflowTemplate};
use super::builtin::{builtin_agents, builtin_workflow_templates};
use crate::constants::registry::{AGENT_ID_PREFIX, CLONE_SUFFIX, DEFAULT_AGENT_MODEL};
use crate::storage::Database;
use crate::types::{LogsiftError, Result, ValidationError, ValidationErrorKind, non_blank};
use crate::workflow::Workflow;

pub type SharedRegistry = Arc<AgentRegistry>;

#[derive(Debug, Default)]
struct RegistryState {
    /// Creation order
    agents: Vec<Agent>,
    templates: Vec<WorkflowTemplate>,
}

#[derive(Debug, Default)]
pub struct AgentRegistry {
    state: RwLock<RegistryState>,
}

/// Serialized registry contents for import and export
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistryDocument {
    #[serde(default)]
    pub agents: Vec<Agent>,
    #[serde(default)]
    pub templates: Vec<WorkflowTemplate>,
}

/// Document encodings accepted by import and export
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Json,
    Yaml,
}

impl DocumentFormat {
    /// Format implied by a file extension (`.json`, `.yaml`, `.yml`)
    pub fn from_extension(path: &std::path::Path) -> Option<Self> {
        match path.extension()?.to_str()?.to_ascii_lowercase().as_str() {
            "json" => Some(Self::Json),
            "yaml" | "yml" => Some(Self::Yaml),
            _ => None,
        }
    }
}

/// Counts of entries written by an import
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportSummary {
    pub agents: usize,
    pub templates: usize,
}

impl AgentRegistry {
    /// Empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry seeded with the built-in agents and workflow templates
    pub fn with_builtins() -> Self {
        Self::from_parts(builtin_agents(), builtin_workflow_templates())
    }

    fn from_parts(agents: Vec<Agent>, templates: Vec<WorkflowTemplate>) -> Self {
        Self {
            state: RwLock::new(RegistryState { agents, templates }),
        }
    }

    pub fn shared(self) -> SharedRegistry {
        Arc::new(self)
    }

    fn read(&self) -> RwLockReadGuard<'_, RegistryState> {
        self.state
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, RegistryState> {
        self.state
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    // =========================================================================
    // Agents
    // =========================================================================

    pub fn get(&self, id: &str) -> Option<Agent> {
        self.read().agents.iter().find(|a| a.id == id).cloned()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.read().agents.iter().any(|a| a.id == id)
    }

    /// All agents in creation order
    pub fn list(&self) -> Vec<Agent> {
        self.read().agents.clone()
    }

    pub fn len(&self) -> usize {
        self.read().agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().agents.is_empty()
    }

    /// Add an agent from a draft.
    ///
    /// A fresh `agent_<uuid>` id is assigned when the draft has none; an
    /// explicit id already in use is rejected.
    pub fn create(&self, draft: AgentDraft) -> Result<Agent> {
        let Some(name) = non_blank(&draft.name) else {
            return Err(ValidationError::new(
                ValidationErrorKind::MissingField,
                "Agent name must not be blank",
            )
            .with_field("name")
            .into());
        };

        let role = draft.resolved_role();
        let model = draft
            .model
            .as_deref()
            .and_then(non_blank)
            .unwrap_or(DEFAULT_AGENT_MODEL);

        let mut state = self.write();
        let id = match draft.id.as_deref().and_then(non_blank) {
            Some(id) => {
                if state.agents.iter().any(|a| a.id == id) {
                    return Err(duplicate_id(id));
                }
                id.to_string()
            }
            None => generate_agent_id(),
        };

        let agent = Agent::new(id, name, model, role)
            .with_description(draft.description)
            .with_instructions(draft.instructions);

        tracing::debug!("Registered agent '{}' ({})", agent.id, agent.role);
        state.agents.push(agent.clone());
        Ok(agent)
    }

    /// Replace the agent with the same id, keeping its position.
    pub fn update(&self, agent: Agent) -> Result<()> {
        let mut state = self.write();
        let slot = state
            .agents
            .iter_mut()
            .find(|a| a.id == agent.id)
            .ok_or_else(|| LogsiftError::AgentNotFound(agent.id.clone()))?;
        *slot = agent;
        Ok(())
    }

    /// Remove an agent. Templates referencing it keep the id and drop it on resolution.
    pub fn delete(&self, id: &str) -> Result<Agent> {
        let mut state = self.write();
        let index = state
            .agents
            .iter()
            .position(|a| a.id == id)
            .ok_or_else(|| LogsiftError::AgentNotFound(id.to_string()))?;
        Ok(state.agents.remove(index))
    }

    /// Copy an agent under a new id with " (Clone)" appended to its name
    pub fn clone_agent(&self, id: &str) -> Result<Agent> {
        let mut state = self.write();
        let source = state
            .agents
            .iter()
            .find(|a| a.id == id)
            .ok_or_else(|| LogsiftError::AgentNotFound(id.to_string()))?;

        let clone = Agent {
            id: generate_agent_id(),
            name: format!("{}{}", source.name, CLONE_SUFFIX),
            ..source.clone()
        };
        state.agents.push(clone.clone());
        Ok(clone)
    }

    // =========================================================================
    // Workflow Templates
    // =========================================================================

    pub fn templates(&self) -> Vec<WorkflowTemplate> {
        self.read().templates.clone()
    }

    pub fn template(&self, id: &str) -> Option<WorkflowTemplate> {
        self.read().templates.iter().find(|t| t.id == id).cloned()
    }

    /// Insert a template or replace the one with the same id
    pub fn upsert_template(&self, template: WorkflowTemplate) -> Result<()> {
        if non_blank(&template.id).is_none() {
            return Err(ValidationError::new(
                ValidationErrorKind::MissingField,
                "Workflow template id must not be blank",
            )
            .with_field("id")
            .into());
        }

        let mut state = self.write();
        match state.templates.iter_mut().find(|t| t.id == template.id) {
            Some(slot) => *slot = template,
            None => state.templates.push(template),
        }
        Ok(())
    }

    pub fn delete_template(&self, id: &str) -> Result<WorkflowTemplate> {
        let mut state = self.write();
        let index = state
            .templates
            .iter()
            .position(|t| t.id == id)
            .ok_or_else(|| LogsiftError::TemplateNotFound(id.to_string()))?;
        Ok(state.templates.remove(index))
    }

    /// Resolve a template's agent ids against the current catalogue
    pub fn resolve_template(&self, id: &str) -> Result<Workflow> {
        let state = self.read();
        let template = state
            .templates
            .iter()
            .find(|t| t.id == id)
            .ok_or_else(|| LogsiftError::TemplateNotFound(id.to_string()))?;

        Ok(Workflow::from_template(template, |agent_id| {
            state.agents.iter().find(|a| a.id == agent_id).cloned()
        }))
    }

    /// Replace each agent in `workflow` with the registry's current version.
    ///
    /// Agents the registry does not know are kept as submitted.
    pub fn refresh(&self, workflow: &Workflow) -> Workflow {
        let state = self.read();
        let agents = workflow
            .agents
            .iter()
            .map(|submitted| {
                state
                    .agents
                    .iter()
                    .find(|a| a.id == submitted.id)
                    .cloned()
                    .unwrap_or_else(|| submitted.clone())
            })
            .collect();
        Workflow::new(agents)
    }

    // =========================================================================
    // Import / Export
    // =========================================================================

    pub fn export(&self) -> RegistryDocument {
        let state = self.read();
        RegistryDocument {
            agents: state.agents.clone(),
            templates: state.templates.clone(),
        }
    }

    pub fn export_to_string(&self, format: DocumentFormat) -> Result<String> {
        let document = self.export();
        Ok(match format {
            DocumentFormat::Json => serde_json::to_string_pretty(&document)?,
            DocumentFormat::Yaml => serde_yaml::to_string(&document)?,
        })
    }

    /// Parse and import a serialized document
    pub fn import_str(&self, content: &str, format: DocumentFormat) -> Result<ImportSummary> {
        let document: RegistryDocument = match format {
            DocumentFormat::Json => serde_json::from_str(content).map_err(malformed)?,
            DocumentFormat::Yaml => serde_yaml::from_str(content).map_err(malformed)?,
        };
        self.import(document)
    }

    /// Upsert every agent and template of `document` by id.
    ///
    /// The whole document is checked first; nothing is written when it is malformed.
    pub fn import(&self, document: RegistryDocument) -> Result<ImportSummary> {
        check_unique_ids(document.agents.iter().map(|a| a.id.as_str()), "agents")?;
        check_unique_ids(document.templates.iter().map(|t| t.id.as_str()), "templates")?;
        if let Some(agent) = document.agents.iter().find(|a| non_blank(&a.name).is_none()) {
            return Err(ValidationError::new(
                ValidationErrorKind::MissingField,
                format!("Imported agent '{}' has a blank name", agent.id),
            )
            .with_field("agents.name")
            .into());
        }

        let summary = ImportSummary {
            agents: document.agents.len(),
            templates: document.templates.len(),
        };

        let mut state = self.write();
        for agent in document.agents {
            match state.agents.iter_mut().find(|a| a.id == agent.id) {
                Some(slot) => *slot = agent,
                None => state.agents.push(agent),
            }
        }
        for template in document.templates {
            match state.templates.iter_mut().find(|t| t.id == template.id) {
                Some(slot) => *slot = template,
                None => state.templates.push(template),
            }
        }

        tracing::info!(
            "Imported {} agents and {} workflow templates",
            summary.agents,
            summary.templates
        );
        Ok(summary)
    }

    // =========================================================================
    // Persistence
    // =========================================================================

    /// Load the catalogue from `db`, seeding built-ins when the store is empty.
    pub fn load_from(db: &Database) -> Result<Self> {
        let agents = db.load_agents()?;
        let templates = db.load_workflow_templates()?;

        if agents.is_empty() && templates.is_empty() {
            tracing::info!("Registry store is empty, seeding built-in agents");
            return Ok(Self::with_builtins());
        }

        tracing::debug!(
            "Loaded {} agents and {} workflow templates",
            agents.len(),
            templates.len()
        );
        Ok(Self::from_parts(agents, templates))
    }

    /// Persist a snapshot of the catalogue to `db`
    pub fn save_to(&self, db: &Database) -> Result<()> {
        let RegistryDocument { agents, templates } = self.export();
        db.save_agents(&agents)?;
        db.save_workflow_templates(&templates)
    }
}

fn generate_agent_id() -> String {
    format!("{}{}", AGENT_ID_PREFIX, uuid::Uuid::new_v4().simple())
}

fn duplicate_id(id: &str) -> LogsiftError {
    ValidationError::new(
        ValidationErrorKind::General,
        format!("An agent with id '{}' already exists", id),
    )
    .with_field("id")
    .into()
}

fn malformed(err: impl std::fmt::Display) -> LogsiftError {
    ValidationError::new(
        ValidationErrorKind::Format,
        format!("Malformed registry document: {}", err),
    )
    .into()
}

fn check_unique_ids<'a>(ids: impl Iterator<Item = &'a str>, section: &str) -> Result<()> {
    let mut seen = HashSet::new();
    for id in ids {
        if non_blank(id).is_none() {
            return Err(ValidationError::new(
                ValidationErrorKind::MissingField,
                format!("Blank id in {}", section),
            )
            .with_field(format!("{}.id", section))
            .into());
        }
        if !seen.insert(id) {
            return Err(ValidationError::new(
                ValidationErrorKind::General,
                format!("Duplicate id '{}' in {}", id, section),
            )
            .with_field(format!("{}.id", section))
            .into());
        }
    }
    Ok(())
}
