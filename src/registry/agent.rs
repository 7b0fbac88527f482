//! Agent Definitions
//!
//! An agent is a named, configured unit of model-backed log analysis. Its
//! [`AgentRole`] decides which adapter runs it and how its output is merged.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Role tag resolved when an agent is defined
///
/// Serialized as a plain string: `summarizer`, `traceback`, `solution`,
/// `generic`, or `custom:<name>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum AgentRole {
    Summarizer,
    Traceback,
    Solution,
    #[default]
    Generic,
    Custom(String),
}

impl AgentRole {
    /// Role implied by one of the built-in agent ids
    pub fn from_builtin_id(id: &str) -> Option<Self> {
        match id {
            "summarizer" => Some(Self::Summarizer),
            "traceback" => Some(Self::Traceback),
            "solution" => Some(Self::Solution),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Summarizer => "summarizer",
            Self::Traceback => "traceback",
            Self::Solution => "solution",
            Self::Generic => "generic",
            Self::Custom(name) => name,
        }
    }

    pub fn is_builtin(&self) -> bool {
        matches!(self, Self::Summarizer | Self::Traceback | Self::Solution)
    }
}

impl fmt::Display for AgentRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Custom(name) => write!(f, "custom:{}", name),
            other => write!(f, "{}", other.as_str()),
        }
    }
}

impl From<String> for AgentRole {
    fn from(s: String) -> Self {
        let trimmed = s.trim();
        if let Some(role) = Self::from_builtin_id(&trimmed.to_lowercase()) {
            return role;
        }
        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("generic") {
            return Self::Generic;
        }
        match trimmed.strip_prefix("custom:") {
            Some(name) => Self::Custom(name.to_string()),
            None => Self::Custom(trimmed.to_string()),
        }
    }
}

impl From<&str> for AgentRole {
    fn from(s: &str) -> Self {
        Self::from(s.to_string())
    }
}

impl From<AgentRole> for String {
    fn from(role: AgentRole) -> Self {
        role.to_string()
    }
}

/// A catalogued agent
///
/// Executions hold their own clones, so edits in the registry never reach a
/// running workflow. A payload without `role` takes the role implied by a
/// built-in id, else generic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "AgentRecord")]
pub struct Agent {
    pub id: String,
    pub name: String,
    pub description: String,
    /// System instructions sent with every invocation
    pub instructions: String,
    /// Target model identifier
    pub model: String,
    pub role: AgentRole,
}

/// Wire shape of [`Agent`] before the role is resolved
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AgentRecord {
    id: String,
    name: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    instructions: String,
    model: String,
    #[serde(default)]
    role: Option<AgentRole>,
}

impl From<AgentRecord> for Agent {
    fn from(record: AgentRecord) -> Self {
        let role = record
            .role
            .or_else(|| AgentRole::from_builtin_id(&record.id))
            .unwrap_or_default();
        Self {
            id: record.id,
            name: record.name,
            description: record.description,
            instructions: record.instructions,
            model: record.model,
            role,
        }
    }
}

impl Agent {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        model: impl Into<String>,
        role: AgentRole,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: String::new(),
            instructions: String::new(),
            model: model.into(),
            role,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_instructions(mut self, instructions: impl Into<String>) -> Self {
        self.instructions = instructions.into();
        self
    }
}

/// Input for [`crate::registry::AgentRegistry::create`]
///
/// Missing id, model or role are filled in by the registry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentDraft {
    #[serde(default)]
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub instructions: String,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub role: Option<AgentRole>,
}

impl AgentDraft {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_role(mut self, role: AgentRole) -> Self {
        self.role = Some(role);
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn with_instructions(mut self, instructions: impl Into<String>) -> Self {
        self.instructions = instructions.into();
        self
    }

    /// Role for this draft: explicit, else implied by a built-in id, else generic
    pub fn resolved_role(&self) -> AgentRole {
        self.role
            .clone()
            .or_else(|| self.id.as_deref().and_then(AgentRole::from_builtin_id))
            .unwrap_or_default()
    }
}

/// Named ordering of agent ids
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowTemplate {
    pub id: String,
    pub name: String,
    /// Agent ids in execution order
    pub agents: Vec<String>,
}

impl WorkflowTemplate {
    pub fn new(id: impl Into<String>, name: impl Into<String>, agents: &[&str]) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            agents: agents.iter().map(|a| a.to_string()).collect(),
        }
    }
}
