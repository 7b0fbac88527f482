//! Logsift - Agentic Error-Log Analysis
//!
//! Runs raw error logs through a configurable chain of model-backed agents
//! and produces one structured incident report.
//!
//! ## Core Features
//!
//! - **Agent Registry**: CRUD, cloning and JSON/YAML import/export of agents
//!   and workflow templates, persisted in SQLite
//! - **Adapters**: summarizer, traceback and solution agents with strict
//!   output contracts, plus a generic adapter for user-defined agents
//! - **Context Threading**: each agent sees the analysis accumulated so far
//! - **Deadlines**: per-agent and whole-run timeouts
//!
//! ## Quick Start
//!
//! ```ignore
//! use logsift::{AgentRegistry, AnalysisRequest, AnalysisService, ConfigLoader, Database};
//!
//! let config = ConfigLoader::load()?;
//! let db = Database::open(&config.storage.database_path)?;
//! db.initialize()?;
//!
//! let registry = AgentRegistry::load_from(&db)?.shared();
//! let service = AnalysisService::from_config(&config, registry)?;
//! let response = service
//!     .analyze(AnalysisRequest::new(logs), &config.preferences)
//!     .await;
//! ```
//!
//! ## Modules
//!
//! - [`registry`]: agents, workflow templates, formatting templates
//! - [`agents`]: adapter trait and the model-backed adapters
//! - [`workflow`]: executor, merge rules, confidence, service boundary
//! - [`ai`]: model providers, deadlines, response validation
//! - [`storage`]: SQLite persistence with connection pooling
//! - [`config`]: layered configuration

pub mod agents;
pub mod ai;
pub mod config;
pub mod constants;
pub mod logging;
pub mod registry;
pub mod storage;
pub mod types;
pub mod workflow;

// =============================================================================
// Core Re-exports
// =============================================================================

// Configuration
pub use config::{Config, ConfigLoader, ExecutionConfig, Preferences};

// Error Types
pub use types::error::{ErrorCategory, LogsiftError, Result, ResultExt, ValidationError};

// Storage
pub use storage::{Database, PoolConfig, SharedDatabase};

// =============================================================================
// Registry & Agents
// =============================================================================

pub use agents::{AdapterRegistry, AgentAdapter, AgentOutput, AgentResult};
pub use registry::{
    Agent, AgentDraft, AgentRegistry, AgentRole, SharedRegistry, WorkflowTemplate,
};

// =============================================================================
// Workflow Re-exports
// =============================================================================

pub use workflow::{
    AnalysisReport, AnalysisRequest, AnalysisResponse, AnalysisService, ExecutionInput,
    MergeRule, MergeRules, Workflow, WorkflowExecutor, WorkflowRun,
};

// =============================================================================
// AI Re-exports
// =============================================================================

pub use ai::{LlmProvider, LlmResponse, SharedProvider, create_provider};
