//! Database Layer with Connection Pooling and Safe Transactions
//!
//! SQLite store for the agent registry:
//! - Connection pooling via r2d2 for concurrent access
//! - Panic-safe transactions with automatic rollback
//! - Version-tracked migrations
//! - WAL mode for concurrent readers

use std::path::Path;
use std::sync::Arc;

use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::{Connection, OptionalExtension, params};

use crate::config::Preferences;
use crate::registry::{Agent, AgentRole, WorkflowTemplate};
use crate::types::{LogsiftError, Result, ResultExt, log_filter_warn};

/// Shared database handle for async contexts.
pub type SharedDatabase = Arc<Database>;

const SCHEMA: &str = include_str!("schema.sql");

/// Current schema version for migration tracking
const SCHEMA_VERSION: u32 = 2;

const PREF_ACTIVE_WORKFLOW: &str = "active_workflow";
const PREF_SYNC_ENABLED: &str = "sync_enabled";

/// Migration definitions
struct Migration {
    version: u32,
    description: &'static str,
    up: &'static str,
}

const MIGRATIONS: &[Migration] = &[Migration {
    version: 2,
    description: "Add role column to agents",
    up: "ALTER TABLE agents ADD COLUMN role TEXT NOT NULL DEFAULT 'generic';
         UPDATE agents SET role = id WHERE id IN ('summarizer', 'traceback', 'solution');",
}];

/// Connection pool configuration
///
/// Pool size is derived from CPU cores.
#[derive(Debug, Clone)]
pub struct PoolConfig {
    /// Maximum number of connections in the pool
    pub max_size: u32,
    /// Minimum idle connections to keep ready
    pub min_idle: u32,
    /// Timeout for acquiring a connection (seconds)
    pub connection_timeout_secs: u64,
}

impl PoolConfig {
    const MIN_POOL_SIZE: u32 = 2;
    const MAX_POOL_SIZE: u32 = 16;

    /// clamp(cores, MIN, MAX); registry traffic is read-mostly and light
    pub fn optimal_pool_size() -> u32 {
        let cores = std::thread::available_parallelism()
            .map(|p| p.get() as u32)
            .unwrap_or(4);
        cores.clamp(Self::MIN_POOL_SIZE, Self::MAX_POOL_SIZE)
    }

    pub fn auto() -> Self {
        let max_size = Self::optimal_pool_size();
        Self {
            max_size,
            min_idle: (max_size / 4).max(1),
            connection_timeout_secs: 30,
        }
    }
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self::auto()
    }
}

/// Thread-safe database with connection pooling.
pub struct Database {
    pool: Pool<SqliteConnectionManager>,
}

impl Database {
    /// Open database with connection pooling at the specified path.
    ///
    /// Creates the parent directory when missing.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        if let Some(parent) = path.as_ref().parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }
        Self::open_with_config(path, PoolConfig::default())
    }

    /// Open database with custom pool configuration.
    pub fn open_with_config<P: AsRef<Path>>(path: P, config: PoolConfig) -> Result<Self> {
        let manager =
            SqliteConnectionManager::file(path.as_ref()).with_init(Self::configure_connection);

        let pool = Pool::builder()
            .max_size(config.max_size)
            .min_idle(Some(config.min_idle))
            .connection_timeout(std::time::Duration::from_secs(
                config.connection_timeout_secs,
            ))
            .build(manager)
            .map_err(|e| {
                LogsiftError::Storage(format!("Failed to create connection pool: {}", e))
            })?;

        Ok(Self { pool })
    }

    /// Open an in-memory database for testing or temporary use.
    pub fn open_in_memory() -> Result<Self> {
        let manager = SqliteConnectionManager::memory().with_init(|conn| {
            conn.execute_batch("PRAGMA foreign_keys = ON;")?;
            Ok(())
        });

        let pool = Pool::builder().max_size(1).build(manager).map_err(|e| {
            LogsiftError::Storage(format!("Failed to create in-memory pool: {}", e))
        })?;

        Ok(Self { pool })
    }

    fn configure_connection(conn: &mut Connection) -> std::result::Result<(), rusqlite::Error> {
        conn.execute_batch(
            r#"
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA foreign_keys = ON;
            PRAGMA busy_timeout = 5000;
            "#,
        )?;
        Ok(())
    }

    fn conn(&self) -> Result<PooledConnection<SqliteConnectionManager>> {
        self.pool.get().map_err(|e| {
            LogsiftError::Storage(format!("Failed to acquire database connection: {}", e))
        })
    }

    /// Create tables on a fresh database, migrate an older one.
    pub fn initialize(&self) -> Result<()> {
        let conn = self.conn()?;
        let current_version: u32 = conn
            .pragma_query_value(None, "user_version", |row| row.get(0))
            .unwrap_or(0);

        if current_version == 0 {
            conn.execute_batch(SCHEMA)
                .with_context("Failed to initialize database schema")?;
            conn.pragma_update(None, "user_version", SCHEMA_VERSION)
                .with_context("Failed to set schema version")?;
            return Ok(());
        }

        drop(conn);
        self.migrate(current_version)
    }

    fn migrate(&self, current_version: u32) -> Result<()> {
        let conn = self.conn()?;

        for migration in MIGRATIONS {
            if migration.version > current_version {
                conn.execute_batch(migration.up).with_context_fn(|| {
                    format!(
                        "Failed to apply migration {}: {}",
                        migration.version, migration.description
                    )
                })?;

                tracing::info!(
                    "Applied migration {}: {}",
                    migration.version,
                    migration.description
                );
            }
        }

        if current_version < SCHEMA_VERSION {
            conn.pragma_update(None, "user_version", SCHEMA_VERSION)
                .with_context("Failed to update schema version")?;
        }

        Ok(())
    }

    /// Get a raw connection for advanced operations.
    pub fn connection(&self) -> Result<PooledConnection<SqliteConnectionManager>> {
        self.conn()
    }

    /// Execute a function within a panic-safe database transaction.
    ///
    /// If the closure errors or panics the transaction is rolled back and the
    /// pool stays usable.
    pub fn transaction<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Connection) -> Result<T> + std::panic::UnwindSafe,
    {
        let mut conn = self.conn()?;
        let tx = conn
            .transaction()
            .with_context("Failed to start transaction")?;

        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| f(&tx)));

        match result {
            Ok(Ok(value)) => {
                tx.commit().with_context("Failed to commit transaction")?;
                Ok(value)
            }
            // rolled back on drop
            Ok(Err(e)) => Err(e),
            Err(panic_payload) => {
                let panic_msg = panic_payload
                    .downcast_ref::<&str>()
                    .map(|s| s.to_string())
                    .or_else(|| panic_payload.downcast_ref::<String>().cloned())
                    .unwrap_or_else(|| "Unknown panic".to_string());

                tracing::error!("Transaction panicked: {}", panic_msg);
                Err(LogsiftError::Storage(format!(
                    "Transaction panicked: {}",
                    panic_msg
                )))
            }
        }
    }

    // =========================================================================
    // Agents
    // =========================================================================

    /// Replace the stored agent catalogue with `agents`, keeping their order.
    pub fn save_agents(&self, agents: &[Agent]) -> Result<()> {
        let now = chrono::Utc::now().to_rfc3339();
        self.transaction(|conn| {
            conn.execute("DELETE FROM agents", [])?;
            let mut stmt = conn.prepare(
                "INSERT INTO agents (id, position, name, description, instructions, model, role, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            )?;
            for (position, agent) in agents.iter().enumerate() {
                stmt.execute(params![
                    agent.id,
                    position as i64,
                    agent.name,
                    agent.description,
                    agent.instructions,
                    agent.model,
                    agent.role.to_string(),
                    now,
                ])?;
            }
            Ok(())
        })
    }

    /// Load agents in catalogue order. Unreadable rows are skipped with a warning.
    pub fn load_agents(&self) -> Result<Vec<Agent>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT id, name, description, instructions, model, role
             FROM agents ORDER BY position",
        )?;

        let agents = stmt
            .query_map([], |row| {
                Ok(Agent {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    description: row.get(2)?,
                    instructions: row.get(3)?,
                    model: row.get(4)?,
                    role: AgentRole::from(row.get::<_, String>(5)?),
                })
            })?
            .filter_map(|r| log_filter_warn(r, "Skipping unreadable agent row"))
            .collect();

        Ok(agents)
    }

    // =========================================================================
    // Workflow Templates
    // =========================================================================

    pub fn save_workflow_templates(&self, templates: &[WorkflowTemplate]) -> Result<()> {
        let now = chrono::Utc::now().to_rfc3339();
        let rows: Vec<(&WorkflowTemplate, String)> = templates
            .iter()
            .map(|t| Ok((t, serde_json::to_string(&t.agents)?)))
            .collect::<Result<_>>()?;

        self.transaction(|conn| {
            conn.execute("DELETE FROM workflow_templates", [])?;
            let mut stmt = conn.prepare(
                "INSERT INTO workflow_templates (id, position, name, agent_ids, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
            )?;
            for (position, (template, agent_ids)) in rows.iter().enumerate() {
                stmt.execute(params![
                    template.id,
                    position as i64,
                    template.name,
                    agent_ids,
                    now
                ])?;
            }
            Ok(())
        })
    }

    pub fn load_workflow_templates(&self) -> Result<Vec<WorkflowTemplate>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT id, name, agent_ids FROM workflow_templates ORDER BY position",
        )?;

        let rows: Vec<(String, String, String)> = stmt
            .query_map([], |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)))?
            .filter_map(|r| log_filter_warn(r, "Skipping unreadable workflow template row"))
            .collect();

        let templates = rows
            .into_iter()
            .filter_map(|(id, name, agent_ids)| {
                let agents = log_filter_warn(
                    serde_json::from_str::<Vec<String>>(&agent_ids),
                    "Skipping workflow template with malformed agent list",
                )?;
                Some(WorkflowTemplate { id, name, agents })
            })
            .collect();

        Ok(templates)
    }

    // =========================================================================
    // Preferences
    // =========================================================================

    pub fn get_preference(&self, key: &str) -> Result<Option<String>> {
        let value = self
            .conn()?
            .query_row(
                "SELECT value FROM preferences WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()?;
        Ok(value)
    }

    pub fn set_preference(&self, key: &str, value: &str) -> Result<()> {
        let now = chrono::Utc::now().to_rfc3339();
        self.conn()?
            .execute(
                "INSERT INTO preferences (key, value, updated_at) VALUES (?1, ?2, ?3)
                 ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
                params![key, value, now],
            )
            .with_context_fn(|| format!("Failed to store preference '{}'", key))?;
        Ok(())
    }

    /// Stored preferences layered over `defaults`
    pub fn load_preferences(&self, defaults: &Preferences) -> Result<Preferences> {
        let mut prefs = defaults.clone();
        if let Some(workflow) = self.get_preference(PREF_ACTIVE_WORKFLOW)? {
            prefs.active_workflow = workflow;
        }
        if let Some(sync) = self.get_preference(PREF_SYNC_ENABLED)? {
            prefs.sync_enabled = sync == "true";
        }
        Ok(prefs)
    }

    pub fn save_preferences(&self, prefs: &Preferences) -> Result<()> {
        self.set_preference(PREF_ACTIVE_WORKFLOW, &prefs.active_workflow)?;
        self.set_preference(PREF_SYNC_ENABLED, if prefs.sync_enabled { "true" } else { "false" })
    }
}
