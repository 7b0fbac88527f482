//! Configuration Loader (Figment-based)
//!
//! Loads and merges configuration from multiple sources using Figment:
//! 1. Built-in defaults (Serialized)
//! 2. Global config (~/.config/logsift/config.toml)
//! 3. Project config (.logsift/config.toml)
//! 4. Environment variables (LOGSIFT_* prefix, `__` separates nesting)

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use super::types::Config;
use crate::types::{LogsiftError, Result};

const ENV_PREFIX: &str = "LOGSIFT_";

/// Configuration loader
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration with full resolution chain using Figment:
    /// defaults → global → project → env vars
    pub fn load() -> Result<Config> {
        Self::load_layered(
            Self::global_config_path().as_deref(),
            &Self::project_config_path(),
            ENV_PREFIX,
        )
    }

    /// Load from explicit global/project files and env prefix.
    ///
    /// Missing files are skipped. Env keys nest on `__`, so
    /// `LOGSIFT_EXECUTION__MIN_LOG_CHARS` sets `execution.min_log_chars`.
    pub fn load_layered(global: Option<&Path>, project: &Path, env_prefix: &str) -> Result<Config> {
        let mut figment = Figment::new().merge(Serialized::defaults(Config::default()));

        if let Some(global_path) = global
            && global_path.exists()
        {
            debug!("Loading global config from: {}", global_path.display());
            figment = figment.merge(Toml::file(global_path));
        }

        if project.exists() {
            debug!("Loading project config from: {}", project.display());
            figment = figment.merge(Toml::file(project));
        }

        figment = figment.merge(Env::prefixed(env_prefix).split("__").lowercase(true));

        let config: Config = figment
            .extract()
            .map_err(|e| LogsiftError::Config(format!("Configuration error: {}", e)))?;

        config.validate()?;

        Ok(config)
    }

    /// Load configuration from a specific file only
    pub fn load_from_file(path: &Path) -> Result<Config> {
        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(path))
            .extract()
            .map_err(|e| LogsiftError::Config(format!("Configuration error: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    // =========================================================================
    // Path Management
    // =========================================================================

    /// Get path to global config directory (~/.config/logsift/)
    pub fn global_dir() -> Option<PathBuf> {
        env::var("XDG_CONFIG_HOME")
            .ok()
            .map(PathBuf::from)
            .or_else(|| {
                env::var("HOME")
                    .ok()
                    .map(|home| PathBuf::from(home).join(".config"))
            })
            .map(|p| p.join("logsift"))
    }

    /// Get path to global config file
    pub fn global_config_path() -> Option<PathBuf> {
        Self::global_dir().map(|dir| dir.join("config.toml"))
    }

    /// Get path to project config file
    pub fn project_config_path() -> PathBuf {
        Self::project_dir().join("config.toml")
    }

    /// Get project data directory
    pub fn project_dir() -> PathBuf {
        PathBuf::from(".logsift")
    }

    /// Render the effective configuration as TOML
    pub fn render(config: &Config) -> Result<String> {
        toml::to_string_pretty(config).map_err(|e| LogsiftError::Config(e.to_string()))
    }

    // =========================================================================
    // Initialization
    // =========================================================================

    /// Initialize global configuration
    pub fn init_global(force: bool) -> Result<PathBuf> {
        let global_dir = Self::global_dir().ok_or_else(|| {
            LogsiftError::Config("Cannot determine global config directory".to_string())
        })?;
        Self::write_default(&global_dir, Self::default_global_config(), force)?;
        Ok(global_dir)
    }

    /// Initialize project configuration under `root`
    pub fn init_project(root: &Path) -> Result<PathBuf> {
        let project_dir = root.join(Self::project_dir());
        Self::write_default(&project_dir, Self::default_project_config(), false)?;
        Ok(project_dir)
    }

    fn write_default(dir: &Path, content: &str, force: bool) -> Result<()> {
        fs::create_dir_all(dir)?;

        let config_path = dir.join("config.toml");
        if !config_path.exists() || force {
            fs::write(&config_path, content)?;
            info!("Created config: {}", config_path.display());
        } else {
            info!("Config exists: {}", config_path.display());
        }
        Ok(())
    }

    // =========================================================================
    // Internal
    // =========================================================================

    /// Default global config content (TOML)
    fn default_global_config() -> &'static str {
        r#"# logsift Global Configuration
# User-wide defaults. Project settings in .logsift/config.toml override these.

version = "1.0"

# Model provider used by the built-in agents
[llm]
provider = "openai"
model = "gemini-2.5-flash"
api_base = "https://generativelanguage.googleapis.com/v1beta/openai"
api_key_env = "GEMINI_API_KEY"
timeout_secs = 120
temperature = 0.2

# Workflow execution limits
[execution]
min_log_chars = 50
step_timeout_secs = 120
run_timeout_secs = 600
"#
    }

    /// Default project config content (TOML)
    fn default_project_config() -> &'static str {
        r#"# logsift Project Configuration
# Project-specific settings that override global defaults.

version = "1.0"

[storage]
database_path = ".logsift/registry.db"

[preferences]
active_workflow = "full-analysis"
sync_enabled = true
"#
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn load_in(dir: &TempDir, prefix: &str) -> Result<Config> {
        let global = dir.path().join("global.toml");
        let project = dir.path().join("project.toml");
        ConfigLoader::load_layered(Some(&global), &project, prefix)
    }

    #[test]
    fn test_load_defaults_without_files() {
        let dir = TempDir::new().unwrap();
        let config = load_in(&dir, "LOGSIFT_TEST_NOFILES_").unwrap();
        assert_eq!(config.version, "1.0");
        assert_eq!(config.execution.min_log_chars, 50);
    }

    #[test]
    fn test_project_overrides_global() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("global.toml"),
            "[llm]\nmodel = \"global-model\"\n[execution]\nstep_timeout_secs = 30\n",
        )
        .unwrap();
        fs::write(
            dir.path().join("project.toml"),
            "[llm]\nmodel = \"project-model\"\n",
        )
        .unwrap();

        let config = load_in(&dir, "LOGSIFT_TEST_LAYERS_").unwrap();
        assert_eq!(config.llm.model, "project-model");
        assert_eq!(config.execution.step_timeout_secs, 30);
    }

    #[test]
    fn test_env_override() {
        let dir = TempDir::new().unwrap();
        // SAFETY: the prefix is unique to this test
        unsafe {
            std::env::set_var("LOGSIFT_TEST_ENV_LLM__MODEL", "test-model");
            std::env::set_var("LOGSIFT_TEST_ENV_EXECUTION__MIN_LOG_CHARS", "120");
        }
        let config = load_in(&dir, "LOGSIFT_TEST_ENV_").unwrap();
        assert_eq!(config.llm.model, "test-model");
        assert_eq!(config.execution.min_log_chars, 120);
        unsafe {
            std::env::remove_var("LOGSIFT_TEST_ENV_LLM__MODEL");
            std::env::remove_var("LOGSIFT_TEST_ENV_EXECUTION__MIN_LOG_CHARS");
        }
    }

    #[test]
    fn test_invalid_values_rejected() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("project.toml"), "[llm]\ntemperature = 9.0\n").unwrap();
        let err = load_in(&dir, "LOGSIFT_TEST_INVALID_").unwrap_err();
        assert!(matches!(err, LogsiftError::Config(_)));
    }

    #[test]
    fn test_init_project_writes_loadable_config() {
        let dir = TempDir::new().unwrap();
        let project_dir = ConfigLoader::init_project(dir.path()).unwrap();
        let config_path = project_dir.join("config.toml");
        assert!(config_path.exists());

        let config = ConfigLoader::load_from_file(&config_path).unwrap();
        assert_eq!(config.preferences.active_workflow, "full-analysis");
    }

    #[test]
    fn test_default_global_config_parses() {
        let config: Config = toml::from_str(ConfigLoader::default_global_config()).unwrap();
        assert_eq!(config.llm.api_key_env, "GEMINI_API_KEY");
        assert_eq!(config.execution.run_timeout_secs, 600);
    }

    #[test]
    fn test_render_round_trips_through_toml() {
        let rendered = ConfigLoader::render(&Config::default()).unwrap();
        assert!(rendered.contains("[execution]"));
        assert!(rendered.contains("min_log_chars = 50"));
    }
}
