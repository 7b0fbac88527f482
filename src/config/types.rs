//! Configuration Types
//!
//! All configuration structures with sensible defaults.
//! Supports global (~/.config/logsift/) and project (.logsift/) level configuration.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::ai::provider::ProviderConfig;
use crate::constants::{execution, network, registry};
use crate::types::{LogsiftError, Result};

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Configuration version
    pub version: String,

    /// LLM provider settings
    pub llm: LlmConfig,

    /// Workflow execution limits
    pub execution: ExecutionConfig,

    /// Agent registry storage
    pub storage: StorageConfig,

    /// User preferences applied to each analysis request
    pub preferences: Preferences,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: "1.0".to_string(),
            llm: LlmConfig::default(),
            execution: ExecutionConfig::default(),
            storage: StorageConfig::default(),
            preferences: Preferences::default(),
        }
    }
}

impl Config {
    /// Validate configuration values are within acceptable ranges.
    /// Returns `LogsiftError::Config` on validation failure.
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=2.0).contains(&self.llm.temperature) {
            return Err(LogsiftError::Config(format!(
                "LLM temperature must be between 0.0 and 2.0, got {}",
                self.llm.temperature
            )));
        }

        if self.llm.timeout_secs == 0 {
            return Err(LogsiftError::Config(
                "LLM timeout_secs must be greater than 0".to_string(),
            ));
        }

        if self.execution.step_timeout_secs == 0 || self.execution.run_timeout_secs == 0 {
            return Err(LogsiftError::Config(
                "Execution step_timeout_secs and run_timeout_secs must be greater than 0"
                    .to_string(),
            ));
        }

        if self.execution.step_timeout_secs > self.execution.run_timeout_secs {
            tracing::warn!(
                "execution.step_timeout_secs ({}) exceeds run_timeout_secs ({}); steps are bounded by the run deadline",
                self.execution.step_timeout_secs,
                self.execution.run_timeout_secs
            );
        }

        if self.preferences.active_workflow.trim().is_empty() {
            return Err(LogsiftError::Config(
                "preferences.active_workflow must name a workflow template".to_string(),
            ));
        }

        Ok(())
    }
}

// =============================================================================
// LLM Configuration
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Provider name ("openai" for any OpenAI-compatible endpoint, "ollama")
    pub provider: String,

    /// Model used when an agent does not name one
    pub model: String,

    /// API base URL (OpenAI-compatible endpoint or Ollama host)
    pub api_base: Option<String>,

    /// Environment variable holding the API key
    pub api_key_env: String,

    /// Request timeout in seconds
    pub timeout_secs: u64,

    /// Temperature for LLM generation (0.0 = deterministic, 1.0 = creative)
    pub temperature: f32,

    /// Maximum tokens to generate
    pub max_tokens: usize,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: "openai".to_string(),
            model: registry::DEFAULT_AGENT_MODEL.to_string(),
            api_base: Some("https://generativelanguage.googleapis.com/v1beta/openai".to_string()),
            api_key_env: "GEMINI_API_KEY".to_string(),
            timeout_secs: network::DEFAULT_TIMEOUT_SECS,
            temperature: 0.2,
            max_tokens: 4096,
        }
    }
}

impl LlmConfig {
    /// Build the provider configuration, reading the API key from `api_key_env`
    pub fn to_provider_config(&self) -> ProviderConfig {
        ProviderConfig {
            provider: self.provider.clone(),
            model: Some(self.model.clone()),
            timeout_secs: self.timeout_secs,
            temperature: self.temperature,
            api_key: std::env::var(&self.api_key_env).ok(),
            api_base: self.api_base.clone(),
            max_tokens: self.max_tokens,
        }
    }
}

// =============================================================================
// Execution Configuration
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecutionConfig {
    /// Minimum trimmed log length accepted by the analysis service
    pub min_log_chars: usize,

    /// Per-agent invocation timeout in seconds
    pub step_timeout_secs: u64,

    /// Whole-run deadline in seconds
    pub run_timeout_secs: u64,

    /// Estimated token cap for log text embedded in one prompt
    pub max_prompt_log_tokens: usize,
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        Self {
            min_log_chars: execution::MIN_LOG_CHARS,
            step_timeout_secs: execution::STEP_TIMEOUT_SECS,
            run_timeout_secs: execution::RUN_TIMEOUT_SECS,
            max_prompt_log_tokens: execution::MAX_PROMPT_LOG_TOKENS,
        }
    }
}

impl ExecutionConfig {
    pub fn step_timeout(&self) -> Duration {
        Duration::from_secs(self.step_timeout_secs)
    }

    pub fn run_timeout(&self) -> Duration {
        Duration::from_secs(self.run_timeout_secs)
    }
}

// =============================================================================
// Storage Configuration
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// SQLite database holding agents, workflow templates and preferences
    pub database_path: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: PathBuf::from(".logsift/registry.db"),
        }
    }
}

// =============================================================================
// Preferences
// =============================================================================

/// Per-user preferences, passed explicitly into each analysis call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Preferences {
    /// Workflow template used when a request carries no workflow
    pub active_workflow: String,

    /// Refresh submitted agents from the live registry before running
    pub sync_enabled: bool,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            active_workflow: registry::DEFAULT_WORKFLOW.to_string(),
            sync_enabled: true,
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.version, "1.0");
        assert_eq!(config.llm.provider, "openai");
        assert_eq!(config.llm.model, "gemini-2.5-flash");
        assert_eq!(config.execution.min_log_chars, 50);
        assert_eq!(config.preferences.active_workflow, "full-analysis");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_temperature() {
        let mut config = Config::default();
        config.llm.temperature = 3.5;
        assert!(matches!(config.validate(), Err(LogsiftError::Config(_))));
    }

    #[test]
    fn test_validate_rejects_zero_timeouts() {
        let mut config = Config::default();
        config.execution.step_timeout_secs = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.execution.run_timeout_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_blank_workflow() {
        let mut config = Config::default();
        config.preferences.active_workflow = "  ".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_execution_durations() {
        let exec = ExecutionConfig {
            step_timeout_secs: 5,
            run_timeout_secs: 30,
            ..Default::default()
        };
        assert_eq!(exec.step_timeout(), Duration::from_secs(5));
        assert_eq!(exec.run_timeout(), Duration::from_secs(30));
    }

    #[test]
    fn test_to_provider_config_redacts_in_debug() {
        let llm = LlmConfig {
            api_key_env: "LOGSIFT_TEST_UNSET_KEY_VAR".to_string(),
            ..Default::default()
        };
        let provider = llm.to_provider_config();
        assert_eq!(provider.provider, "openai");
        assert_eq!(provider.model.as_deref(), Some("gemini-2.5-flash"));
        assert!(provider.api_key.is_none());
        assert!(!format!("{:?}", provider).contains("secret"));
    }

    #[test]
    fn test_preferences_from_toml() {
        let prefs: Preferences =
            toml::from_str("active_workflow = \"quick-summary\"\nsync_enabled = false").unwrap();
        assert_eq!(prefs.active_workflow, "quick-summary");
        assert!(!prefs.sync_enabled);

        let partial: Preferences = toml::from_str("sync_enabled = false").unwrap();
        assert_eq!(partial.active_workflow, "full-analysis");
    }
}
