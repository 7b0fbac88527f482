//! Global Constants
//!
//! Centralized constants for configuration and tuning.
//! All magic numbers and fallback texts are defined here.

/// Execution defaults
pub mod execution {
    /// Minimum number of characters (after trimming) accepted as log input
    pub const MIN_LOG_CHARS: usize = 50;

    /// Per-agent invocation timeout (seconds)
    pub const STEP_TIMEOUT_SECS: u64 = 120;

    /// Whole-run deadline (seconds)
    pub const RUN_TIMEOUT_SECS: u64 = 600;

    /// Upper bound for log text embedded in a single prompt (estimated tokens)
    pub const MAX_PROMPT_LOG_TOKENS: usize = 24_000;

    /// Tech stack recorded when the request does not name one
    pub const DEFAULT_TECH_STACK: &str = "Unknown";

    /// Environment recorded when the request does not name one
    pub const DEFAULT_ENVIRONMENT: &str = "production";

    /// Separator placed between a formatting directive and the raw logs,
    /// and between accumulated context entries
    pub const SECTION_SEPARATOR: &str = "\n\n";

    /// Prefix of generated report ids
    pub const REPORT_ID_PREFIX: &str = "analysis_";
}

/// Report fallback texts for fields no agent populated
pub mod placeholder {
    pub const SUMMARY: &str = "No summary generated.";
    pub const NOT_ANALYZED: &str = "Not analyzed.";
    pub const PREVENTION: &str = "No prevention advice generated.";
    pub const SOLUTION_DESCRIPTION: &str = "No solution generated.";
    pub const SOLUTION_CODE: &str = "No code generated.";
    pub const VERIFICATION: &str = "No verification steps generated.";
    pub const EXCEPTION_TYPE: &str = "Unknown";
}

/// Agent registry constants
pub mod registry {
    /// Model assigned to built-in agents and to drafts that omit one
    pub const DEFAULT_AGENT_MODEL: &str = "gemini-2.5-flash";

    /// Prefix of generated agent ids
    pub const AGENT_ID_PREFIX: &str = "agent_";

    /// Suffix appended to the name of a cloned agent
    pub const CLONE_SUFFIX: &str = " (Clone)";

    /// Workflow template selected when preferences name none
    pub const DEFAULT_WORKFLOW: &str = "full-analysis";
}

/// HTTP/Network constants
pub mod network {
    /// Default request timeout (seconds)
    pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

    /// Connection timeout (seconds)
    pub const CONNECTION_TIMEOUT_SECS: u64 = 30;
}
