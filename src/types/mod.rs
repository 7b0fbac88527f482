pub mod error;
pub mod utils;

pub use error::{
    ErrorCategory, ErrorClassifier, LlmError, LogsiftError, Result, ResultExt, ValidationError,
    ValidationErrorKind,
};
pub use utils::{
    TokenEstimator, capitalize_first, estimate_tokens, log_filter_warn, non_blank,
    truncate_to_token_limit,
};
