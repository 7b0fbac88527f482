//! Model Integration Layer
//!
//! Provider abstraction, deadlines and response validation for the
//! model-backed agents.

pub mod provider;
pub mod timeout;
pub mod validation;

pub use provider::{
    GenerationRequest, LlmProvider, LlmResponse, OllamaProvider, OpenAiProvider, ProviderConfig,
    SharedProvider, TokenUsage, create_provider,
};
pub use timeout::{Deadline, with_timeout};
pub use validation::{JsonRepairer, OutputReader};
