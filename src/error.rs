//! Error types for the CDP assistant.

use thiserror::Error;

/// Library-level error type.
///
/// Only [`AssistantError::Config`] is meant to reach a chat caller; the other
/// kinds are recovered inside the pipeline (no context, or an apology).
#[derive(Error, Debug)]
pub enum AssistantError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Embedding generation failed: {0}")]
    Embedding(String),

    #[error("Retrieval failed: {0}")]
    Retrieval(String),

    #[error("Completion failed: {0}")]
    Completion(String),

    #[error("OpenAI API error: {0}")]
    OpenAI(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),
}

impl AssistantError {
    /// Whether this error must fail the request instead of degrading it.
    pub fn is_hard_failure(&self) -> bool {
        matches!(self, AssistantError::Config(_))
    }
}

/// Result type alias for assistant operations.
pub type Result<T> = std::result::Result<T, AssistantError>;
