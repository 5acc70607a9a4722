//! Error types for Mimir

use thiserror::Error;

use crate::llm::LlmError;

/// Main error type for Mimir operations
#[derive(Error, Debug)]
pub enum MimirError {
    /// Two memory stores declared the same variable name
    #[error("{aggregate}: variable {variable:?} introduced by memory {memory} already exists")]
    NamingConflict {
        variable: String,
        memory: String,
        aggregate: String,
    },

    /// A required key was absent from an inputs/outputs mapping
    #[error("Missing key: {0:?}")]
    MissingKey(String),

    /// More than one candidate key for the prompt input
    #[error("Ambiguous input, expected a single key but found: {0:?}")]
    AmbiguousInput(Vec<String>),

    /// More than one candidate key for the model output
    #[error("Ambiguous output, expected a single key but found: {0:?}")]
    AmbiguousOutput(Vec<String>),

    /// Language model errors
    #[error("Model error: {0}")]
    Llm(#[from] LlmError),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Result type alias for Mimir operations
pub type Result<T> = std::result::Result<T, MimirError>;
