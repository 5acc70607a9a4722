//! Language model trait
//!
//! Abstracts the backend that turns a rendered prompt into text, so the
//! conversation and extraction code can run against scripted models in
//! tests.

use async_trait::async_trait;

/// Trait for text generation backends
#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// Generate a completion for a fully rendered prompt
    async fn complete(&self, prompt: &str) -> Result<String, LlmError>;

    /// Model name for logging
    fn name(&self) -> &str;
}

/// Language model errors
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("API error: {0}")]
    ApiError(String),
    #[error("Parse error: {0}")]
    ParseError(String),
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_llm_error_display() {
        let err = LlmError::ApiError("API returned 500".to_string());
        assert_eq!(err.to_string(), "API error: API returned 500");

        let err = LlmError::ConfigError("API key env var 'X' not set".to_string());
        assert_eq!(err.to_string(), "Configuration error: API key env var 'X' not set");
    }
}
