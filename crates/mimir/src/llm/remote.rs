//! Remote language model using OpenAI-compatible APIs
//!
//! Supports any OpenAI-compatible chat completion endpoint with
//! configurable URL, model, and API key via environment variable.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::config::ModelConfig;
use crate::llm::{LanguageModel, LlmError};

const INITIAL_RETRY_DELAY: Duration = Duration::from_secs(1);

/// Language model reached over an OpenAI-compatible HTTP API
#[derive(Debug)]
pub struct RemoteModel {
    client: Client,
    config: ModelConfig,
    api_key: String,
    retry_delay: Duration,
}

/// OpenAI-compatible chat completion request
#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<Message<'a>>,
    temperature: f32,
    max_tokens: u32,
}

/// Message in the chat completion request
#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'static str,
    content: &'a str,
}

/// OpenAI-compatible chat completion response
#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
}

/// Choice in the chat completion response
#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

/// Message in the response choice
#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: String,
}

impl RemoteModel {
    /// Create a model client, reading the API key from `config.api_key_env`
    pub fn new(config: &ModelConfig) -> Result<Self, LlmError> {
        let api_key = env::var(&config.api_key_env).map_err(|_| {
            LlmError::ConfigError(format!("API key env var '{}' not set", config.api_key_env))
        })?;
        Self::with_api_key(config, api_key)
    }

    /// Create a model client with an explicit API key
    pub fn with_api_key(config: &ModelConfig, api_key: impl Into<String>) -> Result<Self, LlmError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| LlmError::ApiError(e.to_string()))?;

        info!(
            "RemoteModel initialized with model: {}, api_url: {}",
            config.model, config.api_url
        );

        Ok(Self {
            client,
            config: config.clone(),
            api_key: api_key.into(),
            retry_delay: INITIAL_RETRY_DELAY,
        })
    }

    /// Override the first backoff delay (doubled on every retry)
    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.config.api_url.trim_end_matches('/'))
    }

    /// Call the API, backing off exponentially on 429s and transport errors
    async fn call_api(&self, prompt: &str) -> Result<String, LlmError> {
        let request = ChatCompletionRequest {
            model: &self.config.model,
            messages: vec![Message {
                role: "user",
                content: prompt,
            }],
            temperature: self.config.temperature,
            max_tokens: self.config.max_tokens,
        };

        let url = self.endpoint();
        debug!("Calling remote API at: {}", url);

        let attempts = self.config.max_retries.saturating_add(1);
        let mut delay = self.retry_delay;
        let mut last_error = String::from("no attempt made");

        for attempt in 1..=attempts {
            match self
                .client
                .post(&url)
                .bearer_auth(&self.api_key)
                .json(&request)
                .send()
                .await
            {
                Ok(response) => {
                    let status = response.status();

                    if status == StatusCode::TOO_MANY_REQUESTS {
                        last_error = "rate limited".to_string();
                    } else if !status.is_success() {
                        let error_text = response
                            .text()
                            .await
                            .unwrap_or_else(|_| "Unknown error".to_string());
                        return Err(LlmError::ApiError(format!(
                            "API returned {status}: {error_text}"
                        )));
                    } else {
                        let completion: ChatCompletionResponse = response
                            .json()
                            .await
                            .map_err(|e| LlmError::ParseError(e.to_string()))?;

                        return completion
                            .choices
                            .into_iter()
                            .next()
                            .map(|c| c.message.content)
                            .ok_or_else(|| LlmError::ApiError("Empty response".to_string()));
                    }
                }
                Err(e) => last_error = e.to_string(),
            }

            if attempt < attempts {
                warn!(
                    "Request failed on attempt {}/{} ({}), retrying in {:?}",
                    attempt, attempts, last_error, delay
                );
                tokio::time::sleep(delay).await;
                delay = delay.saturating_mul(2);
            }
        }

        Err(LlmError::ApiError(format!(
            "Failed after {attempts} attempts: {last_error}"
        )))
    }
}

#[async_trait]
impl LanguageModel for RemoteModel {
    async fn complete(&self, prompt: &str) -> Result<String, LlmError> {
        let text = self.call_api(prompt).await?;
        debug!("{} replied with {} chars", self.config.model, text.len());
        Ok(text)
    }

    fn name(&self) -> &str {
        &self.config.model
    }
}
