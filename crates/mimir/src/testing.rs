//! Test utilities for mimir - scripted models and recording memories
//!
//! These stand in for real language models and memory stores so that
//! conversation and aggregation logic can be tested without network access.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use crate::error::Result;
use crate::llm::{LanguageModel, LlmError};
use crate::memory::{Memory, Variables};

/// Language model that replays canned responses in order and records
/// every prompt it receives. Fails once the script runs out.
#[derive(Debug, Default)]
pub struct ScriptedModel {
    responses: Mutex<VecDeque<String>>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedModel {
    pub fn new<I, S>(responses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            responses: Mutex::new(responses.into_iter().map(Into::into).collect()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Queue another response
    pub fn push(&self, response: impl Into<String>) {
        self.responses
            .lock()
            .expect("scripted model lock poisoned")
            .push_back(response.into());
    }

    /// Prompts received so far, oldest first
    pub fn prompts(&self) -> Vec<String> {
        self.prompts
            .lock()
            .expect("scripted model lock poisoned")
            .clone()
    }

    /// Responses not yet consumed
    pub fn remaining(&self) -> usize {
        self.responses
            .lock()
            .expect("scripted model lock poisoned")
            .len()
    }
}

#[async_trait]
impl LanguageModel for ScriptedModel {
    async fn complete(&self, prompt: &str) -> std::result::Result<String, LlmError> {
        self.prompts
            .lock()
            .expect("scripted model lock poisoned")
            .push(prompt.to_string());
        self.responses
            .lock()
            .expect("scripted model lock poisoned")
            .pop_front()
            .ok_or_else(|| LlmError::ApiError("script exhausted".to_string()))
    }

    fn name(&self) -> &str {
        "scripted"
    }
}

/// Shared, ordered record of calls across several [`RecordingMemory`] stores
pub type CallLog = Arc<Mutex<Vec<String>>>;

/// Memory store that returns fixed values and records every call
pub struct RecordingMemory {
    name: String,
    variables: Vec<String>,
    values: Variables,
    log: CallLog,
    saved: Mutex<Vec<(Variables, Variables)>>,
}

impl RecordingMemory {
    pub fn new(name: &str, variables: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            variables: variables.iter().map(|v| v.to_string()).collect(),
            values: Variables::new(),
            log: CallLog::default(),
            saved: Mutex::new(Vec::new()),
        }
    }

    /// Values returned from `load`
    pub fn with_values(mut self, values: Variables) -> Self {
        self.values = values;
        self
    }

    /// Record calls into a log shared with other stores
    pub fn with_log(mut self, log: CallLog) -> Self {
        self.log = log;
        self
    }

    /// `(inputs, outputs)` of every save, oldest first
    pub fn saved(&self) -> Vec<(Variables, Variables)> {
        self.saved
            .lock()
            .expect("recording memory lock poisoned")
            .clone()
    }

    /// Calls recorded so far as `"{name}.{operation}"`
    pub fn calls(&self) -> Vec<String> {
        self.log
            .lock()
            .expect("recording memory lock poisoned")
            .clone()
    }

    fn record(&self, operation: &str) {
        self.log
            .lock()
            .expect("recording memory lock poisoned")
            .push(format!("{}.{}", self.name, operation));
    }
}

#[async_trait]
impl Memory for RecordingMemory {
    fn name(&self) -> &str {
        &self.name
    }

    fn variables(&self) -> Vec<String> {
        self.variables.clone()
    }

    async fn load(&self, _inputs: &Variables) -> Result<Variables> {
        self.record("load");
        Ok(self.values.clone())
    }

    async fn save(&self, inputs: &Variables, outputs: &Variables) -> Result<()> {
        self.record("save");
        self.saved
            .lock()
            .expect("recording memory lock poisoned")
            .push((inputs.clone(), outputs.clone()));
        Ok(())
    }

    async fn clear(&self) {
        self.record("clear");
    }
}
