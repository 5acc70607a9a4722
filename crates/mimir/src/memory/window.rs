//! Short-term memory: a sliding window over recent dialogue

use async_trait::async_trait;
use std::path::Path;
use tokio::sync::Mutex;

use crate::config::WindowConfig;
use crate::error::{MimirError, Result};
use crate::memory::{BoundedHistory, Memory, Variables, exchange};

/// Exposes the last `k` exchanges as a transcript
pub struct WindowMemory {
    memory_key: String,
    k: usize,
    human_prefix: String,
    ai_prefix: String,
    input_key: Option<String>,
    history: Mutex<BoundedHistory>,
}

impl WindowMemory {
    pub fn new(config: &WindowConfig) -> Self {
        Self {
            memory_key: config.memory_key.clone(),
            k: config.k,
            human_prefix: "Human".to_string(),
            ai_prefix: "AI".to_string(),
            input_key: None,
            history: Mutex::new(BoundedHistory::new(config.capacity())),
        }
    }

    /// Labels used when rendering the transcript
    pub fn with_prefixes(mut self, human: impl Into<String>, ai: impl Into<String>) -> Self {
        self.human_prefix = human.into();
        self.ai_prefix = ai.into();
        self
    }

    /// Read the player's text from this key instead of guessing it
    pub fn with_input_key(mut self, key: impl Into<String>) -> Self {
        self.input_key = Some(key.into());
        self
    }

    pub fn memory_key(&self) -> &str {
        &self.memory_key
    }

    /// Copy of the current buffer
    pub async fn history(&self) -> BoundedHistory {
        self.history.lock().await.clone()
    }

    /// The transcript `load` would currently produce
    pub async fn transcript(&self) -> String {
        self.history
            .lock()
            .await
            .transcript(self.k * 2, &self.human_prefix, &self.ai_prefix)
    }

    /// Serialize the buffer as pretty JSON
    pub async fn to_json(&self) -> Result<String> {
        let history = self.history.lock().await;
        serde_json::to_string_pretty(&*history)
            .map_err(|e| MimirError::Serialization(e.to_string()))
    }

    /// Write the buffer as JSON, replacing `path` if it exists
    pub async fn write_json(&self, path: &Path) -> Result<()> {
        let json = self.to_json().await?;
        tokio::fs::write(path, json).await?;
        tracing::debug!("Wrote short-term history to {}", path.display());
        Ok(())
    }
}

#[async_trait]
impl Memory for WindowMemory {
    fn name(&self) -> &str {
        "short_term"
    }

    fn variables(&self) -> Vec<String> {
        vec![self.memory_key.clone()]
    }

    async fn load(&self, _inputs: &Variables) -> Result<Variables> {
        Ok(Variables::from([(
            self.memory_key.clone(),
            self.transcript().await,
        )]))
    }

    async fn save(&self, inputs: &Variables, outputs: &Variables) -> Result<()> {
        let (input, output) = exchange(
            inputs,
            outputs,
            self.input_key.as_deref(),
            &self.variables(),
        )?;

        let mut history = self.history.lock().await;
        history.add_user_message(input);
        history.add_ai_message(output);
        Ok(())
    }

    async fn clear(&self) {
        self.history.lock().await.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::variables;

    fn config(k: usize, max_messages: usize) -> WindowConfig {
        WindowConfig {
            memory_key: "history".to_string(),
            k,
            max_messages: Some(max_messages),
        }
    }

    async fn say(memory: &WindowMemory, input: &str, output: &str) {
        memory
            .save(&variables([("input", input)]), &variables([("output", output)]))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_load_empty() {
        let memory = WindowMemory::new(&config(2, 4));
        let loaded = memory.load(&Variables::new()).await.unwrap();
        assert_eq!(loaded, variables([("history", "")]));
    }

    #[tokio::test]
    async fn test_load_renders_last_k_exchanges() {
        let memory = WindowMemory::new(&config(1, 10)).with_prefixes("Kit", "DM");
        say(&memory, "I draw my sword.", "The goblin snarls.").await;
        say(&memory, "I attack!", "You hit for 6 damage.").await;

        let loaded = memory.load(&Variables::new()).await.unwrap();
        assert_eq!(
            loaded["history"],
            "Kit: I attack!\nDM: You hit for 6 damage."
        );
        assert_eq!(memory.history().await.len(), 4);
    }

    #[tokio::test]
    async fn test_buffer_capacity_applies() {
        let memory = WindowMemory::new(&config(5, 2));
        say(&memory, "one", "two").await;
        say(&memory, "three", "four").await;

        let contents: Vec<_> = memory
            .history()
            .await
            .messages()
            .map(|m| m.content.clone())
            .collect();
        assert_eq!(contents, vec!["three", "four"]);
    }

    #[tokio::test]
    async fn test_save_uses_explicit_input_key() {
        let memory = WindowMemory::new(&config(2, 4)).with_input_key("line");
        memory
            .save(
                &variables([("line", "hello"), ("mood", "cheerful")]),
                &variables([("response", "hi")]),
            )
            .await
            .unwrap();

        assert_eq!(memory.transcript().await, "Human: hello\nAI: hi");
    }

    #[tokio::test]
    async fn test_save_ambiguous_input() {
        let memory = WindowMemory::new(&config(2, 4));
        let result = memory
            .save(
                &variables([("line", "hello"), ("mood", "cheerful")]),
                &variables([("output", "hi")]),
            )
            .await;
        assert!(matches!(result, Err(MimirError::AmbiguousInput(_))));
        assert!(memory.history().await.is_empty());
    }

    #[tokio::test]
    async fn test_clear() {
        let memory = WindowMemory::new(&config(2, 4));
        say(&memory, "a", "b").await;
        memory.clear().await;
        assert!(memory.history().await.is_empty());
    }

    #[tokio::test]
    async fn test_write_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("short_term_memory.json");

        let memory = WindowMemory::new(&config(2, 4));
        say(&memory, "a", "b").await;
        memory.write_json(&path).await.unwrap();

        let restored: BoundedHistory =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(restored.len(), 2);
        assert_eq!(restored.capacity(), 4);
    }
}
