//! Memory aggregation
//!
//! [`MemoryAggregate`] presents several independent memory stores as one.
//! Variable names are merged into a single namespace that must stay free
//! of duplicates; load, save and clear fan out to every store in
//! registration order.

use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::debug;

use crate::error::{MimirError, Result};
use crate::memory::{INPUT_KEY, Memory, Variables};

const DEFAULT_NAME: &str = "MemoryAggregate";

/// Several memory stores behind a single [`Memory`] interface
pub struct MemoryAggregate {
    name: String,
    memories: Vec<Arc<dyn Memory>>,
    variables: Vec<String>,
    save_only_input: bool,
}

impl Default for MemoryAggregate {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryAggregate {
    /// Create an empty aggregate that forwards only `input` on save
    pub fn new() -> Self {
        Self {
            name: DEFAULT_NAME.to_string(),
            memories: Vec::new(),
            variables: Vec::new(),
            save_only_input: true,
        }
    }

    /// Set the name used in log lines and naming conflicts
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Choose whether save forwards only the `input` key
    pub fn with_save_only_input(mut self, save_only_input: bool) -> Self {
        self.save_only_input = save_only_input;
        self
    }

    /// Whether save forwards only the `input` key
    pub fn save_only_input(&self) -> bool {
        self.save_only_input
    }

    /// Add a store.
    ///
    /// Every declared variable is checked before anything is merged, so a
    /// conflicting store leaves the aggregate untouched.
    pub fn register(&mut self, memory: Arc<dyn Memory>) -> Result<()> {
        let incoming = memory.variables();

        let mut seen: HashSet<&str> = self.variables.iter().map(String::as_str).collect();
        for variable in &incoming {
            if !seen.insert(variable.as_str()) {
                return Err(MimirError::NamingConflict {
                    variable: variable.clone(),
                    memory: memory.name().to_string(),
                    aggregate: self.name.clone(),
                });
            }
        }

        debug!(
            "{}: registered memory {} with variables {:?}",
            self.name,
            memory.name(),
            incoming
        );
        self.variables.extend(incoming);
        self.memories.push(memory);
        Ok(())
    }

    /// All registered variable names, in registration order
    pub fn variables(&self) -> &[String] {
        &self.variables
    }

    /// Number of registered stores
    pub fn len(&self) -> usize {
        self.memories.len()
    }

    /// Whether no store has been registered
    pub fn is_empty(&self) -> bool {
        self.memories.is_empty()
    }
}

#[async_trait]
impl Memory for MemoryAggregate {
    fn name(&self) -> &str {
        &self.name
    }

    fn variables(&self) -> Vec<String> {
        self.variables.clone()
    }

    async fn load(&self, inputs: &Variables) -> Result<Variables> {
        let mut loaded = Variables::new();
        for memory in &self.memories {
            // Later stores win on collisions
            loaded.extend(memory.load(inputs).await?);
        }
        Ok(loaded)
    }

    async fn save(&self, inputs: &Variables, outputs: &Variables) -> Result<()> {
        let narrowed;
        let inputs = if self.save_only_input {
            let input = inputs
                .get(INPUT_KEY)
                .ok_or_else(|| MimirError::MissingKey(INPUT_KEY.to_string()))?;
            narrowed = Variables::from([(INPUT_KEY.to_string(), input.clone())]);
            &narrowed
        } else {
            inputs
        };

        for memory in &self.memories {
            memory.save(inputs, outputs).await?;
        }
        Ok(())
    }

    async fn clear(&self) {
        for memory in &self.memories {
            memory.clear().await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::variables;
    use crate::testing::RecordingMemory;

    #[test]
    fn test_new_is_empty() {
        let aggregate = MemoryAggregate::new();
        assert!(aggregate.is_empty());
        assert!(aggregate.variables().is_empty());
        assert!(aggregate.save_only_input());
        assert_eq!(Memory::name(&aggregate), "MemoryAggregate");
    }

    #[test]
    fn test_register_concatenates_variables() {
        let mut aggregate = MemoryAggregate::new();
        aggregate
            .register(Arc::new(RecordingMemory::new("a", &["x", "y"])))
            .unwrap();
        aggregate
            .register(Arc::new(RecordingMemory::new("b", &["z"])))
            .unwrap();

        assert_eq!(aggregate.len(), 2);
        assert_eq!(aggregate.variables(), ["x", "y", "z"]);
    }

    #[test]
    fn test_conflict_is_atomic() {
        let mut aggregate = MemoryAggregate::new().with_name("bio");
        aggregate
            .register(Arc::new(RecordingMemory::new("a", &["x"])))
            .unwrap();

        let err = aggregate
            .register(Arc::new(RecordingMemory::new("b", &["fresh", "x"])))
            .unwrap_err();

        match err {
            MimirError::NamingConflict {
                variable,
                memory,
                aggregate: name,
            } => {
                assert_eq!(variable, "x");
                assert_eq!(memory, "b");
                assert_eq!(name, "bio");
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(aggregate.variables(), ["x"]);
        assert_eq!(aggregate.len(), 1);
    }

    #[test]
    fn test_duplicate_within_one_store_conflicts() {
        let mut aggregate = MemoryAggregate::new();
        let result = aggregate.register(Arc::new(RecordingMemory::new("a", &["x", "x"])));
        assert!(matches!(result, Err(MimirError::NamingConflict { .. })));
        assert!(aggregate.is_empty());
    }

    #[tokio::test]
    async fn test_save_without_input_key_fails() {
        let mut aggregate = MemoryAggregate::new();
        let store = Arc::new(RecordingMemory::new("a", &["x"]));
        aggregate.register(store.clone()).unwrap();

        let err = aggregate
            .save(&variables([("question", "hi")]), &variables([("output", "o")]))
            .await
            .unwrap_err();
        assert!(matches!(err, MimirError::MissingKey(k) if k == "input"));
        assert!(store.saved().is_empty());
    }

    #[tokio::test]
    async fn test_save_forwards_full_inputs_when_not_narrowing() {
        let mut aggregate = MemoryAggregate::new().with_save_only_input(false);
        let store = Arc::new(RecordingMemory::new("a", &["x"]));
        aggregate.register(store.clone()).unwrap();

        let inputs = variables([("question", "hi"), ("mood", "grim")]);
        aggregate
            .save(&inputs, &variables([("output", "o")]))
            .await
            .unwrap();

        assert_eq!(store.saved(), vec![(inputs, variables([("output", "o")]))]);
    }
}
