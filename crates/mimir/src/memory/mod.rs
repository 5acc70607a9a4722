//! Conversational memory stores
//!
//! A memory store declares the variable names it can supply, loads values
//! for those variables before a turn and records the turn afterwards.
//! Stores are composed with [`MemoryAggregate`] so that a conversation
//! controller sees a single memory.

pub mod aggregate;
pub mod history;
pub mod window;

pub use aggregate::MemoryAggregate;
pub use history::{BoundedHistory, ChatMessage, Role};
pub use window::WindowMemory;

use async_trait::async_trait;
use std::collections::HashMap;

use crate::error::{MimirError, Result};

/// Key/value mapping used for inputs, outputs and loaded memory variables
pub type Variables = HashMap<String, String>;

/// Key holding the player's text in an inputs mapping
pub const INPUT_KEY: &str = "input";

/// Key holding the model's reply in an outputs mapping
pub const OUTPUT_KEY: &str = "output";

/// Key that never counts as a prompt input
const STOP_KEY: &str = "stop";

/// A conversational memory store
///
/// Implementations use interior mutability so that a store can be shared
/// between an aggregate and the session that inspects it.
#[async_trait]
pub trait Memory: Send + Sync {
    /// Store name for logging and error messages
    fn name(&self) -> &str;

    /// Variable names this store supplies
    fn variables(&self) -> Vec<String>;

    /// Produce values for this store's variables
    async fn load(&self, inputs: &Variables) -> Result<Variables>;

    /// Record one exchange
    async fn save(&self, inputs: &Variables, outputs: &Variables) -> Result<()>;

    /// Forget everything
    async fn clear(&self);
}

/// Find the key of `inputs` that carries the prompt text.
///
/// Keys naming one of `memory_variables` and the `stop` key are ignored;
/// exactly one candidate must remain.
pub fn prompt_input_key(inputs: &Variables, memory_variables: &[String]) -> Result<String> {
    let mut candidates: Vec<String> = inputs
        .keys()
        .filter(|k| k.as_str() != STOP_KEY && !memory_variables.contains(k))
        .cloned()
        .collect();

    match candidates.len() {
        0 => Err(MimirError::MissingKey(INPUT_KEY.to_string())),
        1 => Ok(candidates.remove(0)),
        _ => {
            candidates.sort();
            Err(MimirError::AmbiguousInput(candidates))
        }
    }
}

/// Find the key of `outputs` that carries the model reply
pub fn output_key(outputs: &Variables) -> Result<String> {
    if outputs.contains_key(OUTPUT_KEY) {
        return Ok(OUTPUT_KEY.to_string());
    }

    let mut keys: Vec<String> = outputs.keys().cloned().collect();
    match keys.len() {
        0 => Err(MimirError::MissingKey(OUTPUT_KEY.to_string())),
        1 => Ok(keys.remove(0)),
        _ => {
            keys.sort();
            Err(MimirError::AmbiguousOutput(keys))
        }
    }
}

/// Resolve the input and output text of an exchange
pub fn exchange<'a>(
    inputs: &'a Variables,
    outputs: &'a Variables,
    input_key: Option<&str>,
    memory_variables: &[String],
) -> Result<(&'a str, &'a str)> {
    let input_key = match input_key {
        Some(key) => key.to_string(),
        None => prompt_input_key(inputs, memory_variables)?,
    };
    let input = inputs
        .get(&input_key)
        .ok_or_else(|| MimirError::MissingKey(input_key.clone()))?;

    let output_key = output_key(outputs)?;
    let output = outputs
        .get(&output_key)
        .ok_or_else(|| MimirError::MissingKey(output_key.clone()))?;

    Ok((input, output))
}

/// Build a [`Variables`] mapping from literal pairs
pub fn variables<const N: usize>(pairs: [(&str, &str); N]) -> Variables {
    pairs
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_input_key_single() {
        let inputs = variables([("question", "where am I?")]);
        assert_eq!(prompt_input_key(&inputs, &[]).unwrap(), "question");
    }

    #[test]
    fn test_prompt_input_key_ignores_memory_variables_and_stop() {
        let inputs = variables([
            ("input", "hello"),
            ("history", "old"),
            ("stop", "\n"),
        ]);
        let key = prompt_input_key(&inputs, &["history".to_string()]).unwrap();
        assert_eq!(key, "input");
    }

    #[test]
    fn test_prompt_input_key_missing() {
        let inputs = variables([("history", "old")]);
        let err = prompt_input_key(&inputs, &["history".to_string()]).unwrap_err();
        assert!(matches!(err, MimirError::MissingKey(k) if k == "input"));
    }

    #[test]
    fn test_prompt_input_key_ambiguous() {
        let inputs = variables([("input", "a"), ("mood", "b")]);
        let err = prompt_input_key(&inputs, &[]).unwrap_err();
        match err {
            MimirError::AmbiguousInput(keys) => assert_eq!(keys, vec!["input", "mood"]),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_output_key_prefers_output() {
        let outputs = variables([("output", "a"), ("response", "b")]);
        assert_eq!(output_key(&outputs).unwrap(), "output");
    }

    #[test]
    fn test_output_key_single_other() {
        let outputs = variables([("response", "b")]);
        assert_eq!(output_key(&outputs).unwrap(), "response");
    }

    #[test]
    fn test_output_key_ambiguous() {
        let outputs = variables([("response", "a"), ("text", "b")]);
        assert!(matches!(
            output_key(&outputs),
            Err(MimirError::AmbiguousOutput(_))
        ));
    }

    #[test]
    fn test_exchange_with_explicit_input_key() {
        let inputs = variables([("input", "hi"), ("line", "hello")]);
        let outputs = variables([("response", "well met")]);
        let (input, output) = exchange(&inputs, &outputs, Some("line"), &[]).unwrap();
        assert_eq!(input, "hello");
        assert_eq!(output, "well met");
    }

    #[test]
    fn test_exchange_explicit_key_missing() {
        let inputs = variables([("input", "hi")]);
        let outputs = variables([("output", "yo")]);
        let err = exchange(&inputs, &outputs, Some("line"), &[]).unwrap_err();
        assert!(matches!(err, MimirError::MissingKey(k) if k == "line"));
    }
}
