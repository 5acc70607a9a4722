//! Conversation controller
//!
//! One turn is: load memory for the input, render the prompt, ask the
//! model, then save the exchange back into memory.

use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::debug;

use crate::error::{MimirError, Result};
use crate::llm::LanguageModel;
use crate::memory::{INPUT_KEY, Memory, Variables};
use crate::template::PromptTemplate;

/// Key the model reply is saved under
pub const RESPONSE_KEY: &str = "response";

/// Drives a model with a memory-backed prompt
pub struct Conversation {
    llm: Arc<dyn LanguageModel>,
    memory: Arc<dyn Memory>,
    prompt: PromptTemplate,
}

impl std::fmt::Debug for Conversation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Conversation")
            .field("llm", &self.llm.name())
            .field("memory", &self.memory.name())
            .field("prompt", &self.prompt)
            .finish()
    }
}

impl Conversation {
    /// The prompt must use exactly the memory's variables plus `input`
    pub fn new(
        llm: Arc<dyn LanguageModel>,
        memory: Arc<dyn Memory>,
        prompt: PromptTemplate,
    ) -> Result<Self> {
        let memory_variables = memory.variables();
        if memory_variables.iter().any(|v| v == INPUT_KEY) {
            return Err(MimirError::Config(format!(
                "memory {} must not supply the {INPUT_KEY:?} variable",
                memory.name()
            )));
        }

        let mut expected: BTreeSet<&str> = memory_variables.iter().map(String::as_str).collect();
        expected.insert(INPUT_KEY);
        let found: BTreeSet<&str> = prompt.variables().iter().map(String::as_str).collect();

        if expected != found {
            return Err(MimirError::Config(format!(
                "prompt variables {found:?} do not match memory variables plus input {expected:?}"
            )));
        }

        Ok(Self {
            llm,
            memory,
            prompt,
        })
    }

    pub fn memory(&self) -> &Arc<dyn Memory> {
        &self.memory
    }

    /// Run one turn and return the model's reply
    pub async fn predict(&self, input: &str) -> Result<String> {
        let inputs = Variables::from([(INPUT_KEY.to_string(), input.to_string())]);

        let mut values = self.memory.load(&inputs).await?;
        values.extend(inputs.clone());

        let prompt = self.prompt.render(&values)?;
        debug!("Prompt for {}:\n{}", self.llm.name(), prompt);

        let response = self.llm.complete(&prompt).await?.trim().to_string();

        let outputs = Variables::from([(RESPONSE_KEY.to_string(), response.clone())]);
        self.memory.save(&inputs, &outputs).await?;

        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::variables;
    use crate::testing::{RecordingMemory, ScriptedModel};

    #[test]
    fn test_new_rejects_unknown_prompt_variable() {
        let llm = Arc::new(ScriptedModel::default());
        let memory = Arc::new(RecordingMemory::new("m", &["history"]));
        let prompt = PromptTemplate::new("{history} {mood} {input}");

        let err = Conversation::new(llm, memory, prompt).unwrap_err();
        assert!(matches!(err, MimirError::Config(_)));
    }

    #[test]
    fn test_new_rejects_missing_memory_variable() {
        let llm = Arc::new(ScriptedModel::default());
        let memory = Arc::new(RecordingMemory::new("m", &["history", "facts"]));
        let prompt = PromptTemplate::new("{history} {input}");

        assert!(Conversation::new(llm, memory, prompt).is_err());
    }

    #[test]
    fn test_new_rejects_memory_supplying_input() {
        let llm = Arc::new(ScriptedModel::default());
        let memory = Arc::new(RecordingMemory::new("m", &["input"]));
        let prompt = PromptTemplate::new("{input}");

        let err = Conversation::new(llm, memory, prompt).unwrap_err();
        assert!(err.to_string().contains("must not supply"));
    }

    #[tokio::test]
    async fn test_predict_round_trip() {
        let llm = Arc::new(ScriptedModel::new(["  A goblin appears.\n"]));
        let memory = Arc::new(
            RecordingMemory::new("m", &["history"])
                .with_values(variables([("history", "Kit: hello")])),
        );
        let conversation = Conversation::new(
            llm.clone(),
            memory.clone(),
            PromptTemplate::new("{history}\nKit: {input}\nDM:"),
        )
        .unwrap();

        let reply = conversation.predict("I look around.").await.unwrap();

        assert_eq!(reply, "A goblin appears.");
        assert_eq!(llm.prompts(), vec!["Kit: hello\nKit: I look around.\nDM:"]);
        assert_eq!(
            memory.saved(),
            vec![(
                variables([("input", "I look around.")]),
                variables([("response", "A goblin appears.")])
            )]
        );
        assert_eq!(memory.calls(), vec!["m.load", "m.save"]);
    }

    #[tokio::test]
    async fn test_model_failure_skips_save() {
        let llm = Arc::new(ScriptedModel::default());
        let memory = Arc::new(
            RecordingMemory::new("m", &["history"]).with_values(variables([("history", "")])),
        );
        let conversation =
            Conversation::new(llm, memory.clone(), PromptTemplate::new("{history}{input}"))
                .unwrap();

        assert!(matches!(
            conversation.predict("hi").await,
            Err(MimirError::Llm(_))
        ));
        assert!(memory.saved().is_empty());
    }
}
