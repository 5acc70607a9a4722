//! Long-term memory backed by a knowledge graph
//!
//! Every saved exchange is shown to an extraction model which answers with
//! knowledge triples; those go into the graph. On load, the entities
//! mentioned in the new input are looked up and their facts are returned
//! as prompt context. The extraction transcript comes from a bounded
//! history so prompts stay small however long the session runs.

use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::config::GraphConfig;
use crate::error::{MimirError, Result};
use crate::graph::{KnowledgeGraph, KnowledgeTriple, gml, parse_entities, parse_triples};
use crate::llm::LanguageModel;
use crate::memory::{BoundedHistory, Memory, Variables, exchange, prompt_input_key};
use crate::prompts::{ENTITY_EXTRACTION_PROMPT, KNOWLEDGE_TRIPLE_EXTRACTION_PROMPT};
use crate::template::PromptTemplate;

/// Knowledge graph memory with a bounded extraction history
pub struct GraphMemory {
    llm: Arc<dyn LanguageModel>,
    memory_key: String,
    k: usize,
    human_prefix: String,
    ai_prefix: String,
    input_key: Option<String>,
    entity_prompt: PromptTemplate,
    knowledge_prompt: PromptTemplate,
    history: Mutex<BoundedHistory>,
    graph: Mutex<KnowledgeGraph>,
}

impl GraphMemory {
    pub fn new(llm: Arc<dyn LanguageModel>, config: &GraphConfig) -> Self {
        Self {
            llm,
            memory_key: config.memory_key.clone(),
            k: config.k,
            human_prefix: config.human_prefix.clone(),
            ai_prefix: config.ai_prefix.clone(),
            input_key: None,
            entity_prompt: PromptTemplate::new(ENTITY_EXTRACTION_PROMPT),
            knowledge_prompt: PromptTemplate::new(KNOWLEDGE_TRIPLE_EXTRACTION_PROMPT),
            history: Mutex::new(BoundedHistory::new(config.max_messages)),
            graph: Mutex::new(KnowledgeGraph::new()),
        }
    }

    /// Replace the extraction prompts. Both receive `{history}` and `{input}`.
    pub fn with_prompts(
        mut self,
        entity_prompt: impl Into<String>,
        knowledge_prompt: impl Into<String>,
    ) -> Self {
        self.entity_prompt = PromptTemplate::new(entity_prompt);
        self.knowledge_prompt = PromptTemplate::new(knowledge_prompt);
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

    /// Entities the extraction model finds in `input`, given recent history
    pub async fn current_entities(&self, input: &str) -> Result<Vec<String>> {
        let output = self.predict(&self.entity_prompt, input).await?;
        let entities = parse_entities(&output);
        debug!("Extracted entities: {:?}", entities);
        Ok(entities)
    }

    /// Facts the extraction model finds in `input`, given recent history
    pub async fn knowledge_triples(&self, input: &str) -> Result<Vec<KnowledgeTriple>> {
        let output = self.predict(&self.knowledge_prompt, input).await?;
        let triples = parse_triples(&output);
        debug!("Extracted {} triples", triples.len());
        Ok(triples)
    }

    async fn predict(&self, prompt: &PromptTemplate, input: &str) -> Result<String> {
        let transcript = self.history.lock().await.transcript(
            self.k * 2,
            &self.human_prefix,
            &self.ai_prefix,
        );
        let rendered = prompt.render(&Variables::from([
            ("history".to_string(), transcript),
            ("input".to_string(), input.to_string()),
        ]))?;
        Ok(self.llm.complete(&rendered).await?)
    }

    /// Copy of the current graph
    pub async fn graph(&self) -> KnowledgeGraph {
        self.graph.lock().await.clone()
    }

    /// Copy of the extraction history
    pub async fn history(&self) -> BoundedHistory {
        self.history.lock().await.clone()
    }

    /// Add facts directly, bypassing extraction
    pub async fn add_triples(&self, triples: &[KnowledgeTriple]) {
        let mut graph = self.graph.lock().await;
        for triple in triples {
            graph.add_triple(triple);
        }
    }

    /// Write the graph as GML, replacing `path` if it exists
    pub async fn write_gml(&self, path: &Path) -> Result<()> {
        let graph = self.graph.lock().await;
        gml::write_gml_file(&graph, path)
    }
}

#[async_trait]
impl Memory for GraphMemory {
    fn name(&self) -> &str {
        "long_term"
    }

    fn variables(&self) -> Vec<String> {
        vec![self.memory_key.clone()]
    }

    async fn load(&self, inputs: &Variables) -> Result<Variables> {
        let key = match &self.input_key {
            Some(key) => key.clone(),
            None => prompt_input_key(inputs, &self.variables())?,
        };
        let input = inputs
            .get(&key)
            .ok_or_else(|| MimirError::MissingKey(key.clone()))?;

        let entities = self.current_entities(input).await?;

        let graph = self.graph.lock().await;
        let context = entities
            .iter()
            .filter_map(|entity| {
                let knowledge = graph.entity_knowledge(entity);
                if knowledge.is_empty() {
                    None
                } else {
                    Some(format!("On {entity}: {}.", knowledge.join(". ")))
                }
            })
            .collect::<Vec<_>>()
            .join("\n");

        Ok(Variables::from([(self.memory_key.clone(), context)]))
    }

    async fn save(&self, inputs: &Variables, outputs: &Variables) -> Result<()> {
        let (input, output) = exchange(
            inputs,
            outputs,
            self.input_key.as_deref(),
            &self.variables(),
        )?;

        {
            let mut history = self.history.lock().await;
            history.add_user_message(input);
            history.add_ai_message(output);
        }

        let triples = self.knowledge_triples(input).await?;
        if !triples.is_empty() {
            info!("Adding {} facts to long-term memory", triples.len());
            self.add_triples(&triples).await;
        }
        Ok(())
    }

    async fn clear(&self) {
        self.history.lock().await.clear();
        self.graph.lock().await.clear();
    }
}
