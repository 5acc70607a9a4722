//! A single Dungeon Master session
//!
//! The session owns both models and both memories for the lifetime of one
//! campaign conversation. Short-term and long-term memory are registered
//! in an aggregate that the conversation sees as one store; the session
//! keeps its own handles to them for inspection and persistence.

use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

use crate::config::Config;
use crate::conversation::{Conversation, RESPONSE_KEY};
use crate::error::Result;
use crate::graph::{GraphMemory, KnowledgeTriple};
use crate::llm::{LanguageModel, RemoteModel};
use crate::memory::{BoundedHistory, INPUT_KEY, Memory, MemoryAggregate, Variables, WindowMemory};
use crate::prompts::{dungeon_master_prompt, introduction, introduction_reply};
use crate::template::PromptTemplate;

/// The player's character
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Character {
    pub name: String,
    pub nick: String,
}

impl Character {
    /// Blank name falls back to `default_name`; blank nick falls back to the name
    pub fn new(name: &str, nick: &str, default_name: &str) -> Self {
        let name = match name.trim() {
            "" => default_name.to_string(),
            name => name.to_string(),
        };
        let nick = match nick.trim() {
            "" => name.clone(),
            nick => nick.to_string(),
        };
        Self { name, nick }
    }
}

/// Point-in-time view of both memories
#[derive(Debug, Clone, Serialize)]
pub struct MemorySnapshot {
    pub short_term: BoundedHistory,
    pub entities: Vec<String>,
    pub facts: Vec<KnowledgeTriple>,
}

/// Files written by [`Session::persist`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedFiles {
    pub short_term: PathBuf,
    pub long_term: PathBuf,
}

pub struct Session {
    config: Config,
    character: Character,
    short_term: Arc<WindowMemory>,
    long_term: Arc<GraphMemory>,
    conversation: Conversation,
}

impl Session {
    /// Build a session talking to the remote models named in `config`
    pub fn from_config(config: Config, character: Character) -> Result<Self> {
        let main: Arc<dyn LanguageModel> = Arc::new(RemoteModel::new(&config.models.main)?);
        let extraction: Arc<dyn LanguageModel> =
            Arc::new(RemoteModel::new(&config.models.extraction)?);
        Self::new(config, character, main, extraction)
    }

    /// Build a session around the given models
    pub fn new(
        config: Config,
        character: Character,
        main: Arc<dyn LanguageModel>,
        extraction: Arc<dyn LanguageModel>,
    ) -> Result<Self> {
        let ai_prefix = config.session.ai_prefix.clone();

        let long_term = Arc::new(GraphMemory::new(extraction, &config.memory.long_term));
        let short_term = Arc::new(
            WindowMemory::new(&config.memory.short_term)
                .with_prefixes(character.nick.clone(), ai_prefix.clone()),
        );

        let mut aggregate = MemoryAggregate::new()
            .with_name("bio_memory")
            .with_save_only_input(config.memory.save_only_input);
        aggregate.register(long_term.clone())?;
        aggregate.register(short_term.clone())?;

        info!(
            "Session started for {} ({}) with {} as {}",
            character.name,
            character.nick,
            main.name(),
            ai_prefix
        );

        let prompt = PromptTemplate::new(dungeon_master_prompt(&character.nick, &ai_prefix));
        let conversation = Conversation::new(main, Arc::new(aggregate), prompt)?;

        Ok(Self {
            config,
            character,
            short_term,
            long_term,
            conversation,
        })
    }

    pub fn character(&self) -> &Character {
        &self.character
    }

    pub fn ai_prefix(&self) -> &str {
        &self.config.session.ai_prefix
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn short_term(&self) -> &Arc<WindowMemory> {
        &self.short_term
    }

    pub fn long_term(&self) -> &Arc<GraphMemory> {
        &self.long_term
    }

    /// Record the character-creation exchange and return `(line, reply)`
    pub async fn introduce(&self) -> Result<(String, String)> {
        let line = introduction(&self.character.name, &self.character.nick);
        let reply = introduction_reply(&self.character.name, &self.character.nick, self.ai_prefix());

        self.conversation
            .memory()
            .save(
                &Variables::from([(INPUT_KEY.to_string(), line.clone())]),
                &Variables::from([(RESPONSE_KEY.to_string(), reply.clone())]),
            )
            .await?;

        Ok((line, reply))
    }

    /// Play one turn
    pub async fn say(&self, input: &str) -> Result<String> {
        self.conversation.predict(input).await
    }

    /// Copy of the current memory state
    pub async fn snapshot(&self) -> MemorySnapshot {
        let graph = self.long_term.graph().await;
        MemorySnapshot {
            short_term: self.short_term.history().await,
            entities: graph.entities().into_iter().map(str::to_string).collect(),
            facts: graph.triples(),
        }
    }

    /// Write short-term history as JSON and the graph as GML into `dir`,
    /// or into the configured output directory
    pub async fn persist(&self, dir: Option<&Path>) -> Result<PersistedFiles> {
        let dir = dir.unwrap_or(self.config.session.output_dir.as_path());
        tokio::fs::create_dir_all(dir).await?;

        let files = PersistedFiles {
            short_term: dir.join(&self.config.session.short_term_file),
            long_term: dir.join(&self.config.session.long_term_file),
        };
        self.short_term.write_json(&files.short_term).await?;
        self.long_term.write_gml(&files.long_term).await?;

        info!(
            "Saved memory to {} and {}",
            files.short_term.display(),
            files.long_term.display()
        );
        Ok(files)
    }

    /// Forget everything in both memories
    pub async fn clear(&self) {
        self.conversation.memory().clear().await;
    }
}
