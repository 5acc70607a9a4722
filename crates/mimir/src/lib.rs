//! Mimir - layered conversational memory for an LLM Dungeon Master
//!
//! A short-term window of recent dialogue and a long-term knowledge graph
//! are composed behind a single memory interface that feeds a
//! conversation controller.

pub mod config;
pub mod conversation;
pub mod error;
pub mod graph;
pub mod llm;
pub mod memory;
pub mod prompts;
pub mod session;
pub mod template;
pub mod testing;

pub use error::{MimirError, Result};
