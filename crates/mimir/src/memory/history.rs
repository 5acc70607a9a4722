//! Bounded chat history
//!
//! A fixed-capacity FIFO of chat messages. Appending to a full buffer
//! silently drops the oldest message first, so the length never exceeds
//! the capacity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Who produced a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// The player
    Human,
    /// The model
    Ai,
}

/// A single message in a conversation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Role of the speaker
    pub role: Role,
    /// Content of the message
    pub content: String,
    /// When the message was recorded
    pub timestamp: DateTime<Utc>,
}

impl ChatMessage {
    /// Create a new message with current timestamp
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            timestamp: Utc::now(),
        }
    }
}

/// Chat history holding at most `max_len` messages
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoundedHistory {
    max_len: usize,
    messages: VecDeque<ChatMessage>,
}

impl BoundedHistory {
    /// Create an empty history. A capacity of zero is raised to one.
    pub fn new(max_len: usize) -> Self {
        Self {
            max_len: max_len.max(1),
            messages: VecDeque::new(),
        }
    }

    /// Record a player message
    pub fn add_user_message(&mut self, content: impl Into<String>) {
        self.append(ChatMessage::new(Role::Human, content));
    }

    /// Record a model message
    pub fn add_ai_message(&mut self, content: impl Into<String>) {
        self.append(ChatMessage::new(Role::Ai, content));
    }

    /// Append a message, evicting the oldest one when full
    pub fn append(&mut self, message: ChatMessage) {
        self.make_room();
        self.messages.push_back(message);
    }

    fn make_room(&mut self) {
        if self.messages.len() >= self.max_len {
            self.messages.pop_front();
        }
    }

    /// Maximum number of messages retained
    pub fn capacity(&self) -> usize {
        self.max_len
    }

    /// Get the number of messages in the buffer
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Check if the buffer is empty
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Clear all messages from the buffer
    pub fn clear(&mut self) {
        self.messages.clear();
    }

    /// Iterate over the messages (oldest first)
    pub fn messages(&self) -> impl Iterator<Item = &ChatMessage> {
        self.messages.iter()
    }

    /// The last `n` messages, oldest first
    pub fn recent(&self, n: usize) -> impl Iterator<Item = &ChatMessage> {
        self.messages.iter().skip(self.messages.len().saturating_sub(n))
    }

    /// Render the last `last_n` messages as `prefix: content` lines
    pub fn transcript(&self, last_n: usize, human_prefix: &str, ai_prefix: &str) -> String {
        self.recent(last_n)
            .map(|m| {
                let prefix = match m.role {
                    Role::Human => human_prefix,
                    Role::Ai => ai_prefix,
                };
                format!("{prefix}: {}", m.content)
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}
