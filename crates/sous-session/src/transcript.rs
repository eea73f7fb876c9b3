//! Chat transcript
//!
//! Only text the user is meant to see is ever stored here. Hidden context
//! never reaches the transcript.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use uuid::Uuid;

/// Who wrote a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// The cook
    User,
    /// The assistant
    Assistant,
    /// Status lines from the app itself
    System,
}

/// One rendered chat line
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Message id
    pub id: Uuid,
    /// Author
    pub role: Role,
    /// Visible text
    pub text: String,
    /// When it was recorded
    pub timestamp: DateTime<Utc>,
}

impl ChatMessage {
    /// Create new message stamped now
    #[must_use]
    pub fn new(role: Role, text: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            role,
            text: text.into(),
            timestamp: Utc::now(),
        }
    }

    /// User message
    #[inline]
    #[must_use]
    pub fn user(text: impl Into<String>) -> Self {
        Self::new(Role::User, text)
    }

    /// Assistant message
    #[inline]
    #[must_use]
    pub fn assistant(text: impl Into<String>) -> Self {
        Self::new(Role::Assistant, text)
    }

    /// System message
    #[inline]
    #[must_use]
    pub fn system(text: impl Into<String>) -> Self {
        Self::new(Role::System, text)
    }
}

/// Bounded message log; the oldest messages fall off first
#[derive(Debug, Clone)]
pub struct Transcript {
    messages: VecDeque<ChatMessage>,
    capacity: usize,
}

impl Transcript {
    /// Default number of messages kept
    pub const DEFAULT_CAPACITY: usize = 200;

    /// Create an empty transcript
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            messages: VecDeque::new(),
            capacity,
        }
    }

    /// Append a message, trimming from the front past capacity
    pub fn push(&mut self, message: ChatMessage) {
        self.messages.push_back(message);
        while self.messages.len() > self.capacity {
            self.messages.pop_front();
        }
    }

    /// Messages oldest first
    pub fn messages(&self) -> impl Iterator<Item = &ChatMessage> {
        self.messages.iter()
    }

    /// Most recent message
    #[must_use]
    pub fn last(&self) -> Option<&ChatMessage> {
        self.messages.back()
    }

    /// Number of messages
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Check if empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Maximum length
    #[inline]
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for Transcript {
    fn default() -> Self {
        Self::new(Self::DEFAULT_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn oldest_messages_fall_off() {
        let mut transcript = Transcript::new(3);
        for n in 0..5 {
            transcript.push(ChatMessage::user(format!("m{n}")));
        }

        let texts: Vec<&str> = transcript.messages().map(|m| m.text.as_str()).collect();
        assert_eq!(texts, vec!["m2", "m3", "m4"]);
    }

    #[test]
    fn constructors_set_role() {
        assert_eq!(ChatMessage::assistant("hi").role, Role::Assistant);
        assert_eq!(ChatMessage::system("ready").role, Role::System);
        assert_ne!(ChatMessage::user("a").id, ChatMessage::user("a").id);
    }
}
