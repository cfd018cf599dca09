//! Turn and ConversationSession domain types.
//!
//! A session is the process-lifetime history of one conversation:
//! user types a line → the turn is appended → the assistant replies → the
//! reply is appended. Turns are append-only and keep insertion order.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a conversation session.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub String);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The role of a turn's author.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// The end user
    User,
    /// The assistant
    Assistant,
    /// System instructions
    System,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
            Role::System => "system",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single role-tagged message in a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Turn {
    /// Creation order within the session, starting at 0
    pub seq: u64,

    /// Who wrote this turn
    pub role: Role,

    /// The text content
    pub content: String,

    /// Timestamp
    pub timestamp: DateTime<Utc>,
}

impl Turn {
    /// Render as a `role: content` line.
    pub fn render(&self) -> String {
        format!("{}: {}", self.role, self.content)
    }
}

/// Ordered, append-only conversation history.
///
/// There is no removal operation. Composition may leave old turns out of a
/// prompt, but that never touches the session itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationSession {
    /// Unique session ID
    pub id: SessionId,

    turns: Vec<Turn>,

    /// When this session was created
    pub created_at: DateTime<Utc>,

    /// When the last turn was appended
    pub updated_at: DateTime<Utc>,
}

impl ConversationSession {
    /// Create a new empty session.
    pub fn new() -> Self {
        let now = Utc::now();
        Self {
            id: SessionId::new(),
            turns: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Append a user turn.
    pub fn append_user(&mut self, content: impl Into<String>) -> &Turn {
        self.append(Role::User, content.into())
    }

    /// Append an assistant turn.
    pub fn append_assistant(&mut self, content: impl Into<String>) -> &Turn {
        self.append(Role::Assistant, content.into())
    }

    /// Append a system turn (e.g. a note the console wants kept in history).
    pub fn append_system(&mut self, content: impl Into<String>) -> &Turn {
        self.append(Role::System, content.into())
    }

    fn append(&mut self, role: Role, content: String) -> &Turn {
        let now = Utc::now();
        self.updated_at = now;
        let seq = self.turns.len() as u64;
        self.turns.push(Turn {
            seq,
            role,
            content,
            timestamp: now,
        });
        &self.turns[self.turns.len() - 1]
    }

    /// Read-only view of the history, in insertion order.
    pub fn history(&self) -> &[Turn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// The most recent turn, if any.
    pub fn last(&self) -> Option<&Turn> {
        self.turns.last()
    }
}

impl Default for ConversationSession {
    fn default() -> Self {
        Self::new()
    }
}
