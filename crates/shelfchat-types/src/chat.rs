//! Chat conversation types.
//!
//! A conversation is an ordered `Vec<Message>`; each message is tagged with
//! the speaker role. The same shape is persisted to the history file and sent
//! to the completion endpoint.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Speaker of a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    /// Avatar glyph shown next to messages of this role.
    pub fn avatar(&self) -> &'static str {
        match self {
            Role::User => "👤",
            Role::Assistant => "🤖",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::User => write!(f, "user"),
            Role::Assistant => write!(f, "assistant"),
        }
    }
}

/// One turn in the conversation.
///
/// Empty content and duplicates are allowed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Lifecycle state of the interactive session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum SessionStatus {
    /// Waiting for the next user prompt.
    Idle,
    /// A completion is streaming; no other turn can start.
    AwaitingCompletion,
    /// The session cannot talk to the model (e.g. missing credential).
    Halted { reason: String },
}

impl SessionStatus {
    pub fn is_halted(&self) -> bool {
        matches!(self, SessionStatus::Halted { .. })
    }

    pub fn halted_reason(&self) -> Option<&str> {
        match self {
            SessionStatus::Halted { reason } => Some(reason),
            _ => None,
        }
    }
}

/// Progress notifications emitted while a turn is processed.
///
/// Delivered in order over a channel so a UI can re-render after each step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TurnUpdate {
    /// The user's prompt was appended to the history.
    User(Message),
    /// A new fragment arrived; `content` is the accumulated reply so far.
    Partial { delta: String, content: String },
    /// The completion failed; the reply becomes the bracketed error text.
    Failed { error: String },
    /// The assistant message was appended and the history persisted.
    Completed(Message),
}

/// Summary of the persisted history record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistorySummary {
    pub message_count: usize,
    pub updated_at: Option<DateTime<Utc>>,
}
