use thiserror::Error;

use crate::llm::{FailureKind, LlmError};

/// Errors from repository operations (used by trait definitions in shelfchat-core).
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("query error: {0}")]
    Query(String),
}

/// Errors from loading or saving the conversation history.
#[derive(Debug, Error)]
pub enum HistoryError {
    #[error("history storage error: {0}")]
    Storage(#[from] RepositoryError),

    #[error("history record is corrupt: {0}")]
    Corrupt(String),
}

/// A completion that failed mid-flight.
///
/// Keeps the provider error and its classification; the display text is the
/// provider error itself so it can be shown verbatim to the user.
#[derive(Debug, Error)]
#[error("{source}")]
pub struct RelayError {
    pub kind: FailureKind,
    #[source]
    pub source: LlmError,
}

impl From<LlmError> for RelayError {
    fn from(source: LlmError) -> Self {
        Self {
            kind: source.kind(),
            source,
        }
    }
}

impl RelayError {
    /// Text stored as the assistant reply when the relay fails.
    pub fn reply_text(&self) -> String {
        format!("[Error: {self}]")
    }
}

/// Errors surfaced by the session controller.
#[derive(Debug, Error)]
pub enum ChatError {
    #[error("{0}")]
    Halted(String),

    #[error(transparent)]
    History(#[from] HistoryError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repository_error_display() {
        let err = RepositoryError::Query("syntax error".to_string());
        assert_eq!(err.to_string(), "query error: syntax error");
    }

    #[test]
    fn test_history_error_from_repository() {
        let err: HistoryError = RepositoryError::Query("disk I/O error".to_string()).into();
        assert_eq!(
            err.to_string(),
            "history storage error: query error: disk I/O error"
        );
    }

    #[test]
    fn test_relay_error_reply_text_wraps_provider_message() {
        let err = RelayError::from(LlmError::Transport("connection reset".to_string()));
        assert_eq!(err.kind, FailureKind::Transport);
        assert_eq!(err.reply_text(), "[Error: transport error: connection reset]");
    }

    #[test]
    fn test_chat_error_halted_display() {
        let err = ChatError::Halted("OpenAI API key not found".to_string());
        assert_eq!(err.to_string(), "OpenAI API key not found");
    }
}
