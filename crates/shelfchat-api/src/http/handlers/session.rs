//! GET /api/v1/session - snapshot of the chat session.

use std::time::Instant;

use axum::extract::State;
use serde::Serialize;

use shelfchat_core::chat::history::HistoryStore;
use shelfchat_infra::sqlite::kv::SqliteKvStore;
use shelfchat_types::chat::{Message, Role, SessionStatus};

use crate::http::error::AppError;
use crate::http::markdown::render_markdown;
use crate::http::response::ApiResponse;
use crate::state::AppState;

/// A message as the page shows it: the raw text plus its rendered HTML.
#[derive(Debug, Serialize)]
pub struct MessageView {
    pub role: Role,
    pub content: String,
    pub html: String,
}

impl From<&Message> for MessageView {
    fn from(message: &Message) -> Self {
        Self {
            role: message.role,
            content: message.content.clone(),
            html: render_markdown(&message.content),
        }
    }
}

/// What the page needs to render the conversation.
#[derive(Debug, Serialize)]
pub struct SessionView {
    pub title: String,
    pub model: String,
    pub input_placeholder: String,
    /// `idle`, `awaiting_completion` or `halted`.
    pub status: &'static str,
    pub halted_reason: Option<String>,
    pub messages: Vec<MessageView>,
}

fn status_label(status: &SessionStatus) -> &'static str {
    match status {
        SessionStatus::Idle => "idle",
        SessionStatus::AwaitingCompletion => "awaiting_completion",
        SessionStatus::Halted { .. } => "halted",
    }
}

/// GET /api/v1/session
///
/// Never waits on a running turn. While one holds the session the answer is
/// `awaiting_completion` with the last persisted history, which does not yet
/// include the turn in flight.
pub async fn get_session(
    State(state): State<AppState>,
) -> Result<ApiResponse<SessionView>, AppError> {
    let start = Instant::now();

    let (model, status, halted_reason, messages) = match state.session.try_lock() {
        Ok(session) => (
            session.model().to_string(),
            status_label(session.status()),
            session.status().halted_reason().map(str::to_string),
            session.messages().to_vec(),
        ),
        Err(_) => {
            let history = HistoryStore::new(SqliteKvStore::new(state.db_pool.clone()));
            (
                state.config.model.clone(),
                status_label(&SessionStatus::AwaitingCompletion),
                None,
                history.load().await?,
            )
        }
    };

    let view = SessionView {
        title: state.config.title.clone(),
        model,
        input_placeholder: state.config.input_placeholder.clone(),
        status,
        halted_reason,
        messages: messages.iter().map(MessageView::from).collect(),
    };

    Ok(ApiResponse::timed(view, start))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_label() {
        assert_eq!(status_label(&SessionStatus::Idle), "idle");
        assert_eq!(
            status_label(&SessionStatus::AwaitingCompletion),
            "awaiting_completion"
        );
        assert_eq!(
            status_label(&SessionStatus::Halted {
                reason: "x".into()
            }),
            "halted"
        );
    }

    #[test]
    fn test_message_view_renders_markdown() {
        let view = MessageView::from(&Message::assistant("Use `cargo` **now**"));
        assert_eq!(view.role, Role::Assistant);
        assert_eq!(view.content, "Use `cargo` **now**");
        assert!(view.html.contains("<code>cargo</code>"));
        assert!(view.html.contains("<strong>now</strong>"));
    }
}
