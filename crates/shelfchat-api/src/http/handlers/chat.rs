//! SSE streaming chat endpoint.
//!
//! POST /api/v1/chat/stream `{ "message": "..." }`
//!
//! Runs one turn of the session and streams its progress as Server-Sent
//! Events:
//! - `user` - the appended user message
//! - `delta` - `{ "text": "<fragment>", "content": "<reply so far>" }`
//! - `error` - `{ "message": "..." }` for a failed completion; a `done`
//!   carrying the `[Error: ...]` reply follows
//! - `done` - `{ "message": <assistant message> }`
//! - `storage_error` - `{ "message": "..." }` when the history could not be
//!   saved; the stream ends without `done`
//!
//! Messages in `user` and `done` carry `role`, `content` and rendered `html`.

use std::convert::Infallible;
use std::time::Duration;

use axum::Json;
use axum::extract::State;
use axum::response::sse::{Event, KeepAlive, Sse};
use futures_util::{Stream, StreamExt, stream};
use serde::Deserialize;
use tokio::sync::{mpsc, oneshot};
use tokio_stream::wrappers::ReceiverStream;

use shelfchat_types::chat::TurnUpdate;
use shelfchat_types::error::ChatError;

use crate::http::error::AppError;
use crate::http::handlers::session::MessageView;
use crate::state::AppState;

/// Capacity of the per-turn update channel.
const UPDATE_BUFFER: usize = 64;

/// Request body for the streaming chat endpoint.
#[derive(Debug, Deserialize)]
pub struct StreamChatRequest {
    pub message: String,
}

/// Convert a turn update into its SSE event.
fn to_event(update: TurnUpdate) -> Event {
    let (name, data) = match update {
        TurnUpdate::User(message) => ("user", serde_json::json!(MessageView::from(&message))),
        TurnUpdate::Partial { delta, content } => (
            "delta",
            serde_json::json!({ "text": delta, "content": content }),
        ),
        TurnUpdate::Failed { error } => ("error", serde_json::json!({ "message": error })),
        TurnUpdate::Completed(message) => (
            "done",
            serde_json::json!({ "message": MessageView::from(&message) }),
        ),
    };
    Event::default().event(name).data(data.to_string())
}

/// Event sent when the finished turn could not be persisted.
fn storage_error_event(error: &ChatError) -> Event {
    Event::default()
        .event("storage_error")
        .data(serde_json::json!({ "message": error.to_string() }).to_string())
}

/// POST /api/v1/chat/stream - run one turn, stream its progress.
///
/// The turn runs in its own task: a client that disconnects mid-stream does
/// not cancel it, and the reply is still appended and persisted.
pub async fn stream_chat(
    State(state): State<AppState>,
    Json(body): Json<StreamChatRequest>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, AppError> {
    if body.message.is_empty() {
        return Err(AppError::Validation("message must not be empty".to_string()));
    }

    {
        let session = state.session.lock().await;
        if let Some(reason) = session.status().halted_reason() {
            return Err(ChatError::Halted(reason.to_string()).into());
        }
    }

    let (tx, rx) = mpsc::channel(UPDATE_BUFFER);
    let (failed_tx, failed_rx) = oneshot::channel();
    let session = state.session.clone();
    let prompt = body.message;

    tokio::spawn(async move {
        let mut session = session.lock().await;
        if let Err(e) = session.submit(&prompt, tx).await {
            tracing::error!(error = %e, "Chat turn failed");
            let _ = failed_tx.send(storage_error_event(&e));
        }
    });

    // `rx` ends once `submit` returns and drops its sender, so a storage
    // failure is always the last event.
    let failure = stream::once(failed_rx).filter_map(|sent| async move { sent.ok() });
    let events = ReceiverStream::new(rx)
        .map(to_event)
        .chain(failure)
        .map(Ok::<_, Infallible>);
    Ok(Sse::new(events).keep_alive(KeepAlive::new().interval(Duration::from_secs(15))))
}
