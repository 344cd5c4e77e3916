//! Session controller.
//!
//! Owns the in-memory conversation for the single user and drives one turn at
//! a time: append the prompt, stream the reply through the
//! [`CompletionRelay`], append the reply (or the error text), persist.
//! Progress is reported over a bounded channel so the caller can re-render
//! while the reply streams in.

use futures_util::StreamExt;
use tokio::sync::mpsc;

use shelfchat_types::chat::{Message, SessionStatus, TurnUpdate};
use shelfchat_types::error::{ChatError, HistoryError};

use super::history::HistoryStore;
use super::relay::CompletionRelay;
use crate::storage::kv_store::KvStore;

/// The interactive session.
pub struct SessionController<K> {
    history: HistoryStore<K>,
    relay: Option<CompletionRelay>,
    model: String,
    messages: Vec<Message>,
    status: SessionStatus,
}

impl<K: KvStore> SessionController<K> {
    /// Start a session, loading the persisted conversation.
    pub async fn start(history: HistoryStore<K>, relay: CompletionRelay) -> Result<Self, HistoryError> {
        let messages = history.load().await?;
        tracing::info!(
            model = %relay.model(),
            provider = %relay.provider_name(),
            messages = messages.len(),
            "Session started"
        );
        Ok(Self {
            model: relay.model().to_string(),
            history,
            relay: Some(relay),
            messages,
            status: SessionStatus::Idle,
        })
    }

    /// A session that cannot reach the model.
    ///
    /// History is not loaded and every mutating call fails with
    /// [`ChatError::Halted`].
    pub fn halted(history: HistoryStore<K>, model: impl Into<String>, reason: impl Into<String>) -> Self {
        let reason = reason.into();
        tracing::warn!(%reason, "Session halted");
        Self {
            history,
            relay: None,
            model: model.into(),
            messages: Vec::new(),
            status: SessionStatus::Halted { reason },
        }
    }

    pub fn status(&self) -> &SessionStatus {
        &self.status
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn history(&self) -> &HistoryStore<K> {
        &self.history
    }

    fn ensure_running(&self) -> Result<&CompletionRelay, ChatError> {
        match (&self.status, &self.relay) {
            (SessionStatus::Halted { reason }, _) => Err(ChatError::Halted(reason.clone())),
            (_, Some(relay)) => Ok(relay),
            (_, None) => Err(ChatError::Halted("no completion provider configured".to_string())),
        }
    }

    /// Empty the conversation and persist the empty sequence.
    pub async fn clear(&mut self) -> Result<(), ChatError> {
        self.ensure_running()?;
        self.messages.clear();
        self.history.clear().await?;
        tracing::info!("Chat history deleted");
        Ok(())
    }

    /// Run one turn for `prompt` and return the appended assistant message.
    ///
    /// Every turn appends exactly two messages. A relay failure is not an
    /// error of this call: its text becomes the assistant message. Only a
    /// persistence failure is returned as `Err`.
    ///
    /// A closed `updates` receiver is ignored; the turn still completes.
    #[tracing::instrument(
        name = "chat",
        skip_all,
        fields(
            gen_ai.operation.name = "chat",
            gen_ai.request.model = %self.model,
            gen_ai.provider.name = tracing::field::Empty,
            prompt_len = prompt.len(),
        )
    )]
    pub async fn submit(
        &mut self,
        prompt: &str,
        updates: mpsc::Sender<TurnUpdate>,
    ) -> Result<Message, ChatError> {
        let relay = self.ensure_running()?.clone();
        tracing::Span::current().record("gen_ai.provider.name", relay.provider_name());

        let user = Message::user(prompt);
        self.messages.push(user.clone());
        let _ = updates.send(TurnUpdate::User(user)).await;

        self.status = SessionStatus::AwaitingCompletion;
        let mut fragments = relay.fragments(&self.messages);
        let mut content = String::new();

        while let Some(fragment) = fragments.next().await {
            match fragment {
                Ok(delta) => {
                    content.push_str(&delta);
                    let _ = updates
                        .send(TurnUpdate::Partial {
                            delta,
                            content: content.clone(),
                        })
                        .await;
                }
                Err(e) => {
                    tracing::warn!(kind = %e.kind, error = %e, "Completion failed");
                    let _ = updates
                        .send(TurnUpdate::Failed {
                            error: e.to_string(),
                        })
                        .await;
                    content = e.reply_text();
                    break;
                }
            }
        }

        let reply = Message::assistant(content);
        self.messages.push(reply.clone());
        self.status = SessionStatus::Idle;
        self.history.save(&self.messages).await?;

        tracing::debug!(reply_len = reply.content.len(), "Turn completed");
        let _ = updates.send(TurnUpdate::Completed(reply.clone())).await;
        Ok(reply)
    }
}
