//! Conversation history persistence.
//!
//! The whole conversation is stored as one JSON array under a fixed key of
//! the key-value file. There is no versioning and no corruption recovery: a
//! record that does not decode is reported as [`HistoryError::Corrupt`].

use shelfchat_types::chat::{HistorySummary, Message};
use shelfchat_types::error::HistoryError;

use crate::storage::kv_store::KvStore;

/// Key under which the message sequence is stored.
pub const HISTORY_KEY: &str = "messages";

/// Loads and saves the conversation through a [`KvStore`].
pub struct HistoryStore<K> {
    store: K,
}

impl<K: KvStore> HistoryStore<K> {
    pub fn new(store: K) -> Self {
        Self { store }
    }

    /// Last persisted sequence, or empty if nothing was ever saved.
    pub async fn load(&self) -> Result<Vec<Message>, HistoryError> {
        match self.store.get(HISTORY_KEY).await? {
            Some(value) => decode(value),
            None => Ok(Vec::new()),
        }
    }

    /// Overwrite the persisted sequence.
    pub async fn save(&self, messages: &[Message]) -> Result<(), HistoryError> {
        let value = serde_json::to_value(messages)
            .map_err(|e| HistoryError::Corrupt(format!("failed to encode history: {e}")))?;
        self.store.set(HISTORY_KEY, &value).await?;
        tracing::debug!(count = messages.len(), "Saved chat history");
        Ok(())
    }

    /// Persist the empty sequence.
    pub async fn clear(&self) -> Result<(), HistoryError> {
        self.save(&[]).await
    }

    /// Message count and last write time of the persisted record.
    pub async fn summary(&self) -> Result<HistorySummary, HistoryError> {
        match self.store.get_entry(HISTORY_KEY).await? {
            Some(entry) => {
                let messages = decode(entry.value)?;
                Ok(HistorySummary {
                    message_count: messages.len(),
                    updated_at: Some(entry.updated_at),
                })
            }
            None => Ok(HistorySummary {
                message_count: 0,
                updated_at: None,
            }),
        }
    }
}

fn decode(value: serde_json::Value) -> Result<Vec<Message>, HistoryError> {
    serde_json::from_value(value).map_err(|e| HistoryError::Corrupt(e.to_string()))
}
