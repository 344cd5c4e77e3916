//! In-memory doubles shared by the unit tests of this crate.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use chrono::Utc;

use shelfchat_types::error::RepositoryError;
use shelfchat_types::llm::{CompletionRequest, LlmError, StopReason, StreamEvent};
use shelfchat_types::storage::KvEntry;

use crate::llm::provider::{EventStream, LlmProvider};
use crate::storage::kv_store::KvStore;

/// `KvStore` backed by a shared map. Clones see the same data.
#[derive(Clone, Default)]
pub struct MemoryKvStore {
    entries: Arc<Mutex<HashMap<String, KvEntry>>>,
}

impl MemoryKvStore {
    pub fn raw(&self, key: &str) -> Option<serde_json::Value> {
        self.entries.lock().unwrap().get(key).map(|e| e.value.clone())
    }

    pub fn put_raw(&self, key: &str, value: serde_json::Value) {
        let now = Utc::now();
        self.entries.lock().unwrap().insert(
            key.to_string(),
            KvEntry {
                key: key.to_string(),
                value,
                created_at: now,
                updated_at: now,
            },
        );
    }
}

impl KvStore for MemoryKvStore {
    async fn get(&self, key: &str) -> Result<Option<serde_json::Value>, RepositoryError> {
        Ok(self.raw(key))
    }

    async fn set(&self, key: &str, value: &serde_json::Value) -> Result<(), RepositoryError> {
        let now = Utc::now();
        let mut entries = self.entries.lock().unwrap();
        let created_at = entries.get(key).map(|e| e.created_at).unwrap_or(now);
        entries.insert(
            key.to_string(),
            KvEntry {
                key: key.to_string(),
                value: value.clone(),
                created_at,
                updated_at: now,
            },
        );
        Ok(())
    }

    async fn get_entry(&self, key: &str) -> Result<Option<KvEntry>, RepositoryError> {
        Ok(self.entries.lock().unwrap().get(key).cloned())
    }
}

/// One scripted step of a provider stream.
#[derive(Clone)]
pub enum Step {
    Text(&'static str),
    Usage(u32, u32),
    Finish(StopReason),
    Fail(&'static str),
    Done,
}

/// Provider that replays a fixed script and records what it was asked.
#[derive(Clone)]
pub struct ScriptedProvider {
    script: Vec<Step>,
    pub calls: Arc<AtomicUsize>,
    pub last_request: Arc<Mutex<Option<CompletionRequest>>>,
}

impl ScriptedProvider {
    pub fn new(script: Vec<Step>) -> Self {
        Self {
            script,
            calls: Arc::new(AtomicUsize::new(0)),
            last_request: Arc::new(Mutex::new(None)),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl LlmProvider for ScriptedProvider {
    fn name(&self) -> &str {
        "scripted"
    }

    fn stream(&self, request: CompletionRequest) -> EventStream {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_request.lock().unwrap() = Some(request);
        let script = self.script.clone();
        Box::pin(async_stream::stream! {
            for step in script {
                match step {
                    Step::Text(text) => {
                        yield Ok(StreamEvent::TextDelta { text: text.to_string() });
                    }
                    Step::Usage(input_tokens, output_tokens) => {
                        yield Ok(StreamEvent::Usage(shelfchat_types::llm::Usage {
                            input_tokens,
                            output_tokens,
                        }));
                    }
                    Step::Finish(stop_reason) => {
                        yield Ok(StreamEvent::MessageDelta { stop_reason });
                    }
                    Step::Fail(message) => {
                        yield Err(LlmError::Stream(message.to_string()));
                        break;
                    }
                    Step::Done => {
                        yield Ok(StreamEvent::Done);
                    }
                }
            }
        })
    }
}
