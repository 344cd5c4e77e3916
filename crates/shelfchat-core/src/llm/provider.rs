//! LlmProvider trait definition.
//!
//! The only operation the chat needs is a streamed completion, so the trait
//! is object-safe and the relay holds an `Arc<dyn LlmProvider>`.

use std::pin::Pin;

use futures_util::Stream;

use shelfchat_types::llm::{CompletionRequest, LlmError, StreamEvent};

/// Boxed stream of provider events.
pub type EventStream = Pin<Box<dyn Stream<Item = Result<StreamEvent, LlmError>> + Send + 'static>>;

/// Trait for LLM provider backends.
///
/// Implementations live in shelfchat-infra (e.g., `OpenAiCompatibleProvider`).
pub trait LlmProvider: Send + Sync {
    /// Human-readable provider name (e.g., "openai").
    fn name(&self) -> &str;

    /// Send a streaming completion request. Returns a stream of events that
    /// ends after `StreamEvent::Done` or the first error.
    fn stream(&self, request: CompletionRequest) -> EventStream;
}
