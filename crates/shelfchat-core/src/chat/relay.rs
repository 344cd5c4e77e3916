//! Completion relay.
//!
//! Turns a conversation into a stream of reply text fragments by sending it
//! to an [`LlmProvider`] with streaming enabled. Usage and finish events are
//! logged, empty fragments are skipped, and the first provider error ends the
//! stream.

use std::pin::Pin;
use std::sync::Arc;

use futures_util::{Stream, StreamExt};

use shelfchat_types::chat::Message;
use shelfchat_types::error::RelayError;
use shelfchat_types::llm::{CompletionRequest, StopReason, StreamEvent};

use crate::llm::provider::LlmProvider;

/// Stream of reply fragments in arrival order.
pub type FragmentStream = Pin<Box<dyn Stream<Item = Result<String, RelayError>> + Send + 'static>>;

/// Sends the conversation to one provider and model.
#[derive(Clone)]
pub struct CompletionRelay {
    provider: Arc<dyn LlmProvider>,
    model: String,
    max_tokens: Option<u32>,
    temperature: Option<f64>,
}

impl CompletionRelay {
    pub fn new(provider: impl LlmProvider + 'static, model: impl Into<String>) -> Self {
        Self {
            provider: Arc::new(provider),
            model: model.into(),
            max_tokens: None,
            temperature: None,
        }
    }

    pub fn with_max_tokens(mut self, max_tokens: Option<u32>) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn with_temperature(mut self, temperature: Option<f64>) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    /// Streaming request carrying the full conversation, in order.
    pub fn build_request(&self, messages: &[Message]) -> CompletionRequest {
        CompletionRequest {
            model: self.model.clone(),
            messages: messages.to_vec(),
            max_tokens: self.max_tokens,
            temperature: self.temperature,
            stream: true,
        }
    }

    /// Reply fragments for `messages`.
    ///
    /// Ends after the provider's `Done` or after the first error, which is
    /// yielded as the final item.
    pub fn fragments(&self, messages: &[Message]) -> FragmentStream {
        let mut events = self.provider.stream(self.build_request(messages));

        Box::pin(async_stream::stream! {
            while let Some(event) = events.next().await {
                match event {
                    Ok(StreamEvent::TextDelta { text }) => {
                        if !text.is_empty() {
                            yield Ok(text);
                        }
                    }
                    Ok(StreamEvent::Usage(usage)) => {
                        tracing::debug!(
                            input_tokens = usage.input_tokens,
                            output_tokens = usage.output_tokens,
                            "Completion usage"
                        );
                    }
                    Ok(StreamEvent::MessageDelta { stop_reason }) => match stop_reason {
                        StopReason::EndTurn => {}
                        StopReason::MaxTokens | StopReason::ContentFilter => {
                            tracing::warn!(%stop_reason, "Reply was cut short by the provider");
                        }
                    },
                    Ok(StreamEvent::Done) => break,
                    Err(e) => {
                        yield Err(RelayError::from(e));
                        break;
                    }
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{ScriptedProvider, Step};
    use shelfchat_types::llm::FailureKind;

    async fn collect(stream: FragmentStream) -> Vec<Result<String, RelayError>> {
        stream.collect().await
    }

    #[tokio::test]
    async fn test_fragments_in_order() {
        let provider = ScriptedProvider::new(vec![Step::Text("Hel"), Step::Text("lo"), Step::Done]);
        let relay = CompletionRelay::new(provider, "gpt-3.5-turbo");

        let items = collect(relay.fragments(&[Message::user("Hi")])).await;
        let texts: Vec<String> = items.into_iter().map(|r| r.unwrap()).collect();
        assert_eq!(texts, vec!["Hel", "lo"]);
    }

    #[tokio::test]
    async fn test_empty_fragments_and_usage_are_skipped() {
        let provider = ScriptedProvider::new(vec![
            Step::Text(""),
            Step::Text("A"),
            Step::Usage(10, 1),
            Step::Text(""),
            Step::Done,
        ]);
        let relay = CompletionRelay::new(provider, "gpt-3.5-turbo");

        let items = collect(relay.fragments(&[])).await;
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].as_ref().unwrap(), "A");
    }

    #[tokio::test]
    async fn test_truncated_reply_keeps_fragments() {
        let provider = ScriptedProvider::new(vec![
            Step::Text("cut"),
            Step::Finish(StopReason::MaxTokens),
            Step::Done,
        ]);
        let relay = CompletionRelay::new(provider, "gpt-3.5-turbo");

        let items = collect(relay.fragments(&[])).await;
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].as_ref().unwrap(), "cut");
    }

    #[tokio::test]
    async fn test_zero_fragments() {
        let provider = ScriptedProvider::new(vec![Step::Done]);
        let relay = CompletionRelay::new(provider, "gpt-3.5-turbo");

        assert!(collect(relay.fragments(&[])).await.is_empty());
    }

    #[tokio::test]
    async fn test_error_ends_stream() {
        let provider = ScriptedProvider::new(vec![
            Step::Text("par"),
            Step::Fail("connection reset"),
            Step::Text("never"),
        ]);
        let relay = CompletionRelay::new(provider, "gpt-3.5-turbo");

        let items = collect(relay.fragments(&[])).await;
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].as_ref().unwrap(), "par");
        let err = items[1].as_ref().unwrap_err();
        assert_eq!(err.kind, FailureKind::Transport);
        assert_eq!(err.reply_text(), "[Error: stream error: connection reset]");
    }

    #[tokio::test]
    async fn test_request_carries_whole_conversation() {
        let provider = ScriptedProvider::new(vec![Step::Done]);
        let relay = CompletionRelay::new(provider.clone(), "gpt-4o-mini")
            .with_max_tokens(Some(256))
            .with_temperature(Some(0.5));
        let conversation = vec![
            Message::user("one"),
            Message::assistant("two"),
            Message::user("three"),
        ];

        let _ = collect(relay.fragments(&conversation)).await;

        let request = provider.last_request.lock().unwrap().clone().unwrap();
        assert_eq!(request.model, "gpt-4o-mini");
        assert_eq!(request.messages, conversation);
        assert_eq!(request.max_tokens, Some(256));
        assert!(request.stream);
        assert_eq!(relay.model(), "gpt-4o-mini");
        assert_eq!(relay.provider_name(), "scripted");
    }
}
