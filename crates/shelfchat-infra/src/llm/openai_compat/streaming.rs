//! OpenAI SSE stream to [`StreamEvent`] adapter.
//!
//! Maps `async-openai` chat-completion chunks to the provider-agnostic
//! [`StreamEvent`] enum. Only content deltas, finish reasons and usage are
//! of interest; role-only chunks produce nothing.

use std::pin::Pin;

use async_openai::error::OpenAIError;
use async_openai::types::chat::{CreateChatCompletionStreamResponse, FinishReason};
use futures_util::{Stream, StreamExt};

use shelfchat_types::llm::{LlmError, StopReason, StreamEvent, Usage};

use super::map_openai_error;

/// Map an OpenAI chunk stream to a stream of [`StreamEvent`]s.
///
/// Per chunk: `Usage` if present, a
/// `TextDelta` for non-empty content, `MessageDelta` on a finish reason.
/// Ends with `Done` once the upstream stream is exhausted. The first
/// upstream error is yielded and ends the stream.
pub fn map_openai_stream<S>(
    stream: S,
) -> Pin<Box<dyn Stream<Item = Result<StreamEvent, LlmError>> + Send + 'static>>
where
    S: Stream<Item = Result<CreateChatCompletionStreamResponse, OpenAIError>> + Send + 'static,
{
    Box::pin(async_stream::try_stream! {
        let mut stream = Box::pin(stream);
        while let Some(result) = stream.next().await {
            let chunk = result.map_err(map_openai_error)?;

            // Final chunk when `include_usage` is set: usage with empty choices.
            if let Some(usage) = chunk.usage {
                yield StreamEvent::Usage(Usage {
                    input_tokens: usage.prompt_tokens,
                    output_tokens: usage.completion_tokens,
                });
            }

            for choice in chunk.choices {
                if let Some(text) = choice.delta.content {
                    if !text.is_empty() {
                        yield StreamEvent::TextDelta { text };
                    }
                }

                if let Some(finish_reason) = choice.finish_reason {
                    yield StreamEvent::MessageDelta {
                        stop_reason: stop_reason(finish_reason),
                    };
                }
            }
        }

        yield StreamEvent::Done;
    })
}

fn stop_reason(finish_reason: FinishReason) -> StopReason {
    match finish_reason {
        FinishReason::Stop => StopReason::EndTurn,
        FinishReason::Length => StopReason::MaxTokens,
        FinishReason::ContentFilter => StopReason::ContentFilter,
        // No tools are offered, so a tool-call finish ends the turn as usual.
        FinishReason::ToolCalls | FinishReason::FunctionCall => StopReason::EndTurn,
    }
}
