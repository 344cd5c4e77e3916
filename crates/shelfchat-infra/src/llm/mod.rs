//! LLM provider implementations.
//!
//! Contains the concrete [`LlmProvider`](shelfchat_core::llm::provider::LlmProvider)
//! used by the chat session: an OpenAI-compatible streaming provider built on
//! `async-openai`.

pub mod openai_compat;
