//! LLM provider abstraction.
//!
//! `LlmProvider` is implemented by concrete backends in shelfchat-infra
//! (e.g. `OpenAiCompatibleProvider`).

pub mod provider;
