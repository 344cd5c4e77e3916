//! Session logic and port definitions for shelfchat.
//!
//! This crate defines the "ports" (storage and LLM provider traits) that the
//! infrastructure layer implements, plus the chat session built on top of
//! them. It depends only on `shelfchat-types` -- never on `shelfchat-infra`
//! or any database/IO crate.

pub mod chat;
pub mod llm;
pub mod storage;

#[cfg(test)]
pub(crate) mod testing;
