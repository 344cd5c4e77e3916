//! Shared domain types for shelfchat.
//!
//! This crate contains the types used across the workspace: chat messages,
//! LLM request/stream shapes, configuration, and the error enums.
//!
//! Zero infrastructure dependencies -- only serde, chrono, thiserror.

pub mod chat;
pub mod config;
pub mod error;
pub mod llm;
pub mod storage;
