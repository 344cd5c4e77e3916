//! Infrastructure layer for shelfchat.
//!
//! Contains implementations of the ports defined in `shelfchat-core`:
//! the SQLite key-value file holding the chat history, the OpenAI-compatible
//! streaming provider, environment credential lookup, and config loading.

pub mod config;
pub mod filesystem;
pub mod llm;
pub mod secret;
pub mod sqlite;
