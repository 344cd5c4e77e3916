//! Storage abstractions for shelfchat.
//!
//! Implementations live in shelfchat-infra.

pub mod kv_store;
