//! SQLite storage layer.
//!
//! The chat history lives in a single SQLite file with WAL mode and split
//! read/write connection pools.

pub mod kv;
pub mod pool;
