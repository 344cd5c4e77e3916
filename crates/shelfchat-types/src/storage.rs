//! Key-value storage types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A record in the persistent key-value file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KvEntry {
    pub key: String,
    pub value: serde_json::Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
