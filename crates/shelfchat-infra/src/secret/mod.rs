//! Credential lookup.
//!
//! - `env`: reads the API key from an environment variable.

pub mod env;
