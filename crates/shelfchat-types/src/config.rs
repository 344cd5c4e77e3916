//! Configuration types for shelfchat.
//!
//! `ChatConfig` represents the optional `config.toml` in the data directory.
//! Every field has a default so an absent or empty file is valid.

use serde::{Deserialize, Serialize};

/// Top-level configuration.
///
/// Loaded from `~/.shelfchat/config.toml`. All fields have sensible defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatConfig {
    /// Model identifier sent with every completion request.
    #[serde(default = "default_model")]
    pub model: String,

    /// Name of the environment variable holding the API credential.
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    /// Override for the OpenAI-compatible base URL.
    #[serde(default)]
    pub base_url: Option<String>,

    /// Upper bound on reply tokens; provider default when unset.
    #[serde(default)]
    pub max_tokens: Option<u32>,

    /// Sampling temperature; provider default when unset.
    #[serde(default)]
    pub temperature: Option<f64>,

    /// Page title.
    #[serde(default = "default_title")]
    pub title: String,

    /// Placeholder text of the prompt input.
    #[serde(default = "default_input_placeholder")]
    pub input_placeholder: String,
}

fn default_model() -> String {
    "gpt-3.5-turbo".to_string()
}

fn default_api_key_env() -> String {
    "OPENAI_API_KEY".to_string()
}

fn default_title() -> String {
    "ChatGPT-like Chatbot Demo".to_string()
}

fn default_input_placeholder() -> String {
    "How can I help?".to_string()
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
            api_key_env: default_api_key_env(),
            base_url: None,
            max_tokens: None,
            temperature: None,
            title: default_title(),
            input_placeholder: default_input_placeholder(),
        }
    }
}
