//! Configuration for the OpenAI-compatible provider.

use secrecy::SecretString;

use shelfchat_types::config::ChatConfig;

/// Default endpoint of the hosted OpenAI API.
pub const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

/// Connection settings for an [`super::OpenAiCompatibleProvider`].
///
/// Does not derive Debug; the API key must never end up in logs.
pub struct OpenAiCompatConfig {
    /// Provider name reported in logs and spans.
    pub provider_name: String,
    /// Base URL of the chat-completions API.
    pub base_url: String,
    pub api_key: SecretString,
}

/// Hosted OpenAI at [`OPENAI_BASE_URL`].
pub fn openai_defaults(api_key: SecretString) -> OpenAiCompatConfig {
    OpenAiCompatConfig {
        provider_name: "openai".into(),
        base_url: OPENAI_BASE_URL.into(),
        api_key,
    }
}

/// Settings derived from the chat configuration.
///
/// A configured `base_url` points the provider at any OpenAI-compatible
/// endpoint; the name then becomes `openai_compatible`.
pub fn from_chat_config(config: &ChatConfig, api_key: SecretString) -> OpenAiCompatConfig {
    match config.base_url.as_deref() {
        Some(base_url) if !base_url.trim().is_empty() => OpenAiCompatConfig {
            provider_name: "openai_compatible".into(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        },
        _ => openai_defaults(api_key),
    }
}
