//! Configuration loading for shelfchat.
//!
//! Reads `config.toml` from the data directory and falls back to defaults
//! when the file is missing or invalid.

use std::path::Path;

use shelfchat_types::config::ChatConfig;

/// File name of the configuration file inside the data directory.
pub const CONFIG_FILE: &str = "config.toml";

/// Load `ChatConfig` from `{data_dir}/config.toml`.
///
/// A missing file yields the defaults silently; an unreadable or malformed
/// file yields the defaults with a warning.
pub async fn load_chat_config(data_dir: &Path) -> ChatConfig {
    let config_path = data_dir.join(CONFIG_FILE);

    let content = match tokio::fs::read_to_string(&config_path).await {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!("No config.toml found at {}, using defaults", config_path.display());
            return ChatConfig::default();
        }
        Err(err) => {
            tracing::warn!("Failed to read {}: {err}, using defaults", config_path.display());
            return ChatConfig::default();
        }
    };

    match toml::from_str::<ChatConfig>(&content) {
        Ok(config) => config,
        Err(err) => {
            tracing::warn!(
                "Failed to parse {}: {err}, using defaults",
                config_path.display()
            );
            ChatConfig::default()
        }
    }
}
