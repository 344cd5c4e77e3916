//! Environment variable credential provider.
//!
//! The API key is read once at startup from the variable named by
//! `ChatConfig::api_key_env`. An unset, empty, or non-Unicode variable counts
//! as missing.

use secrecy::SecretString;

/// Reads credentials from the process environment.
pub struct EnvCredentialProvider;

impl EnvCredentialProvider {
    pub fn new() -> Self {
        Self
    }

    /// The credential stored in `var`, if any.
    pub fn get(&self, var: &str) -> Option<SecretString> {
        match std::env::var(var) {
            Ok(value) if !value.trim().is_empty() => Some(SecretString::from(value)),
            Ok(_) => {
                tracing::debug!(var, "Credential variable is empty");
                None
            }
            Err(std::env::VarError::NotPresent) => None,
            Err(std::env::VarError::NotUnicode(_)) => {
                tracing::warn!(var, "Credential variable is not valid Unicode, ignoring");
                None
            }
        }
    }
}

impl Default for EnvCredentialProvider {
    fn default() -> Self {
        Self::new()
    }
}

/// User-visible message shown when the credential is missing.
pub fn missing_credential_message(var: &str) -> String {
    format!("OpenAI API key not found. Set {var} in your environment.")
}
