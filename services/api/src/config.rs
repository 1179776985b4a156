//! services/api/src/config.rs
//!
//! Defines the application's configuration structure and loading logic.
//!
//! All configuration is loaded from environment variables at startup. The `.env`
//! file is used for local development. Missing API keys never abort startup;
//! they switch the corresponding feature off.

use std::net::SocketAddr;
use tracing::Level;

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for the environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Holds all configuration loaded from the environment at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub bind_address: SocketAddr,
    pub log_level: Level,
    pub cors_origin: String,

    pub inference_base_url: String,
    pub inference_api_token: Option<String>,
    pub sentiment_model: String,
    pub toxicity_model: String,
    pub toxic_label: String,

    pub gemini_api_key: Option<String>,
    pub gemini_base_url: String,
    pub chat_model: String,

    pub session_secret: Option<String>,

    pub web3_storage_token: Option<String>,
    pub web3_storage_url: String,
    pub ipfs_gateway_domain: String,
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// It will look for a `.env` file in the current directory for development,
    /// but this is skipped in test environments to ensure tests are hermetic.
    pub fn from_env() -> Result<Self, ConfigError> {
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var_or = |key: &str, default: &str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_else(|| default.to_string())
        };
        let optional = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        // --- Server Settings ---
        let bind_address_str = var_or("BIND_ADDRESS", "0.0.0.0:5000");
        let bind_address = bind_address_str.parse::<SocketAddr>().map_err(|e| {
            ConfigError::InvalidValue("BIND_ADDRESS".to_string(), e.to_string())
        })?;

        let log_level_str = var_or("RUST_LOG", "INFO");
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        let cors_origin = var_or("CORS_ORIGIN", "http://localhost:5000");

        // --- Classifier Settings ---
        let inference_base_url = var_or(
            "INFERENCE_BASE_URL",
            "https://api-inference.huggingface.co",
        );
        let inference_api_token = optional("INFERENCE_API_TOKEN");
        let sentiment_model = var_or(
            "SENTIMENT_MODEL",
            "cardiffnlp/twitter-roberta-base-sentiment-latest",
        );
        let toxicity_model = var_or("TOXICITY_MODEL", "unitary/toxic-bert");
        let toxic_label = var_or("TOXIC_LABEL", "toxic");

        // --- Chat Settings ---
        let gemini_api_key = optional("GEMINI_API_KEY");
        let gemini_base_url = var_or(
            "GEMINI_BASE_URL",
            "https://generativelanguage.googleapis.com",
        );
        let chat_model = var_or("CHAT_MODEL", "gemini-2.0-flash");

        // --- Session and Archive Settings ---
        let session_secret = optional("SESSION_SECRET");
        let web3_storage_token = optional("WEB3_STORAGE_TOKEN");
        let web3_storage_url = var_or("WEB3_STORAGE_URL", "https://api.web3.storage");
        let ipfs_gateway_domain = var_or("IPFS_GATEWAY_DOMAIN", "ipfs.w3s.link");

        Ok(Self {
            bind_address,
            log_level,
            cors_origin,
            inference_base_url,
            inference_api_token,
            sentiment_model,
            toxicity_model,
            toxic_label,
            gemini_api_key,
            gemini_base_url,
            chat_model,
            session_secret,
            web3_storage_token,
            web3_storage_url,
            ipfs_gateway_domain,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_apply_when_nothing_is_set() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.bind_address.port(), 5000);
        assert_eq!(config.log_level, Level::INFO);
        assert_eq!(config.chat_model, "gemini-2.0-flash");
        assert_eq!(config.toxic_label, "toxic");
        assert!(config.gemini_api_key.is_none());
        assert!(config.web3_storage_token.is_none());
        assert!(config.session_secret.is_none());
    }

    #[test]
    fn blank_keys_count_as_missing() {
        let config = config_from(&[("GEMINI_API_KEY", "  "), ("WEB3_STORAGE_TOKEN", "tok")]).unwrap();
        assert!(config.gemini_api_key.is_none());
        assert_eq!(config.web3_storage_token.as_deref(), Some("tok"));
    }

    #[test]
    fn invalid_bind_address_is_rejected() {
        let err = config_from(&[("BIND_ADDRESS", "not-an-addr")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue(ref var, _) if var == "BIND_ADDRESS"));
    }

    #[test]
    fn invalid_log_level_is_rejected() {
        let err = config_from(&[("RUST_LOG", "chatty")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue(ref var, _) if var == "RUST_LOG"));
    }
}
