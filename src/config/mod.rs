// Configuration module
// Author: kelexine (https://github.com/kelexine)

mod models;

pub use models::*;

use crate::error::{GatewayError, Result};
use config::{Config, Environment, File};
use std::path::{Path, PathBuf};

impl AppConfig {
    /// Load configuration from multiple sources with precedence:
    /// 1. `GEMINI_API_KEY` and `PORT` (highest)
    /// 2. Environment variables prefixed `GEMINI_GATEWAY__`
    /// 3. Config file (`path`, or `~/.gemini-gateway/config.toml`)
    /// 4. Defaults (lowest)
    ///
    /// CLI overrides are applied by the binary on top of the result.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let file = path
            .map(Path::to_path_buf)
            .unwrap_or_else(Self::default_config_path);

        let config = Config::builder()
            // Start with defaults
            .add_source(Config::try_from(&Self::default())?)
            // Load from config file if it exists
            .add_source(File::from(file).required(false))
            // Override with environment variables (e.g. GEMINI_GATEWAY__SERVER__HOST)
            .add_source(
                Environment::with_prefix("GEMINI_GATEWAY")
                    .separator("__")
            )
            .set_override_option("gemini.api_key", std::env::var("GEMINI_API_KEY").ok())?
            .set_override_option("server.port", std::env::var("PORT").ok())?
            .build()
            .map_err(|e| GatewayError::Config(e.to_string()))?;

        config
            .try_deserialize()
            .map_err(|e| GatewayError::Config(e.to_string()))
    }

    /// Reject configurations the server cannot start with.
    pub fn validate(&self) -> Result<()> {
        if self.gemini.api_key.trim().is_empty() {
            return Err(GatewayError::Config(
                "GEMINI_API_KEY is not set".to_string(),
            ));
        }
        if self.gemini.model.trim().is_empty() {
            return Err(GatewayError::Config("gemini.model must not be empty".to_string()));
        }
        if self.server.max_upload_bytes == 0 {
            return Err(GatewayError::Config(
                "server.max_upload_bytes must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    fn default_config_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".gemini-gateway")
            .join("config.toml")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.server.port, 3001);
        assert_eq!(config.gemini.model, "gemini-2.5-flash");
        assert_eq!(config.server.max_upload_bytes, 20 * 1024 * 1024);
        assert!(config.gemini.timeout_seconds.is_none());
    }

    #[test]
    fn test_missing_api_key_is_rejected() {
        let config = AppConfig::default();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("GEMINI_API_KEY"));
    }

    #[test]
    fn test_valid_config_passes() {
        let mut config = AppConfig::default();
        config.gemini.api_key = "AIzaTestKey".to_string();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_api_key_is_not_serialized_or_printed() {
        let mut config = AppConfig::default();
        config.gemini.api_key = "AIzaSecretValue".to_string();

        let json = serde_json::to_string(&config).unwrap();
        assert!(!json.contains("AIzaSecretValue"));

        let debug = format!("{:?}", config);
        assert!(!debug.contains("AIzaSecretValue"));
        assert!(debug.contains("[REDACTED]"));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gateway.toml");
        std::fs::write(
            &path,
            "[server]\nhost = \"127.0.0.1\"\n\n[gemini]\nmodel = \"gemini-2.5-pro\"\n",
        )
        .unwrap();

        let config = AppConfig::load(Some(&path)).unwrap();
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.gemini.model, "gemini-2.5-pro");
    }
}
