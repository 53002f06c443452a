//! Configuration data structures for the gateway.
//!
//! This module defines the schema for the application settings: the HTTP
//! server, the upstream Gemini API, and logging.
//!
//! Author: kelexine (<https://github.com/kelexine>)

use serde::{Deserialize, Serialize};
use std::fmt;

/// The root configuration object for the application.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    /// HTTP server settings (host, port, uploads).
    #[serde(default)]
    pub server: ServerConfig,

    /// Upstream Gemini API settings.
    #[serde(default)]
    pub gemini: GeminiConfig,

    /// Logging and observability settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Settings for the built-in HTTP server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// The IP address or hostname the server should bind to.
    /// Default: `0.0.0.0`
    #[serde(default = "default_host")]
    pub host: String,

    /// The port number the server should listen on.
    /// Default: `3001`
    #[serde(default = "default_port")]
    pub port: u16,

    /// Directory uploaded files are spooled into while a request is in flight.
    /// Default: `<system temp dir>/gemini-gateway-uploads`
    #[serde(default = "default_upload_dir")]
    pub upload_dir: String,

    /// Maximum accepted request body size in bytes.
    /// Default: `20971520` (20MB, the Gemini inline data limit)
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,
}

/// Settings for the upstream Gemini API connection.
#[derive(Clone, Serialize, Deserialize)]
pub struct GeminiConfig {
    /// Base URL of the Generative Language API.
    /// Default: `https://generativelanguage.googleapis.com/v1beta`
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    /// The model every request is sent to.
    /// Default: `gemini-2.5-flash`
    #[serde(default = "default_model")]
    pub model: String,

    /// API key for the Generative Language API. Never serialized.
    #[serde(default, skip_serializing)]
    pub api_key: String,

    /// Optional request timeout in seconds. Unset means the HTTP client default.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_seconds: Option<u64>,
}

impl fmt::Debug for GeminiConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeminiConfig")
            .field("api_base_url", &self.api_base_url)
            .field("model", &self.model)
            .field("api_key", &"[REDACTED]")
            .field("timeout_seconds", &self.timeout_seconds)
            .finish()
    }
}

/// Settings for application logging and output format.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Minimum log level (`trace`, `debug`, `info`, `warn`, `error`).
    /// Default: `info`
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Output format for logs (`pretty`, `json`, `compact`).
    /// Default: `pretty`
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            upload_dir: default_upload_dir(),
            max_upload_bytes: default_max_upload_bytes(),
        }
    }
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            model: default_model(),
            api_key: String::new(),
            timeout_seconds: None,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3001
}

fn default_upload_dir() -> String {
    std::env::temp_dir()
        .join("gemini-gateway-uploads")
        .to_string_lossy()
        .to_string()
}

fn default_max_upload_bytes() -> usize {
    20 * 1024 * 1024
}

fn default_api_base_url() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}

fn default_model() -> String {
    "gemini-2.5-flash".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}
