//! Structured logging and secret redaction.
//!
//! This module configures the `tracing` ecosystem for the application and
//! provides a helper that keeps Google API keys out of log output.
//!
//! Author: kelexine (<https://github.com/kelexine>)

use crate::config::LoggingConfig;
use crate::error::{GatewayError, Result};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Prefix shared by every Google API key.
const API_KEY_PREFIX: &str = "AIza";

/// Initializes the global tracing subscriber for the application.
///
/// Supports three output formats:
/// - `json`: Structured JSON logs for production ingestion.
/// - `compact`: Single-line human-readable output.
/// - `pretty` (default): Multi-line, colorized output for development.
///
/// Log levels are controlled via the `RUST_LOG` environment variable or
/// the provided `LoggingConfig`.
pub fn init(config: &LoggingConfig) -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.level));

    let registry = tracing_subscriber::registry().with(env_filter);

    let installed = match config.format.as_str() {
        "json" => registry.with(tracing_subscriber::fmt::layer().json()).try_init(),
        "compact" => registry.with(tracing_subscriber::fmt::layer().compact()).try_init(),
        _ => registry.with(tracing_subscriber::fmt::layer().pretty()).try_init(),
    };

    installed.map_err(|e| GatewayError::Internal(format!("Failed to initialize logging: {}", e)))
}

/// Replaces every Google API key in `input` with `[REDACTED_API_KEY]`.
///
/// Upstream error bodies and URLs can echo the key back; run them through
/// this before logging.
pub fn sanitize(input: &str) -> String {
    let mut result = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(pos) = rest.find(API_KEY_PREFIX) {
        result.push_str(&rest[..pos]);
        let tail = &rest[pos..];
        // Keys are alphanumeric plus '-' and '_'
        let end = tail
            .find(|c: char| !(c.is_ascii_alphanumeric() || c == '-' || c == '_'))
            .unwrap_or(tail.len());
        result.push_str("[REDACTED_API_KEY]");
        rest = &tail[end..];
    }

    result.push_str(rest);
    result
}
