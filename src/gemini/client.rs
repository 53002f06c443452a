// Gemini API client
// Author: kelexine (https://github.com/kelexine)

use super::{GenerationOutput, GenerativeModel};
use crate::config::GeminiConfig;
use crate::error::{GatewayError, Result};
use crate::models::gemini::{GenerateContentRequest, GenerateContentResponse, Part};
use crate::utils::logging::sanitize;
use async_trait::async_trait;
use reqwest::Client;
use std::time::{Duration, Instant};
use tracing::{debug, error};

/// Client for the Google Gemini `generateContent` REST API.
///
/// Authenticates with an API key sent in the `x-goog-api-key` header and
/// targets a single configured model. Built once at startup and shared by
/// every request.
pub struct GeminiClient {
    http_client: Client,
    config: GeminiConfig,
}

impl GeminiClient {
    /// Create a new Gemini client.
    ///
    /// No timeout is applied unless `timeout_seconds` is configured.
    pub fn new(config: &GeminiConfig) -> Result<Self> {
        if config.api_key.trim().is_empty() {
            return Err(GatewayError::Config("Gemini API key is empty".to_string()));
        }

        let mut builder = Client::builder()
            .pool_idle_timeout(Duration::from_secs(90))
            .tcp_keepalive(Some(Duration::from_secs(60)))
            .use_rustls_tls();

        if let Some(secs) = config.timeout_seconds {
            builder = builder.timeout(Duration::from_secs(secs));
        }

        let http_client = builder
            .build()
            .map_err(|e| GatewayError::Internal(format!("Failed to create HTTP client: {}", e)))?;

        debug!("Created Gemini HTTP client for model {}", config.model);

        Ok(Self {
            http_client,
            config: config.clone(),
        })
    }

    /// Get the API base_url
    pub fn base_url(&self) -> &str {
        &self.config.api_base_url
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.config.api_base_url.trim_end_matches('/'),
            self.config.model
        )
    }

    /// Extract error message from API response JSON
    fn extract_error_message(response_text: &str) -> Option<String> {
        #[derive(serde::Deserialize)]
        struct ErrorResponse {
            error: Option<ErrorDetail>,
        }

        #[derive(serde::Deserialize)]
        struct ErrorDetail {
            message: Option<String>,
            status: Option<String>,
        }

        if let Ok(error_resp) = serde_json::from_str::<ErrorResponse>(response_text) {
            if let Some(error) = error_resp.error {
                return error.message.or(error.status);
            }
        }
        None
    }

    async fn call(&self, parts: Vec<Part>) -> Result<GenerationOutput> {
        let url = self.endpoint();
        let request = GenerateContentRequest::from_parts(parts);

        let response = self
            .http_client
            .post(&url)
            .header("x-goog-api-key", &self.config.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| GatewayError::GeminiApi(format!("HTTP error: {}", e)))?;

        let status = response.status();
        let response_text = response
            .text()
            .await
            .map_err(|e| GatewayError::GeminiApi(format!("Failed to read response body: {}", e)))?;

        if !status.is_success() {
            error!(
                "Gemini API error: HTTP {} - Response body: {}",
                status,
                sanitize(&response_text)
            );
            let message = Self::extract_error_message(&response_text)
                .unwrap_or_else(|| response_text.clone());
            return Err(GatewayError::GeminiApi(format!("HTTP {}: {}", status, message)));
        }

        debug!(
            "Raw Gemini response (first 500 chars): {}",
            response_text.chars().take(500).collect::<String>()
        );

        let gemini_response: GenerateContentResponse = serde_json::from_str(&response_text)
            .map_err(|e| {
                error!("Failed to parse Gemini response: {}", e);
                GatewayError::GeminiApi(format!("Response parsing error: {}", e))
            })?;

        let text = gemini_response.text()?;

        Ok(GenerationOutput {
            text,
            usage: gemini_response.usage_metadata,
        })
    }
}

#[async_trait]
impl GenerativeModel for GeminiClient {
    async fn generate_content(&self, parts: Vec<Part>) -> Result<GenerationOutput> {
        debug!("Calling generateContent for model {} with {} parts", self.config.model, parts.len());

        let start = Instant::now();
        let result = self.call(parts).await;
        let elapsed = start.elapsed().as_secs_f64();

        match &result {
            Ok(output) => {
                crate::metrics::record_gemini_call(&self.config.model, "success", elapsed);
                if let Some(usage) = &output.usage {
                    crate::metrics::record_tokens(
                        &self.config.model,
                        usage.prompt_token_count.unwrap_or(0),
                        usage.candidates_token_count.unwrap_or(0),
                    );
                }
            }
            Err(_) => crate::metrics::record_gemini_call(&self.config.model, "error", elapsed),
        }

        result
    }

    fn model_name(&self) -> &str {
        &self.config.model
    }
}
