// Gemini API client module
// Author: kelexine (https://github.com/kelexine)

mod client;

pub use client::GeminiClient;

use crate::error::Result;
use crate::models::gemini::{Part, UsageMetadata};
use async_trait::async_trait;

/// Text produced by a single model call.
#[derive(Debug, Clone, Default)]
pub struct GenerationOutput {
    pub text: String,
    pub usage: Option<UsageMetadata>,
}

/// A generative model that turns an ordered list of content parts into text.
///
/// The server holds one process-wide implementation behind an `Arc`; tests
/// substitute their own.
#[async_trait]
pub trait GenerativeModel: Send + Sync {
    /// Send one user turn made of `parts` and return the generated text.
    async fn generate_content(&self, parts: Vec<Part>) -> Result<GenerationOutput>;

    /// Name of the upstream model, used for logging and metrics.
    fn model_name(&self) -> &str;
}
