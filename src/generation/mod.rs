//! Request-to-model-call adapter.
//!
//! Turns a prompt and an optional uploaded attachment into the ordered
//! content parts Gemini expects, runs the call, and collapses every upstream
//! failure into a single per-route [`GatewayError::GenerationFailed`].
//!
//! Author: kelexine (<https://github.com/kelexine>)

use crate::error::{GatewayError, Result};
use crate::gemini::GenerativeModel;
use crate::models::gemini::Part;
use base64::Engine;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, error};

/// The generation endpoints exposed by the gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    Text,
    Image,
    Document,
    Audio,
}

impl Route {
    /// Fixed message returned to the caller when the model call fails.
    pub fn failure_message(&self) -> &'static str {
        match self {
            Route::Text => "An error occurred while generating text.",
            Route::Image => "An error occurred while generating text from image.",
            Route::Document => "An error occurred while generating text from document.",
            Route::Audio => "An error occurred while generating text from audio.",
        }
    }

    /// Prompt used when the caller sends none. Image requests have no default.
    pub fn default_prompt(&self) -> Option<&'static str> {
        match self {
            Route::Document => Some("Analyze this document :"),
            Route::Audio => Some("Analyze this audio :"),
            Route::Text | Route::Image => None,
        }
    }

    /// Multipart field that carries the uploaded file.
    pub fn file_field(&self) -> Option<&'static str> {
        match self {
            Route::Text => None,
            Route::Image => Some("image"),
            Route::Document => Some("document"),
            Route::Audio => Some("audio"),
        }
    }

    pub fn path(&self) -> &'static str {
        match self {
            Route::Text => "/generate-text",
            Route::Image => "/generate-from-image",
            Route::Document => "/generate-from-document",
            Route::Audio => "/generate-from-audio",
        }
    }

    /// Resolve the prompt actually sent upstream.
    ///
    /// The default applies only when the field is absent; an empty prompt is
    /// passed through unchanged.
    pub fn resolve_prompt(&self, prompt: Option<String>) -> Result<String> {
        match (prompt, self.default_prompt()) {
            (Some(prompt), _) => Ok(prompt),
            (None, Some(default)) => Ok(default.to_string()),
            (None, None) => Err(GatewayError::InvalidRequest(
                "Missing required field: prompt".to_string(),
            )),
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Route::Text => "text",
            Route::Image => "image",
            Route::Document => "document",
            Route::Audio => "audio",
        };
        f.write_str(name)
    }
}

/// An uploaded file held in memory for the duration of one request.
#[derive(Debug, Clone)]
pub struct Attachment {
    pub bytes: Vec<u8>,
    pub mime_type: String,
}

impl Attachment {
    /// Encode as an inline-data part.
    pub fn to_part(&self) -> Part {
        Part::inline_data(
            self.mime_type.clone(),
            base64::engine::general_purpose::STANDARD.encode(&self.bytes),
        )
    }
}

/// Stateless adapter around the shared model handle.
#[derive(Clone)]
pub struct Generator {
    model: Arc<dyn GenerativeModel>,
}

impl Generator {
    pub fn new(model: Arc<dyn GenerativeModel>) -> Self {
        Self { model }
    }

    pub fn model_name(&self) -> &str {
        self.model.model_name()
    }

    /// Generate from a prompt alone.
    pub async fn generate_from_text(&self, prompt: &str) -> Result<String> {
        self.run(Route::Text, vec![Part::text(prompt)]).await
    }

    /// Generate from a prompt followed by one inline attachment.
    ///
    /// A missing prompt is replaced by the route's default; routes without a
    /// default reject the request before any model call.
    pub async fn generate_from_attachment(
        &self,
        route: Route,
        prompt: Option<String>,
        attachment: &Attachment,
    ) -> Result<String> {
        let prompt = route.resolve_prompt(prompt)?;
        debug!(
            "Sending {} attachment ({} bytes, {})",
            route,
            attachment.bytes.len(),
            attachment.mime_type
        );
        self.run(route, vec![Part::text(prompt), attachment.to_part()])
            .await
    }

    async fn run(&self, route: Route, parts: Vec<Part>) -> Result<String> {
        match self.model.generate_content(parts).await {
            Ok(output) => Ok(output.text),
            Err(e) => {
                error!(route = %route, model = self.model.model_name(), "Generation failed: {}", e);
                Err(GatewayError::GenerationFailed(route))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gemini::GenerationOutput;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Records every call and answers with a canned result.
    struct RecordingModel {
        calls: Mutex<Vec<Vec<Part>>>,
        fail: bool,
    }

    impl RecordingModel {
        fn new(fail: bool) -> Arc<Self> {
            Arc::new(Self {
                calls: Mutex::new(Vec::new()),
                fail,
            })
        }
    }

    #[async_trait]
    impl GenerativeModel for RecordingModel {
        async fn generate_content(&self, parts: Vec<Part>) -> Result<GenerationOutput> {
            self.calls.lock().unwrap().push(parts);
            if self.fail {
                return Err(GatewayError::GeminiApi("HTTP 503: unavailable".to_string()));
            }
            Ok(GenerationOutput {
                text: "generated".to_string(),
                usage: None,
            })
        }

        fn model_name(&self) -> &str {
            "test-model"
        }
    }

    fn attachment() -> Attachment {
        Attachment {
            bytes: b"hello".to_vec(),
            mime_type: "application/pdf".to_string(),
        }
    }

    #[tokio::test]
    async fn test_text_sends_single_text_part() {
        let model = RecordingModel::new(false);
        let generator = Generator::new(model.clone());

        let output = generator.generate_from_text("Say hi").await.unwrap();
        assert_eq!(output, "generated");

        let calls = model.calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].len(), 1);
        assert_eq!(calls[0][0].as_answer_text(), Some("Say hi"));
    }

    #[tokio::test]
    async fn test_attachment_parts_are_ordered_text_then_inline_data() {
        let model = RecordingModel::new(false);
        let generator = Generator::new(model.clone());

        generator
            .generate_from_attachment(Route::Document, Some("Summarize".to_string()), &attachment())
            .await
            .unwrap();

        let calls = model.calls.lock().unwrap();
        let parts = &calls[0];
        assert_eq!(parts.len(), 2);
        assert_eq!(parts[0].as_answer_text(), Some("Summarize"));
        match &parts[1] {
            Part::InlineData { inline_data } => {
                assert_eq!(inline_data.mime_type, "application/pdf");
                assert_eq!(inline_data.data, "aGVsbG8=");
            }
            other => panic!("expected inline data, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_default_prompt_substitution() {
        let model = RecordingModel::new(false);
        let generator = Generator::new(model.clone());

        generator
            .generate_from_attachment(Route::Audio, None, &attachment())
            .await
            .unwrap();
        generator
            .generate_from_attachment(Route::Document, None, &attachment())
            .await
            .unwrap();

        let calls = model.calls.lock().unwrap();
        assert_eq!(calls[0][0].as_answer_text(), Some("Analyze this audio :"));
        assert_eq!(calls[1][0].as_answer_text(), Some("Analyze this document :"));
    }

    #[tokio::test]
    async fn test_empty_prompt_is_kept() {
        let model = RecordingModel::new(false);
        let generator = Generator::new(model.clone());

        generator
            .generate_from_attachment(Route::Document, Some(String::new()), &attachment())
            .await
            .unwrap();

        assert_eq!(model.calls.lock().unwrap()[0][0].as_answer_text(), Some(""));
    }

    #[tokio::test]
    async fn test_image_without_prompt_is_rejected_before_model_call() {
        let model = RecordingModel::new(false);
        let generator = Generator::new(model.clone());

        let err = generator
            .generate_from_attachment(Route::Image, None, &attachment())
            .await
            .unwrap_err();

        assert!(matches!(err, GatewayError::InvalidRequest(_)));
        assert!(model.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_model_errors_collapse_to_route_failure() {
        let generator = Generator::new(RecordingModel::new(true));

        let err = generator.generate_from_text("hi").await.unwrap_err();
        assert!(matches!(err, GatewayError::GenerationFailed(Route::Text)));

        let err = generator
            .generate_from_attachment(Route::Image, Some("what is this".to_string()), &attachment())
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "An error occurred while generating text from image.");
    }

    #[test]
    fn test_route_metadata() {
        assert_eq!(Route::Image.file_field(), Some("image"));
        assert_eq!(Route::Text.file_field(), None);
        assert_eq!(Route::Audio.path(), "/generate-from-audio");
        assert!(Route::Image.default_prompt().is_none());
    }
}
