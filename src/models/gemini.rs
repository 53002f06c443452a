// Gemini generateContent API type definitions
// Author: kelexine (https://github.com/kelexine)
// Based on the public generativelanguage.googleapis.com/v1beta REST surface

use crate::error::{GatewayError, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Finish reasons that mean the candidate was withheld rather than completed.
const BLOCKED_FINISH_REASONS: &[&str] = &[
    "SAFETY",
    "RECITATION",
    "LANGUAGE",
    "BLOCKLIST",
    "PROHIBITED_CONTENT",
    "SPII",
    "OTHER",
];

/// Gemini generate content request.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentRequest {
    /// Conversation turns; the gateway always sends a single user turn.
    pub contents: Vec<Content>,
}

impl GenerateContentRequest {
    /// Wrap `parts` into a single user turn.
    pub fn from_parts(parts: Vec<Part>) -> Self {
        Self {
            contents: vec![Content {
                role: "user".to_string(),
                parts,
            }],
        }
    }
}

/// Content in a turn (user or model)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Content {
    #[serde(default = "default_role")]
    pub role: String, // "user" or "model"
    #[serde(default)]
    pub parts: Vec<Part>,
}

fn default_role() -> String {
    "model".to_string()
}

/// Individual part of content in a Gemini request/response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Part {
    /// Text content part.
    Text {
        text: String,

        /// Set on thinking output; such parts are not part of the answer.
        #[serde(skip_serializing_if = "Option::is_none")]
        thought: Option<bool>,
    },

    /// Inline media (images, documents, audio).
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: InlineData,
    },

    /// Any part kind the gateway does not produce (function calls, code execution...).
    Other(Value),
}

impl Part {
    pub fn text(text: impl Into<String>) -> Self {
        Part::Text {
            text: text.into(),
            thought: None,
        }
    }

    pub fn inline_data(mime_type: impl Into<String>, data: impl Into<String>) -> Self {
        Part::InlineData {
            inline_data: InlineData {
                mime_type: mime_type.into(),
                data: data.into(),
            },
        }
    }

    /// Answer text carried by this part, if any.
    pub fn as_answer_text(&self) -> Option<&str> {
        match self {
            Part::Text { text, thought } if *thought != Some(true) => Some(text),
            _ => None,
        }
    }
}

/// Inline media payload
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct InlineData {
    #[serde(rename = "mimeType")]
    pub mime_type: String,
    pub data: String, // base64 encoded
}

/// Gemini generate content response.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    pub prompt_feedback: Option<PromptFeedback>,
    pub usage_metadata: Option<UsageMetadata>,
}

impl GenerateContentResponse {
    /// Extract the answer text of the first candidate.
    ///
    /// Fails when the prompt or the candidate was blocked. A response with no
    /// candidates and no block reason yields an empty string.
    pub fn text(&self) -> Result<String> {
        let Some(candidate) = self.candidates.first() else {
            if let Some(reason) = self
                .prompt_feedback
                .as_ref()
                .and_then(|f| f.block_reason.as_deref())
            {
                return Err(GatewayError::Blocked(format!(
                    "prompt blocked due to {}",
                    reason
                )));
            }
            return Ok(String::new());
        };

        if let Some(reason) = candidate.finish_reason.as_deref() {
            if BLOCKED_FINISH_REASONS.contains(&reason) {
                return Err(GatewayError::Blocked(format!(
                    "candidate blocked due to {}",
                    reason
                )));
            }
        }

        Ok(candidate
            .content
            .as_ref()
            .map(|c| c.parts.iter().filter_map(Part::as_answer_text).collect())
            .unwrap_or_default())
    }
}

/// Response candidate
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    pub content: Option<Content>,
    pub finish_reason: Option<String>,
}

/// Feedback on the prompt itself, present when it was rejected.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptFeedback {
    pub block_reason: Option<String>,
}

/// Token usage metadata.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageMetadata {
    pub prompt_token_count: Option<u32>,
    pub candidates_token_count: Option<u32>,
    pub total_token_count: Option<u32>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(value: Value) -> GenerateContentResponse {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_request_serialization() {
        let request = GenerateContentRequest::from_parts(vec![
            Part::text("Describe this"),
            Part::inline_data("image/png", "aGVsbG8="),
        ]);
        let json = serde_json::to_value(&request).unwrap();

        assert_eq!(
            json,
            json!({
                "contents": [{
                    "role": "user",
                    "parts": [
                        { "text": "Describe this" },
                        { "inlineData": { "mimeType": "image/png", "data": "aGVsbG8=" } }
                    ]
                }]
            })
        );
    }

    #[test]
    fn test_text_joins_parts_and_skips_thoughts() {
        let response = parse(json!({
            "candidates": [{
                "content": {
                    "role": "model",
                    "parts": [
                        { "text": "thinking...", "thought": true },
                        { "text": "Hello, " },
                        { "text": "world" }
                    ]
                },
                "finishReason": "STOP"
            }],
            "usageMetadata": { "promptTokenCount": 3, "candidatesTokenCount": 2, "totalTokenCount": 5 }
        }));

        assert_eq!(response.text().unwrap(), "Hello, world");
        assert_eq!(response.usage_metadata.unwrap().total_token_count, Some(5));
    }

    #[test]
    fn test_unknown_parts_are_tolerated() {
        let response = parse(json!({
            "candidates": [{
                "content": {
                    "parts": [
                        { "functionCall": { "name": "noop", "args": {} } },
                        { "text": "done" }
                    ]
                }
            }]
        }));

        assert_eq!(response.text().unwrap(), "done");
    }

    #[test]
    fn test_blocked_prompt_is_an_error() {
        let response = parse(json!({
            "promptFeedback": { "blockReason": "SAFETY" }
        }));

        let err = response.text().unwrap_err();
        assert!(matches!(err, GatewayError::Blocked(_)));
    }

    #[test]
    fn test_blocked_candidate_is_an_error() {
        let response = parse(json!({
            "candidates": [{ "finishReason": "RECITATION" }]
        }));

        assert!(response.text().is_err());
    }

    #[test]
    fn test_empty_response_yields_empty_text() {
        let response = parse(json!({}));
        assert_eq!(response.text().unwrap(), "");
    }
}
