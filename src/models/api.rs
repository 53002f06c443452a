// Gateway HTTP API request/response bodies
// Author: kelexine (https://github.com/kelexine)

use serde::{Deserialize, Serialize};

/// Body of `POST /generate-text`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateTextRequest {
    pub prompt: String,
}

/// Successful generation, returned by every generation route.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GenerationResponse {
    pub output: String,
}

/// Error body, returned for every failed request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorResponse {
    pub error: String,
}
