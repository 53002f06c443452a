//! Data models for the gateway and the Gemini API.
//!
//! This module contains the type definitions for request/response bodies used by:
//! - The inbound gateway HTTP API (`api`)
//! - The upstream Google Gemini `generateContent` API (`gemini`)

// Author: kelexine (https://github.com/kelexine)

pub mod api;
pub mod gemini;

pub use api::{ErrorResponse, GenerateTextRequest, GenerationResponse};
pub use gemini::{Content, GenerateContentRequest, GenerateContentResponse, InlineData, Part};
