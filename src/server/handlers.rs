// HTTP request handlers
// Author: kelexine (https://github.com/kelexine)

use super::routes::AppState;
use crate::error::{GatewayError, Result};
use crate::generation::Route;
use crate::models::api::{GenerateTextRequest, GenerationResponse};
use crate::upload::{parse_upload_form, UploadedFile};
use axum::extract::multipart::MultipartRejection;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Multipart, State};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub model: String,
    pub timestamp: String,
}

pub async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        model: state.generator.model_name().to_string(),
        timestamp: chrono::Utc::now().to_rfc3339(),
    })
}

pub async fn metrics_handler() -> Result<impl IntoResponse> {
    let body = crate::metrics::gather_metrics()?;
    Ok(([(header::CONTENT_TYPE, "text/plain; version=0.0.4")], body))
}

/// Handler for `POST /generate-text`
pub async fn generate_text_handler(
    State(state): State<AppState>,
    payload: std::result::Result<Json<GenerateTextRequest>, JsonRejection>,
) -> Result<Json<GenerationResponse>> {
    let Json(req) = payload.map_err(|e| {
        debug!("Rejected text request body: {}", e);
        if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
            return GatewayError::PayloadTooLarge;
        }
        GatewayError::InvalidRequest(
            "Request body must be JSON with a string 'prompt' field".to_string(),
        )
    })?;

    info!("Received text generation request ({} chars)", req.prompt.len());

    let output = state.generator.generate_from_text(&req.prompt).await?;
    Ok(Json(GenerationResponse { output }))
}

/// Handler for `POST /generate-from-image`
pub async fn generate_from_image_handler(
    State(state): State<AppState>,
    multipart: std::result::Result<Multipart, MultipartRejection>,
) -> Result<Json<GenerationResponse>> {
    generate_from_upload(state, Route::Image, multipart).await
}

/// Handler for `POST /generate-from-document`
pub async fn generate_from_document_handler(
    State(state): State<AppState>,
    multipart: std::result::Result<Multipart, MultipartRejection>,
) -> Result<Json<GenerationResponse>> {
    generate_from_upload(state, Route::Document, multipart).await
}

/// Handler for `POST /generate-from-audio`
pub async fn generate_from_audio_handler(
    State(state): State<AppState>,
    multipart: std::result::Result<Multipart, MultipartRejection>,
) -> Result<Json<GenerationResponse>> {
    generate_from_upload(state, Route::Audio, multipart).await
}

/// Shared flow of the attachment routes: spool the upload, call the model,
/// then remove the temp file whatever the outcome.
async fn generate_from_upload(
    state: AppState,
    route: Route,
    multipart: std::result::Result<Multipart, MultipartRejection>,
) -> Result<Json<GenerationResponse>> {
    let multipart = multipart.map_err(|e| {
        debug!("Rejected {} upload request: {}", route, e);
        GatewayError::InvalidRequest("Request must be multipart/form-data".to_string())
    })?;
    let field = route
        .file_field()
        .ok_or_else(|| GatewayError::Internal(format!("{} route takes no upload", route)))?;

    let form = parse_upload_form(multipart, field, &state.upload_dir).await?;
    let (prompt, upload) = form.require_file(field)?;

    info!(
        "Received {} generation request: file={}, mime={}, size={}",
        route,
        upload.file_name().unwrap_or("unnamed"),
        upload.mime_type(),
        upload.size()
    );
    crate::metrics::record_upload(&route.to_string(), upload.size());

    let result = generate_with_upload(&state, route, prompt, &upload).await;
    upload.close();

    let output = result?;
    Ok(Json(GenerationResponse { output }))
}

async fn generate_with_upload(
    state: &AppState,
    route: Route,
    prompt: Option<String>,
    upload: &UploadedFile,
) -> Result<String> {
    let attachment = upload.read_attachment().await.map_err(|e| {
        error!("Failed to read upload {}: {}", upload.path().display(), e);
        GatewayError::GenerationFailed(route)
    })?;

    state
        .generator
        .generate_from_attachment(route, prompt, &attachment)
        .await
}
