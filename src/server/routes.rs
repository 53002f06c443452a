// HTTP routes configuration
// Author: kelexine (https://github.com/kelexine)

use super::handlers::{
    generate_from_audio_handler, generate_from_document_handler, generate_from_image_handler,
    generate_text_handler, health_handler, metrics_handler,
};
use super::middleware::{request_id_layers, track_metrics};
use crate::config::AppConfig;
use crate::error::Result;
use crate::gemini::GenerativeModel;
use crate::generation::{Generator, Route};
use axum::extract::DefaultBodyLimit;
use axum::{middleware, routing::{get, post}, Router};
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

#[derive(Clone)]
pub struct AppState {
    pub generator: Generator,
    pub upload_dir: Arc<PathBuf>,
}

/// Build the application router around a shared model handle.
///
/// Creates the upload directory if it does not exist yet.
pub fn create_router(config: AppConfig, model: Arc<dyn GenerativeModel>) -> Result<Router> {
    let upload_dir = PathBuf::from(&config.server.upload_dir);
    std::fs::create_dir_all(&upload_dir)?;

    let body_limit = config.server.max_upload_bytes;
    let state = AppState {
        generator: Generator::new(model),
        upload_dir: Arc::new(upload_dir),
    };

    let (set_request_id, propagate_request_id) = request_id_layers();

    let app = Router::new()
        .route("/health", get(health_handler))
        .route("/metrics", get(metrics_handler))
        .route(Route::Text.path(), post(generate_text_handler))
        .route(Route::Image.path(), post(generate_from_image_handler))
        .route(Route::Document.path(), post(generate_from_document_handler))
        .route(Route::Audio.path(), post(generate_from_audio_handler))
        .route_layer(middleware::from_fn(track_metrics))
        // Extractor rejections past the limit surface as GatewayError::PayloadTooLarge
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .layer(propagate_request_id)
        .layer(set_request_id)
        .with_state(state);

    Ok(app)
}
