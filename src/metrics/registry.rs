// Prometheus metrics registry and collectors
// Author: kelexine (https://github.com/kelexine)

use crate::error::{GatewayError, Result};
use lazy_static::lazy_static;
use prometheus::{
    CounterVec, HistogramOpts, HistogramVec, Opts, Registry, TextEncoder, Encoder,
    register_counter_vec_with_registry, register_histogram_vec_with_registry,
};

lazy_static! {
    /// Global Prometheus registry
    pub static ref REGISTRY: Registry = Registry::new();

    // ============================================================================
    // REQUEST METRICS
    // ============================================================================

    /// Total number of HTTP requests
    pub static ref REQUESTS_TOTAL: CounterVec = register_counter_vec_with_registry!(
        Opts::new("requests_total", "Total number of HTTP requests"),
        &["method", "endpoint", "status_code"],
        REGISTRY
    ).unwrap();

    /// Request duration histogram
    pub static ref REQUEST_DURATION: HistogramVec = register_histogram_vec_with_registry!(
        HistogramOpts::new("request_duration_seconds", "Request duration in seconds")
            .buckets(vec![0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0]),
        &["method", "endpoint", "status_code"],
        REGISTRY
    ).unwrap();

    // ============================================================================
    // GEMINI API METRICS
    // ============================================================================

    /// Total Gemini API calls
    pub static ref GEMINI_API_CALLS: CounterVec = register_counter_vec_with_registry!(
        Opts::new("gemini_api_calls_total", "Total Gemini API calls"),
        &["model", "outcome"], // outcome: success, error
        REGISTRY
    ).unwrap();

    /// Gemini API call duration
    pub static ref GEMINI_API_DURATION: HistogramVec = register_histogram_vec_with_registry!(
        HistogramOpts::new("gemini_api_duration_seconds", "Gemini API call duration")
            .buckets(vec![0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 60.0]),
        &["model"],
        REGISTRY
    ).unwrap();

    /// Total tokens processed
    pub static ref TOKENS_TOTAL: CounterVec = register_counter_vec_with_registry!(
        Opts::new("tokens_total", "Total tokens processed"),
        &["model", "type"], // type: input, output
        REGISTRY
    ).unwrap();

    // ============================================================================
    // UPLOAD METRICS
    // ============================================================================

    /// Size of uploaded attachments
    pub static ref UPLOAD_BYTES: HistogramVec = register_histogram_vec_with_registry!(
        HistogramOpts::new("upload_bytes", "Size of uploaded attachments in bytes")
            .buckets(prometheus::exponential_buckets(1024.0, 4.0, 9).unwrap()),
        &["route"],
        REGISTRY
    ).unwrap();
}

/// Gather all metrics and return as Prometheus text format
pub fn gather_metrics() -> Result<String> {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    encoder
        .encode(&metric_families, &mut buffer)
        .map_err(|e| GatewayError::Internal(format!("Failed to encode metrics: {}", e)))?;
    String::from_utf8(buffer)
        .map_err(|e| GatewayError::Internal(format!("Metrics are not valid UTF-8: {}", e)))
}
