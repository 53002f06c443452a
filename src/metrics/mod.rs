// Metrics module for Prometheus observability
// Author: kelexine (https://github.com/kelexine)

mod registry;

pub use registry::{
    gather_metrics,
    REQUESTS_TOTAL,
    REQUEST_DURATION,
    GEMINI_API_CALLS,
    GEMINI_API_DURATION,
    TOKENS_TOTAL,
    UPLOAD_BYTES,
};

/// Helper to record request metrics
pub fn record_request(method: &str, endpoint: &str, status_code: u16, duration_secs: f64) {
    let status = status_code.to_string();
    REQUESTS_TOTAL
        .with_label_values(&[method, endpoint, &status])
        .inc();

    REQUEST_DURATION
        .with_label_values(&[method, endpoint, &status])
        .observe(duration_secs);
}

/// Helper to record Gemini API call metrics
pub fn record_gemini_call(model: &str, outcome: &str, duration_secs: f64) {
    GEMINI_API_CALLS
        .with_label_values(&[model, outcome])
        .inc();

    GEMINI_API_DURATION
        .with_label_values(&[model])
        .observe(duration_secs);
}

/// Helper to record token usage
pub fn record_tokens(model: &str, input: u32, output: u32) {
    if input > 0 {
        TOKENS_TOTAL
            .with_label_values(&[model, "input"])
            .inc_by(input as f64);
    }
    if output > 0 {
        TOKENS_TOTAL
            .with_label_values(&[model, "output"])
            .inc_by(output as f64);
    }
}

pub fn record_upload(route: &str, bytes: u64) {
    UPLOAD_BYTES.with_label_values(&[route]).observe(bytes as f64);
}
