//! Axum-based HTTP server for the gateway.
//!
//! This module sets up the HTTP server, configures routes, and handles
//! incoming generation requests, forwarding them to the Gemini model through
//! the [`crate::generation`] adapter.
//!
//! # Components
//!
//! - `handlers`: Implementation of individual endpoints (generation, health, metrics).
//! - `middleware`: Request ID tracking and per-request metrics.
//! - `routes`: The main router configuration that ties everything together.
//!
//! Author: kelexine (<https://github.com/kelexine>)

mod handlers;
mod middleware;
mod routes;

pub use routes::{create_router, AppState};
