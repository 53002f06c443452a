// gemini-gateway - HTTP gateway for Gemini generative models
// Author: kelexine (https://github.com/kelexine)

pub mod cli;
pub mod config;
pub mod error;
pub mod gemini;
pub mod generation;
pub mod metrics;
pub mod models;
pub mod server;
pub mod upload;
pub mod utils;
