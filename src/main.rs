// gemini-gateway - HTTP gateway for Gemini generative models
// Author: kelexine (https://github.com/kelexine)

use anyhow::Result;
use clap::Parser;
use gemini_gateway::cli::Args;
use gemini_gateway::config::AppConfig;
use gemini_gateway::gemini::GeminiClient;
use gemini_gateway::server::create_router;
use gemini_gateway::utils::logging;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::signal;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    // Pick up GEMINI_API_KEY / PORT from a local .env, if any
    dotenvy::dotenv().ok();

    let args = Args::parse();

    // Phase 1: Load configuration
    let mut config = AppConfig::load(args.config.as_deref())?;
    if let Some(host) = args.host {
        config.server.host = host;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }

    // Phase 2: Initialize logging
    logging::init(&config.logging)?;
    info!("Starting gemini-gateway v{}", env!("CARGO_PKG_VERSION"));

    config.validate()?;

    // Phase 3: Build the process-wide model client
    let gemini_client = GeminiClient::new(&config.gemini)?;
    info!(
        "Using model {} at {}",
        config.gemini.model,
        gemini_client.base_url()
    );

    // Phase 4: Build and start HTTP server
    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    info!("Spooling uploads to {}", config.server.upload_dir);
    let app = create_router(config, Arc::new(gemini_client))?;

    info!("Starting server on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;

    // Phase 5: Run server with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shut down gracefully");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C signal");
        },
        _ = terminate => {
            info!("Received SIGTERM signal");
        },
    }
}
