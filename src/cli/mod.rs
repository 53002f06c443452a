// CLI module for gemini-gateway
// Author: kelexine (https://github.com/kelexine)

use clap::Parser;
use std::path::PathBuf;

/// gemini-gateway - HTTP gateway for Gemini text, image, document and audio prompts
#[derive(Parser, Debug)]
#[command(name = "gemini-gateway", version, about, long_about = None)]
pub struct Args {
    /// Path to a TOML config file (default: ~/.gemini-gateway/config.toml)
    #[arg(long, short)]
    pub config: Option<PathBuf>,

    /// Address to bind, overriding the configured host
    #[arg(long)]
    pub host: Option<String>,

    /// Port to listen on, overriding PORT and the configured port
    #[arg(long, short)]
    pub port: Option<u16>,
}
