#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Polaris danger-zone API server.
//!
//! ```text
//! polaris_server [--config polaris.toml]
//! ```
//!
//! Secrets (`NEWS_API_KEY`, `OPENAI_API_KEY`, `ANTHROPIC_API_KEY`) are
//! read from the environment.

use std::path::PathBuf;

use clap::Parser;
use polaris_server::config::AppConfig;

#[derive(Parser)]
#[command(
    name = "polaris_server",
    about = "Serve danger zones, predictions and advice from the background cycle"
)]
struct Cli {
    /// Path to a TOML config file
    #[arg(long, env = "POLARIS_CONFIG")]
    config: Option<PathBuf>,
}

#[actix_web::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    pretty_env_logger::init_custom_env("RUST_LOG");
    let cli = Cli::parse();

    let config = AppConfig::load(cli.config.as_deref())?;
    polaris_server::run_server(config).await?;
    Ok(())
}
