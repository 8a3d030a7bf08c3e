//! tabledrop service binary
//!
//! Loads configuration from the environment (a `.env` file is honored),
//! initializes structured logging, and serves the relay until a termination
//! signal arrives.

use std::process;
use std::sync::Arc;

use tabledrop::{AttachmentRelay, Config, Result};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

#[tokio::main]
async fn main() {
    let Err(error) = run().await else {
        tracing::info!("tabledrop terminated successfully");
        process::exit(0);
    };

    if tracing::enabled!(tracing::Level::ERROR) {
        tracing::error!(error = %error, "tabledrop terminated with error");
    } else {
        eprintln!("Error: {error}");
    }

    process::exit(1);
}

async fn run() -> Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = Config::from_env()?;
    tracing::info!(
        table = %config.airtable.table_name,
        download_dir = %config.download.download_dir.display(),
        serve_mode = ?config.server.serve_mode,
        ttl_secs = config.retention.file_ttl.as_secs(),
        "Configuration loaded"
    );

    let relay = Arc::new(AttachmentRelay::new(config)?);
    tabledrop::run_with_shutdown(relay).await
}

/// Initialize the tracing subscriber; `RUST_LOG` overrides the `info` default
fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(env_filter)
        .init();
}
