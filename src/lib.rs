//! # tabledrop
//!
//! Backend library for relaying record attachments out of an Airtable-style
//! table: look the attachment up, materialize it in a local drop directory,
//! and serve it over HTTP until its retention timer removes it.
//!
//! ## Design Philosophy
//!
//! tabledrop is designed to be:
//! - **Explicitly configured** - One [`Config`] built at startup, no global state
//! - **Sensible defaults** - Only the remote-table credentials are required
//! - **Library-first** - The binary is a thin wrapper over [`api::start_api_server`]
//!
//! ## Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use tabledrop::{AttachmentRelay, Config};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::from_env()?;
//!     let relay = Arc::new(AttachmentRelay::new(config)?);
//!
//!     tabledrop::run_with_shutdown(relay).await?;
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// Record lookup against the remote tabular API
pub mod airtable;
/// REST API module
pub mod api;
/// Configuration types
pub mod config;
/// Error types
pub mod error;
/// Streaming download of attachments to disk
pub mod materializer;
/// Core relay orchestration
pub mod relay;
/// Time-limited file retention
pub mod retention;
/// Utility functions
pub mod utils;

// Re-export commonly used types
pub use airtable::{AirtableClient, Attachment};
pub use config::{Config, ServeMode};
pub use error::{Error, Result, ToHttpStatus};
pub use materializer::{LocalFile, Materializer};
pub use relay::AttachmentRelay;
pub use retention::RetentionScheduler;

use std::sync::Arc;

/// Run the API server until a termination signal arrives.
///
/// - **Unix:** listens for SIGTERM and SIGINT, with fallbacks if signal
///   registration fails.
/// - **Windows/other:** listens for Ctrl+C via `tokio::signal::ctrl_c()`.
pub async fn run_with_shutdown(relay: Arc<AttachmentRelay>) -> Result<()> {
    let config = relay.config.clone();

    tokio::select! {
        result = api::start_api_server(relay, config) => result,
        _ = wait_for_signal() => {
            tracing::info!("Shutting down");
            Ok(())
        }
    }
}

#[cfg(unix)]
async fn wait_for_signal() {
    use tokio::signal::unix::{SignalKind, signal};

    // Signal registration may fail in restricted environments (containers, tests)
    let sigterm_result = signal(SignalKind::terminate());
    let sigint_result = signal(SignalKind::interrupt());

    match (sigterm_result, sigint_result) {
        (Ok(mut sigterm), Ok(mut sigint)) => {
            tokio::select! {
                _ = sigterm.recv() => {
                    tracing::info!("Received SIGTERM signal");
                }
                _ = sigint.recv() => {
                    tracing::info!("Received SIGINT signal (Ctrl+C)");
                }
            }
        }
        (Err(e), _) => {
            tracing::warn!(error = %e, "Could not register SIGTERM handler, waiting for SIGINT only");
            if let Ok(mut sigint) = signal(SignalKind::interrupt()) {
                sigint.recv().await;
                tracing::info!("Received SIGINT signal (Ctrl+C)");
            } else {
                tracing::error!("Could not register any signal handlers, using ctrl_c fallback");
                tokio::signal::ctrl_c().await.ok();
            }
        }
        (_, Err(e)) => {
            tracing::warn!(error = %e, "Could not register SIGINT handler, waiting for SIGTERM only");
            if let Ok(mut sigterm) = signal(SignalKind::terminate()) {
                sigterm.recv().await;
                tracing::info!("Received SIGTERM signal");
            } else {
                tracing::error!("Could not register any signal handlers, using ctrl_c fallback");
                tokio::signal::ctrl_c().await.ok();
            }
        }
    }
}

#[cfg(not(unix))]
async fn wait_for_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => {
            tracing::info!("Received Ctrl+C signal");
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C signal");
        }
    }
}
