//! Application state for the API server

use crate::{AttachmentRelay, Config};
use std::sync::Arc;

/// Shared application state accessible to all route handlers
///
/// Cloned for each request (cheap Arc clones); provides access to the relay
/// core and the configuration.
#[derive(Clone)]
pub struct AppState {
    /// The relay instance driving lookup, materialization and retention
    pub relay: Arc<AttachmentRelay>,

    /// Configuration (read-only)
    pub config: Arc<Config>,
}

impl AppState {
    /// Create a new AppState
    pub fn new(relay: Arc<AttachmentRelay>, config: Arc<Config>) -> Self {
        Self { relay, config }
    }
}
