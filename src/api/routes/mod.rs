//! Route handlers for the REST API
//!
//! Handlers are organized by domain:
//! - [`attachments`] — Lookup + materialization (`/get-file/`)
//! - [`files`] — Serving previously materialized files (`/files/{file_name}`)
//! - [`system`] — Health and OpenAPI

use serde::{Deserialize, Serialize};

mod attachments;
mod files;
mod system;

// Re-export all handlers so `routes::function_name` continues to work
pub use attachments::*;
pub use files::*;
pub use system::*;

// ============================================================================
// Query/Response Types (shared across handlers)
// ============================================================================

/// Query parameters for GET /get-file/
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
pub struct GetFileQuery {
    /// Name of the table field containing the attachment
    pub field_name: String,
}

/// Deferred-mode success body: where to pick the materialized file up
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
pub struct FileTicket {
    /// Flat name of the materialized file
    pub file_name: String,
    /// Public URL the file can be downloaded from while it is retained
    pub file_url: String,
    /// Informational note about the retention window
    pub message: String,
}
