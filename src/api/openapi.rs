//! OpenAPI documentation and schema generation
//!
//! Defines the OpenAPI specification for the tabledrop REST API using utoipa
//! for compile-time spec generation.

use utoipa::OpenApi;

/// OpenAPI documentation for the tabledrop REST API
///
/// The spec can be accessed via:
/// - `/openapi.json` - JSON format OpenAPI specification
/// - `/swagger-ui` - Interactive Swagger UI documentation (if enabled)
#[derive(OpenApi)]
#[openapi(
    info(
        title = "tabledrop REST API",
        version = "0.1.0",
        description = "Fetches record attachments from an Airtable-style table and serves them over HTTP with a temporary local drop directory",
        license(
            name = "MIT OR Apache-2.0"
        )
    ),
    servers(
        (url = "http://localhost:8000", description = "Local development server")
    ),
    paths(
        crate::api::routes::get_file,
        crate::api::routes::serve_file,
        crate::api::routes::health_check,
        crate::api::routes::openapi_spec,
    ),
    components(schemas(
        crate::api::routes::GetFileQuery,
        crate::api::routes::FileTicket,
        crate::config::Config,
        crate::config::AirtableConfig,
        crate::config::DownloadConfig,
        crate::config::ServerConfig,
        crate::config::RetentionConfig,
        crate::config::ServeMode,
    )),
    tags(
        (name = "attachments", description = "Attachment lookup and materialization"),
        (name = "files", description = "Serving materialized files"),
        (name = "system", description = "Health and documentation")
    )
)]
pub struct ApiDoc;
