//! Materialized-file serving handler (`GET /files/{file_name}`).

use crate::api::AppState;
use crate::error::Error;
use axum::{
    body::Body,
    extract::{Path, State},
    http::{StatusCode, header},
    response::Response,
};
use tokio_util::io::ReaderStream;

/// GET /files/{file_name} - Serve a materialized file from the download
/// directory
///
/// Streams the file if it is still retained; responds 404 for names that
/// were never materialized, already expired, or attempt to escape the
/// directory.
#[utoipa::path(
    get,
    path = "/files/{file_name}",
    tag = "files",
    params(
        ("file_name" = String, Path, description = "Name of a previously materialized file")
    ),
    responses(
        (status = 200, description = "File bytes", content_type = "application/octet-stream"),
        (status = 404, description = "File not found")
    )
)]
pub async fn serve_file(
    State(state): State<AppState>,
    Path(file_name): Path<String>,
) -> Result<Response, Error> {
    let (path, len) = state.relay.resolve_file(&file_name).await?;

    let file = tokio::fs::File::open(&path).await.map_err(|e| {
        // Lost a race with the deletion timer between resolve and open.
        if e.kind() == std::io::ErrorKind::NotFound {
            Error::FileNotFound {
                name: file_name.clone(),
            }
        } else {
            Error::Io(e)
        }
    })?;

    let stream = ReaderStream::new(file);
    let response = Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "application/octet-stream")
        .header(
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{file_name}\""),
        )
        .header(header::CONTENT_LENGTH, len)
        .body(Body::from_stream(stream))
        .map_err(|e| Error::ApiServer(e.to_string()))?;

    Ok(response)
}
