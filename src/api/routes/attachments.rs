//! Attachment retrieval handler (`GET /get-file/`).

use super::{FileTicket, GetFileQuery};
use crate::api::AppState;
use crate::config::ServeMode;
use crate::error::Error;
use crate::materializer::LocalFile;
use axum::{
    Json,
    body::Body,
    extract::{Query, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use std::time::Duration;
use tokio_util::io::ReaderStream;

/// GET /get-file/ - Look up the field, materialize its attachment, deliver it
///
/// Direct mode streams the file bytes back and deletes the file; deferred
/// mode answers with a [`FileTicket`] and leaves the file for
/// `GET /files/{file_name}` until its retention timer fires.
#[utoipa::path(
    get,
    path = "/get-file/",
    tag = "attachments",
    params(
        ("field_name" = String, Query, description = "Name of the table field containing the attachment")
    ),
    responses(
        (status = 200, description = "Download ticket (deferred mode) or raw file bytes (direct mode)", body = FileTicket),
        (status = 404, description = "No attachment found for the field"),
        (status = 500, description = "Lookup or materialization failed")
    )
)]
pub async fn get_file(
    State(state): State<AppState>,
    Query(query): Query<GetFileQuery>,
) -> Result<Response, Error> {
    let field = query.field_name;
    let Some(file) = state.relay.fetch_field(&field).await? else {
        return Err(Error::AttachmentNotFound { field });
    };

    match state.config.server.serve_mode {
        ServeMode::Direct => serve_and_discard(&state, file).await,
        ServeMode::Deferred => issue_ticket(&state, file).await,
    }
}

/// Direct mode: body is the file itself, which is then removed from disk.
///
/// The file is unlinked before the response streams; the open handle keeps
/// the bytes readable until the body has been fully sent.
async fn serve_and_discard(state: &AppState, file: LocalFile) -> Result<Response, Error> {
    let handle = tokio::fs::File::open(&file.path).await?;
    let len = handle.metadata().await?.len();
    state.relay.discard(&file).await;

    let response = Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "application/octet-stream")
        .header(
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", file.name),
        )
        .header(header::CONTENT_LENGTH, len)
        .body(Body::from_stream(ReaderStream::new(handle)))
        .map_err(|e| Error::ApiServer(e.to_string()))?;

    Ok(response)
}

/// Deferred mode: arm the retention timer and hand out a pickup URL
async fn issue_ticket(state: &AppState, file: LocalFile) -> Result<Response, Error> {
    state.relay.schedule_cleanup(&file).await;

    let file_url = format!(
        "{}/files/{}",
        state.config.server.public_url.trim_end_matches('/'),
        file.name
    );
    let ticket = FileTicket {
        file_name: file.name,
        file_url,
        message: retention_notice(state.relay.retention().ttl()),
    };

    Ok((StatusCode::OK, Json(ticket)).into_response())
}

/// Human-readable description of the retention window
fn retention_notice(ttl: Duration) -> String {
    let secs = ttl.as_secs();
    if secs >= 60 && secs % 60 == 0 {
        let minutes = secs / 60;
        let unit = if minutes == 1 { "minute" } else { "minutes" };
        format!("File will be deleted automatically after {minutes} {unit}.")
    } else {
        format!("File will be deleted automatically after {secs} seconds.")
    }
}
