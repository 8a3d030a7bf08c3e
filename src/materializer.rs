//! Streaming materialization of remote attachments onto local disk

use crate::error::{Error, Result};
use crate::utils::sanitize_file_name;
use futures::StreamExt;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;

/// Timeout for attachment fetches
const FETCH_TIMEOUT_SECS: u64 = 300;

/// A file the materializer has written into the download directory
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LocalFile {
    /// Absolute-or-relative path of the file on disk
    pub path: PathBuf,
    /// Flat file name within the download directory
    pub name: String,
}

/// Downloads remote content into a single flat output directory.
///
/// Filenames are sanitized to flat names, so an attachment can never escape
/// the directory. Same-named files are overwritten; the write streams the
/// response body chunk-by-chunk without buffering the whole file.
pub struct Materializer {
    http: reqwest::Client,
    output_dir: PathBuf,
}

impl Materializer {
    /// Create a materializer writing into `output_dir`
    pub fn new(output_dir: impl Into<PathBuf>) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(FETCH_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            http,
            output_dir: output_dir.into(),
        })
    }

    /// The directory materialized files land in
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// The path `file_name` will materialize to, after sanitization
    pub fn target_path(&self, file_name: &str) -> PathBuf {
        self.output_dir.join(sanitize_file_name(file_name))
    }

    /// Stream the content at `url` into the output directory as `file_name`.
    ///
    /// Creates the directory if absent and overwrites any existing file of
    /// the same name. A non-success response status fails the whole
    /// materialization; a truncated transfer surfaces as the stream error it
    /// caused, never as a silent short file being reported complete.
    pub async fn materialize(&self, url: &str, file_name: &str) -> Result<LocalFile> {
        tokio::fs::create_dir_all(&self.output_dir).await?;

        let name = sanitize_file_name(file_name);
        let path = self.target_path(file_name);

        let response = self.http.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(Error::Upstream {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let mut file = tokio::fs::File::create(&path).await?;
        let mut stream = response.bytes_stream();
        let mut written: u64 = 0;

        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            file.write_all(&chunk).await?;
            written += chunk.len() as u64;
        }
        file.flush().await?;

        tracing::debug!(
            file = %path.display(),
            bytes = written,
            "Materialized attachment"
        );

        Ok(LocalFile { path, name })
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn writes_remote_bytes_to_named_file() {
        let server = MockServer::start().await;
        let payload = vec![7u8; 100_000];
        Mock::given(method("GET"))
            .and(path("/x.png"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(payload.clone()))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let materializer = Materializer::new(dir.path()).unwrap();
        let file = materializer
            .materialize(&format!("{}/x.png", server.uri()), "shot.png")
            .await
            .unwrap();

        assert_eq!(file.name, "shot.png");
        assert_eq!(file.path, dir.path().join("shot.png"));
        let on_disk = std::fs::read(&file.path).unwrap();
        assert_eq!(on_disk.len(), payload.len());
        assert_eq!(on_disk, payload);
    }

    #[tokio::test]
    async fn creates_missing_output_directory() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"data".to_vec()))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("drop");
        assert!(!nested.exists());

        let materializer = Materializer::new(&nested).unwrap();
        materializer.materialize(&server.uri(), "a.bin").await.unwrap();
        assert!(nested.join("a.bin").exists());
    }

    #[tokio::test]
    async fn overwrites_existing_file_of_same_name() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"new contents".to_vec()))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let stale = dir.path().join("a.bin");
        std::fs::write(&stale, b"old contents that were much longer").unwrap();

        let materializer = Materializer::new(dir.path()).unwrap();
        let file = materializer.materialize(&server.uri(), "a.bin").await.unwrap();

        assert_eq!(std::fs::read(&file.path).unwrap(), b"new contents");
    }

    #[tokio::test]
    async fn non_success_fetch_fails_without_writing() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let materializer = Materializer::new(dir.path()).unwrap();
        let err = materializer
            .materialize(&server.uri(), "missing.bin")
            .await
            .unwrap_err();

        match err {
            Error::Upstream { status, .. } => assert_eq!(status, 404),
            other => panic!("expected Upstream error, got {other:?}"),
        }
        assert!(!dir.path().join("missing.bin").exists());
    }

    #[tokio::test]
    async fn traversal_filenames_stay_inside_the_directory() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"x".to_vec()))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let materializer = Materializer::new(dir.path()).unwrap();
        let file = materializer
            .materialize(&server.uri(), "../outside.bin")
            .await
            .unwrap();

        assert_eq!(file.name, "outside.bin");
        assert!(dir.path().join("outside.bin").exists());
    }
}
