//! Core relay orchestration: lookup, materialize, retain, resolve
//!
//! [`AttachmentRelay`] is the Arc-shared hub the HTTP layer drives. It owns
//! the lookup client, the materializer and the retention scheduler, all
//! constructed once from an explicit [`Config`].

use crate::airtable::AirtableClient;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::materializer::{LocalFile, Materializer};
use crate::retention::RetentionScheduler;
use crate::utils::is_safe_serve_name;
use std::path::PathBuf;
use std::sync::Arc;

/// Shared relay core tying the lookup, materialization and retention steps
/// together
pub struct AttachmentRelay {
    /// Configuration (read-only after startup)
    pub config: Arc<Config>,

    lookup: AirtableClient,
    materializer: Materializer,
    retention: Arc<RetentionScheduler>,
}

impl AttachmentRelay {
    /// Build the relay from a configuration
    pub fn new(config: Config) -> Result<Self> {
        let lookup = AirtableClient::new(&config.airtable)?;
        let materializer = Materializer::new(config.download.download_dir.clone())?;
        let retention = RetentionScheduler::new(config.retention.file_ttl);

        Ok(Self {
            config: Arc::new(config),
            lookup,
            materializer,
            retention,
        })
    }

    /// The retention scheduler (deferred serve mode)
    pub fn retention(&self) -> &Arc<RetentionScheduler> {
        &self.retention
    }

    /// Look up the named field and materialize its first attachment.
    ///
    /// Returns `Ok(None)` when the table holds no usable attachment for the
    /// field; materialization failures propagate.
    ///
    /// The target path is claimed in the retention scheduler before the
    /// overwrite, so a timer from an earlier request for the same field
    /// expiring mid-materialization cannot delete the fresh file.
    pub async fn fetch_field(&self, field_name: &str) -> Result<Option<LocalFile>> {
        let Some(attachment) = self.lookup.first_attachment(field_name).await? else {
            tracing::info!(field = %field_name, "No attachment found");
            return Ok(None);
        };

        tracing::info!(
            field = %field_name,
            file = %attachment.filename,
            "Materializing attachment"
        );
        let target = self.materializer.target_path(&attachment.filename);
        self.retention.claim(target.clone()).await;

        match self
            .materializer
            .materialize(&attachment.url, &attachment.filename)
            .await
        {
            Ok(file) => Ok(Some(file)),
            Err(e) => {
                self.retention.cancel(&target).await;
                Err(e)
            }
        }
    }

    /// Arm (or re-arm) the deletion timer for a materialized file
    pub async fn schedule_cleanup(&self, file: &LocalFile) {
        self.retention.schedule(file.path.clone()).await;
    }

    /// Remove a materialized file immediately, disarming any timer.
    ///
    /// Used by the direct serve mode once the bytes have been read for the
    /// response. A missing file is not an error.
    pub async fn discard(&self, file: &LocalFile) {
        self.retention.cancel(&file.path).await;
        match tokio::fs::remove_file(&file.path).await {
            Ok(()) => tracing::debug!(file = %file.path.display(), "Discarded served file"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => {
                tracing::warn!(file = %file.path.display(), error = %e, "Failed to discard file");
            }
        }
    }

    /// Resolve a previously materialized file by its flat name.
    ///
    /// Rejects names that could escape the download directory and reports
    /// [`Error::FileNotFound`] for anything not currently on disk (never
    /// materialized, or already deleted by its timer).
    pub async fn resolve_file(&self, name: &str) -> Result<(PathBuf, u64)> {
        if !is_safe_serve_name(name) {
            return Err(Error::FileNotFound {
                name: name.to_string(),
            });
        }

        let path = self.materializer.output_dir().join(name);
        match tokio::fs::metadata(&path).await {
            Ok(meta) if meta.is_file() => Ok((path, meta.len())),
            _ => Err(Error::FileNotFound {
                name: name.to_string(),
            }),
        }
    }
}
