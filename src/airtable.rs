//! Record lookup against the Airtable-style tabular API
//!
//! The relay only ever needs one thing from the remote table: the first
//! usable attachment in a named field. Records are scanned in the order the
//! server returns them; a field qualifies when it is a non-empty JSON array
//! whose entries look like attachment objects (`url` + `filename`).

use crate::config::AirtableConfig;
use crate::error::{Error, Result};
use crate::utils::{UNKNOWN_FILE_NAME, file_name_from_url, sanitize_file_name};
use serde::Deserialize;
use serde_json::Value;

/// Timeout for record-listing requests
const LOOKUP_TIMEOUT_SECS: u64 = 30;

/// A file reference embedded in a record field
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Attachment {
    /// Remote URL the file bytes can be fetched from
    pub url: String,
    /// Filename to materialize the download under (already sanitized)
    pub filename: String,
}

/// Wire shape of the record-listing response
#[derive(Debug, Deserialize)]
struct RecordsResponse {
    #[serde(default)]
    records: Vec<Record>,
}

/// A single record; only its field map matters here
#[derive(Debug, Deserialize)]
struct Record {
    #[serde(default)]
    fields: serde_json::Map<String, Value>,
}

/// Client for the remote tabular API
pub struct AirtableClient {
    http: reqwest::Client,
    config: AirtableConfig,
}

impl AirtableClient {
    /// Create a client for the configured base and table
    pub fn new(config: &AirtableConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(LOOKUP_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            http,
            config: config.clone(),
        })
    }

    /// URL of the record-listing endpoint for the configured table
    fn records_url(&self) -> String {
        format!(
            "{}/{}/{}",
            self.config.api_url.trim_end_matches('/'),
            self.config.base_id,
            self.config.table_name
        )
    }

    /// Find the first usable attachment in the named field.
    ///
    /// Returns `Ok(None)` when the field is absent, not a list, empty, no
    /// entry carries a URL, or the remote API answers with a non-success
    /// status — the caller cannot distinguish those cases, matching the
    /// lookup contract. Transport failures propagate as errors.
    pub async fn first_attachment(&self, field_name: &str) -> Result<Option<Attachment>> {
        let url = self.records_url();
        let response = self
            .http
            .get(&url)
            .bearer_auth(&self.config.api_key)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(
                status = %status,
                table = %self.config.table_name,
                "Record listing failed, treating as no attachment"
            );
            return Ok(None);
        }

        let body: RecordsResponse = response.json().await?;
        Ok(first_attachment_in(&body.records, field_name))
    }
}

/// Scan records in server order for the first attachment carrying a URL
fn first_attachment_in(records: &[Record], field_name: &str) -> Option<Attachment> {
    for record in records {
        let Some(Value::Array(entries)) = record.fields.get(field_name) else {
            continue;
        };

        for entry in entries {
            let Some(url) = entry.get("url").and_then(Value::as_str) else {
                continue;
            };
            if url.is_empty() {
                continue;
            }

            let filename = match entry.get("filename").and_then(Value::as_str) {
                Some(name) => sanitize_file_name(name),
                None => file_name_from_url(url).unwrap_or_else(|| UNKNOWN_FILE_NAME.to_string()),
            };

            return Some(Attachment {
                url: url.to_string(),
                filename,
            });
        }
    }

    None
}
