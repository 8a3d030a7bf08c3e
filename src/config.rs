//! Configuration types for tabledrop

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::{net::SocketAddr, path::PathBuf, time::Duration};
use utoipa::ToSchema;

/// Remote tabular API configuration (credentials and addressing)
///
/// Groups settings for the Airtable-style record API the relay reads
/// attachments from. Used as a nested sub-config within [`Config`].
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct AirtableConfig {
    /// Bearer token used to authenticate record-listing requests
    #[serde(default)]
    pub api_key: String,

    /// Base (container) identifier, e.g. "appXXXXXXXXXXXXXX"
    #[serde(default)]
    pub base_id: String,

    /// Table name within the base
    #[serde(default)]
    pub table_name: String,

    /// Root URL of the record API (default: "https://api.airtable.com/v0")
    #[serde(default = "default_api_url")]
    pub api_url: String,
}

impl Default for AirtableConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_id: String::new(),
            table_name: String::new(),
            api_url: default_api_url(),
        }
    }
}

/// Download behavior configuration
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct DownloadConfig {
    /// Directory where materialized files land (default: "downloads")
    #[serde(default = "default_download_dir")]
    pub download_dir: PathBuf,
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            download_dir: default_download_dir(),
        }
    }
}

/// How `GET /get-file/` delivers the materialized attachment
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ServeMode {
    /// Stream the file bytes back in the response body, then delete it
    Direct,
    /// Respond with a download ticket and keep the file until its TTL expires
    Deferred,
}

impl Default for ServeMode {
    fn default() -> Self {
        ServeMode::Deferred
    }
}

/// HTTP server configuration
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct ServerConfig {
    /// Address the API server binds to (default: 0.0.0.0:8000)
    #[serde(default = "default_bind_address")]
    #[schema(value_type = String)]
    pub bind_address: SocketAddr,

    /// Public base URL used when constructing download-ticket links
    /// (default: "http://localhost:8000")
    #[serde(default = "default_public_url")]
    pub public_url: String,

    /// Delivery mode for `GET /get-file/` (default: deferred)
    #[serde(default)]
    pub serve_mode: ServeMode,

    /// Static bearer token required on all routes (None = no authentication)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth_token: Option<String>,

    /// Whether CORS headers are emitted (default: true)
    #[serde(default = "default_true")]
    pub cors_enabled: bool,

    /// Allowed CORS origins ("*" = any; default)
    #[serde(default = "default_cors_origins")]
    pub cors_origins: Vec<String>,

    /// Whether the interactive Swagger UI is mounted at /swagger-ui
    #[serde(default)]
    pub swagger_ui: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            public_url: default_public_url(),
            serve_mode: ServeMode::default(),
            auth_token: None,
            cors_enabled: true,
            cors_origins: default_cors_origins(),
            swagger_ui: false,
        }
    }
}

/// Retention behavior for materialized files (deferred serve mode)
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct RetentionConfig {
    /// How long a materialized file is kept before automatic deletion
    /// (default: 120 seconds)
    #[serde(default = "default_file_ttl", with = "duration_secs")]
    #[schema(value_type = u64)]
    pub file_ttl: Duration,
}

impl Default for RetentionConfig {
    fn default() -> Self {
        Self {
            file_ttl: default_file_ttl(),
        }
    }
}

/// Top-level configuration, constructed once at startup and passed by
/// reference (`Arc<Config>`) to every component
#[derive(Clone, Debug, Default, Serialize, Deserialize, ToSchema)]
pub struct Config {
    /// Remote tabular API settings
    #[serde(default)]
    pub airtable: AirtableConfig,

    /// Download directory settings
    #[serde(default)]
    pub download: DownloadConfig,

    /// HTTP server settings
    #[serde(default)]
    pub server: ServerConfig,

    /// File retention settings
    #[serde(default)]
    pub retention: RetentionConfig,
}

impl Config {
    /// Build a configuration from environment variables.
    ///
    /// `AIRTABLE_API_KEY`, `BASE_ID` and `TABLE_NAME` are required; startup
    /// fails with a [`Error::Config`] naming the missing key otherwise.
    /// Optional overrides: `AIRTABLE_API_URL`, `DOWNLOAD_DIR`, `BIND_ADDRESS`,
    /// `PUBLIC_URL`, `FILE_TTL_SECS`, `SERVE_MODE` ("direct"/"deferred") and
    /// `AUTH_TOKEN`.
    pub fn from_env() -> Result<Self> {
        let mut config = Config {
            airtable: AirtableConfig {
                api_key: required_env("AIRTABLE_API_KEY")?,
                base_id: required_env("BASE_ID")?,
                table_name: required_env("TABLE_NAME")?,
                api_url: default_api_url(),
            },
            ..Config::default()
        };

        if let Ok(url) = std::env::var("AIRTABLE_API_URL") {
            config.airtable.api_url = url.trim_end_matches('/').to_string();
        }
        if let Ok(dir) = std::env::var("DOWNLOAD_DIR") {
            config.download.download_dir = PathBuf::from(dir);
        }
        if let Ok(addr) = std::env::var("BIND_ADDRESS") {
            config.server.bind_address = addr.parse().map_err(|_| Error::Config {
                message: format!("'{addr}' is not a valid socket address"),
                key: Some("BIND_ADDRESS".into()),
            })?;
        }
        if let Ok(url) = std::env::var("PUBLIC_URL") {
            config.server.public_url = url;
        }
        if let Ok(secs) = std::env::var("FILE_TTL_SECS") {
            let secs: u64 = secs.parse().map_err(|_| Error::Config {
                message: format!("'{secs}' is not a valid number of seconds"),
                key: Some("FILE_TTL_SECS".into()),
            })?;
            config.retention.file_ttl = Duration::from_secs(secs);
        }
        if let Ok(mode) = std::env::var("SERVE_MODE") {
            config.server.serve_mode = match mode.to_ascii_lowercase().as_str() {
                "direct" => ServeMode::Direct,
                "deferred" => ServeMode::Deferred,
                other => {
                    return Err(Error::Config {
                        message: format!("'{other}' is not a valid serve mode"),
                        key: Some("SERVE_MODE".into()),
                    });
                }
            };
        }
        if let Ok(token) = std::env::var("AUTH_TOKEN") {
            config.server.auth_token = Some(token);
        }

        Ok(config)
    }
}

/// Read a required environment variable, failing with the key name
fn required_env(key: &str) -> Result<String> {
    match std::env::var(key) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(Error::Config {
            message: format!("missing required environment variable {key}"),
            key: Some(key.to_string()),
        }),
    }
}

fn default_api_url() -> String {
    "https://api.airtable.com/v0".to_string()
}

fn default_download_dir() -> PathBuf {
    PathBuf::from("downloads")
}

#[allow(clippy::expect_used)]
fn default_bind_address() -> SocketAddr {
    "0.0.0.0:8000"
        .parse()
        .expect("static bind address is valid")
}

fn default_public_url() -> String {
    "http://localhost:8000".to_string()
}

fn default_file_ttl() -> Duration {
    Duration::from_secs(120)
}

fn default_true() -> bool {
    true
}

fn default_cors_origins() -> Vec<String> {
    vec!["*".to_string()]
}

/// Serialize/deserialize a Duration as whole seconds
mod duration_secs {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_secs())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let secs = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(secs))
    }
}
