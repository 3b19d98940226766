use crate::services::{
    drive::{
        auth::ServiceAccountKey,
        http::{DEFAULT_API_BASE, DEFAULT_UPLOAD_BASE, DriveEndpoints},
    },
    metadata_codec::{DEFAULT_THUMBNAIL_TEMPLATE, ThumbnailTemplate},
};
use anyhow::{Context, Result, bail};
use axum::http::HeaderValue;
use base64::{Engine as _, engine::general_purpose};
use clap::Parser;
use std::{
    collections::HashMap,
    env,
    fmt::Display,
    fs,
    path::{Path, PathBuf},
    str::FromStr,
    time::Duration,
};

/// Folder id used by the in-memory backend when none is configured.
pub const MEMORY_FOLDER_ID: &str = "local";

/// Centralized application configuration.
/// Combines environment variables and CLI arguments.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub folder_id: String,
    pub credentials: Option<ServiceAccountKey>,
    pub thumbnails: ThumbnailTemplate,
    pub request_timeout: Duration,
    pub max_upload_bytes: usize,
    /// Allowed CORS origins; `None` allows any origin.
    pub cors_origins: Option<Vec<HeaderValue>>,
    pub endpoints: DriveEndpoints,
    pub memory_backend: bool,
}

/// Command-line + environment configuration.
#[derive(Parser, Debug, Default)]
#[command(author, version, about = "HTTP gateway for files and metadata in a Google Drive folder")]
pub struct Args {
    /// Host to bind to (overrides DRIVE_GATEWAY_HOST)
    #[arg(long)]
    pub host: Option<String>,

    /// Port to bind to (overrides PORT)
    #[arg(long)]
    pub port: Option<u16>,

    /// Drive folder holding the files (overrides DRIVE_GATEWAY_FOLDER_ID)
    #[arg(long)]
    pub folder_id: Option<String>,

    /// Service-account JSON key file (overrides GOOGLE_CLOUD_KEY)
    #[arg(long)]
    pub credentials_file: Option<PathBuf>,

    /// Thumbnail URL template containing `{id}` (overrides DRIVE_GATEWAY_THUMBNAIL_URL)
    #[arg(long)]
    pub thumbnail_url: Option<String>,

    /// Drive request timeout in seconds (overrides DRIVE_GATEWAY_TIMEOUT_SECS)
    #[arg(long)]
    pub timeout_secs: Option<u64>,

    /// Maximum accepted request body in bytes (overrides DRIVE_GATEWAY_MAX_UPLOAD_BYTES)
    #[arg(long)]
    pub max_upload_bytes: Option<usize>,

    /// Comma-separated allowed CORS origins (overrides DRIVE_GATEWAY_CORS_ORIGINS)
    #[arg(long)]
    pub cors_origins: Option<String>,

    /// Drive API base URL (overrides DRIVE_GATEWAY_API_BASE)
    #[arg(long)]
    pub api_base: Option<String>,

    /// Drive upload base URL (overrides DRIVE_GATEWAY_UPLOAD_BASE)
    #[arg(long)]
    pub upload_base: Option<String>,

    /// Keep files in memory instead of Google Drive
    #[arg(long)]
    pub memory_backend: bool,
}

impl AppConfig {
    /// Parse environment variables + CLI args into AppConfig.
    ///
    /// Variables from a `.env` file in the working directory fill in
    /// whatever the process environment leaves unset.
    pub fn from_env_and_args() -> Result<Self> {
        let dotenv = read_env_file(Path::new(".env"))?;
        if !dotenv.is_empty() {
            tracing::debug!(count = dotenv.len(), "loaded variables from .env");
        }
        Self::resolve(Args::parse(), |key| {
            env::var(key).ok().or_else(|| dotenv.get(key).cloned())
        })
    }

    /// Merge parsed arguments with values from `lookup`; arguments win.
    pub fn resolve(args: Args, lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let env_or = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.into());

        let host = args
            .host
            .unwrap_or_else(|| env_or("DRIVE_GATEWAY_HOST", "0.0.0.0"));
        let port = match args.port {
            Some(port) => port,
            None => parse_env(&lookup, "PORT", 5001)?,
        };
        let timeout_secs = match args.timeout_secs {
            Some(secs) => secs,
            None => parse_env(&lookup, "DRIVE_GATEWAY_TIMEOUT_SECS", 30)?,
        };
        let max_upload_bytes = match args.max_upload_bytes {
            Some(bytes) => bytes,
            None => parse_env(&lookup, "DRIVE_GATEWAY_MAX_UPLOAD_BYTES", 25 * 1024 * 1024)?,
        };

        let thumbnail_url = args
            .thumbnail_url
            .unwrap_or_else(|| env_or("DRIVE_GATEWAY_THUMBNAIL_URL", DEFAULT_THUMBNAIL_TEMPLATE));
        let thumbnails = ThumbnailTemplate::new(thumbnail_url).context("parsing thumbnail URL")?;

        let cors_origins = args
            .cors_origins
            .or_else(|| lookup("DRIVE_GATEWAY_CORS_ORIGINS"))
            .map(|raw| parse_origins(&raw))
            .transpose()?
            .filter(|origins| !origins.is_empty());

        let endpoints = DriveEndpoints {
            api_base: args
                .api_base
                .unwrap_or_else(|| env_or("DRIVE_GATEWAY_API_BASE", DEFAULT_API_BASE)),
            upload_base: args
                .upload_base
                .unwrap_or_else(|| env_or("DRIVE_GATEWAY_UPLOAD_BASE", DEFAULT_UPLOAD_BASE)),
        };

        let credentials = match &args.credentials_file {
            Some(path) => {
                let json = fs::read_to_string(path)
                    .with_context(|| format!("reading credentials file {}", path.display()))?;
                Some(
                    ServiceAccountKey::from_json(&json)
                        .with_context(|| format!("parsing credentials file {}", path.display()))?,
                )
            }
            None => lookup("GOOGLE_CLOUD_KEY")
                .map(|encoded| decode_key(&encoded))
                .transpose()?,
        };

        let folder_id = args
            .folder_id
            .or_else(|| lookup("DRIVE_GATEWAY_FOLDER_ID"))
            .filter(|id| !id.trim().is_empty());

        let folder_id = match (folder_id, args.memory_backend) {
            (Some(id), _) => id,
            (None, true) => MEMORY_FOLDER_ID.to_string(),
            (None, false) => bail!("DRIVE_GATEWAY_FOLDER_ID or --folder-id is required"),
        };
        if !args.memory_backend && credentials.is_none() {
            bail!("GOOGLE_CLOUD_KEY or --credentials-file is required");
        }

        Ok(Self {
            host,
            port,
            folder_id,
            credentials,
            thumbnails,
            request_timeout: Duration::from_secs(timeout_secs),
            max_upload_bytes,
            cors_origins,
            endpoints,
            memory_backend: args.memory_backend,
        })
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_env<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: Display,
{
    match lookup(key) {
        Some(value) => value
            .trim()
            .parse::<T>()
            .map_err(|err| anyhow::anyhow!("{err}"))
            .with_context(|| format!("parsing {} value `{}`", key, value)),
        None => Ok(default),
    }
}

/// Read a dotenv file into a map. A missing file yields no entries.
pub fn read_env_file(path: &Path) -> Result<HashMap<String, String>> {
    let entries = match dotenvy::from_path_iter(path) {
        Ok(entries) => entries,
        Err(err) if err.not_found() => return Ok(HashMap::new()),
        Err(err) => return Err(err).with_context(|| format!("opening {}", path.display())),
    };
    entries
        .map(|entry| entry.with_context(|| format!("parsing {}", path.display())))
        .collect()
}

/// Decode the base64-encoded service-account JSON held in `GOOGLE_CLOUD_KEY`.
fn decode_key(encoded: &str) -> Result<ServiceAccountKey> {
    let bytes = general_purpose::STANDARD
        .decode(encoded.trim())
        .context("decoding GOOGLE_CLOUD_KEY as base64")?;
    let json = String::from_utf8(bytes).context("GOOGLE_CLOUD_KEY is not UTF-8")?;
    ServiceAccountKey::from_json(&json).context("parsing GOOGLE_CLOUD_KEY service-account JSON")
}

/// Split a comma-separated origin list. `*` entries are dropped; any other
/// entry that is not a valid header value fails the whole list.
fn parse_origins(raw: &str) -> Result<Vec<HeaderValue>> {
    raw.split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty() && *origin != "*")
        .map(|origin| {
            HeaderValue::from_str(origin)
                .with_context(|| format!("invalid CORS origin `{}`", origin.escape_debug()))
        })
        .collect()
}
