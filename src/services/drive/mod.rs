//! Storage backend boundary.
//!
//! [`DriveBackend`] is the set of primitives the gateway needs from Drive:
//! create, list, update and delete. [`http::GoogleDriveBackend`] talks to the
//! real Drive v3 REST API; [`memory::InMemoryDrive`] keeps objects in process
//! for local runs and tests.

pub mod auth;
pub mod http;
pub mod memory;

use crate::{
    config::AppConfig,
    models::item::{DriveFile, NewObject, ObjectPatch, UpdatedObject},
};
use anyhow::{Context, Result};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BackendError {
    #[error("drive request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("drive returned {status}: {message}")]
    Api { status: u16, message: String },
    #[error("drive authentication failed: {0}")]
    Auth(String),
    #[error("file `{0}` not found")]
    NotFound(String),
    #[error("`{0}` is not a valid file id")]
    InvalidFileId(String),
    #[error("invalid drive endpoint: {0}")]
    InvalidEndpoint(String),
}

pub type BackendResult<T> = Result<T, BackendError>;

#[async_trait]
pub trait DriveBackend: Send + Sync {
    /// Create a file under `object.parent_id` and return its id.
    async fn create_object(&self, object: NewObject) -> BackendResult<String>;

    /// List every file directly under `parent_id`, in backend order.
    async fn list_objects(&self, parent_id: &str) -> BackendResult<Vec<DriveFile>>;

    /// Replace name, metadata and content of an existing file.
    async fn update_object(&self, id: &str, patch: ObjectPatch) -> BackendResult<UpdatedObject>;

    async fn delete_object(&self, id: &str) -> BackendResult<()>;
}

/// Build the backend selected by configuration.
pub fn build_backend(cfg: &AppConfig) -> Result<Arc<dyn DriveBackend>> {
    if cfg.memory_backend {
        tracing::warn!("Using in-memory backend; stored files are lost on exit");
        return Ok(Arc::new(memory::InMemoryDrive::new()));
    }

    let key = cfg
        .credentials
        .clone()
        .context("Drive credentials are not configured")?;
    let backend =
        http::GoogleDriveBackend::new(key, cfg.endpoints.clone(), cfg.request_timeout)
            .context("building Drive HTTP client")?;
    Ok(Arc::new(backend))
}
