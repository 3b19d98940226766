//! src/services/gateway_service.rs
//!
//! GatewayService: upload, list, update and delete of files in one Drive
//! folder. Each call validates its inputs, encodes or decodes metadata, and
//! makes exactly one logical backend operation. Backend failures are passed
//! through unchanged; nothing is retried.

use crate::{
    models::{
        item::{CreatedItem, ListingEntry, NewObject, ObjectPatch, UpdatedObject, UploadedFile},
        metadata::ItemMetadata,
    },
    services::{
        drive::{BackendError, DriveBackend},
        metadata_codec::{self, ThumbnailTemplate},
    },
};
use std::sync::Arc;
use thiserror::Error;
use tracing::{error, info};

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("{0} is required")]
    MissingRequiredField(&'static str),
    #[error("fileId `{0}` contains invalid characters")]
    InvalidFileId(String),
    #[error(transparent)]
    Backend(#[from] BackendError),
}

pub type GatewayResult<T> = Result<T, GatewayError>;

#[derive(Clone)]
pub struct GatewayService {
    /// Storage backend shared by all requests.
    pub backend: Arc<dyn DriveBackend>,

    /// Drive folder that receives uploads and is listed by `list`.
    pub folder_id: String,

    /// Template for the `image` link of listing entries.
    pub thumbnails: ThumbnailTemplate,
}

impl GatewayService {
    pub fn new(
        backend: Arc<dyn DriveBackend>,
        folder_id: impl Into<String>,
        thumbnails: ThumbnailTemplate,
    ) -> Self {
        Self {
            backend,
            folder_id: folder_id.into(),
            thumbnails,
        }
    }

    /// Store a new file with its metadata in the configured folder.
    pub async fn upload(
        &self,
        file: Option<UploadedFile>,
        metadata: ItemMetadata,
    ) -> GatewayResult<CreatedItem> {
        let file = file.ok_or(GatewayError::MissingRequiredField("file"))?;
        let name = file.file_name.clone();

        let object = NewObject {
            name: name.clone(),
            parent_id: self.folder_id.clone(),
            description: metadata_codec::encode(&metadata),
            media: file.into(),
        };

        let id = self
            .backend
            .create_object(object)
            .await
            .inspect_err(|err| error!(file_name = %name, error = %err, "upload failed"))?;
        info!(id = %id, file_name = %name, "uploaded file");
        Ok(CreatedItem { id })
    }

    /// List the folder, projecting each file into a listing entry.
    pub async fn list(&self) -> GatewayResult<Vec<ListingEntry>> {
        let files = self
            .backend
            .list_objects(&self.folder_id)
            .await
            .inspect_err(|err| error!(folder_id = %self.folder_id, error = %err, "listing failed"))?;
        Ok(metadata_codec::project_all(&files, &self.thumbnails))
    }

    /// Replace content, name and the full metadata record of a file.
    pub async fn update(
        &self,
        file_id: Option<String>,
        file: Option<UploadedFile>,
        metadata: ItemMetadata,
    ) -> GatewayResult<UpdatedObject> {
        let file_id = required_id(file_id)?;
        let file = file.ok_or(GatewayError::MissingRequiredField("file"))?;

        let patch = ObjectPatch {
            name: file.file_name.clone(),
            description: metadata_codec::encode(&metadata),
            media: file.into(),
        };

        let updated = self
            .backend
            .update_object(&file_id, patch)
            .await
            .inspect_err(|err| error!(id = %file_id, error = %err, "update failed"))?;
        info!(id = %updated.id, name = %updated.name, "updated file");
        Ok(updated)
    }

    /// Delete a file, returning its id.
    pub async fn delete(&self, file_id: Option<String>) -> GatewayResult<String> {
        let file_id = required_id(file_id)?;
        self.backend
            .delete_object(&file_id)
            .await
            .inspect_err(|err| error!(id = %file_id, error = %err, "delete failed"))?;
        info!(id = %file_id, "deleted file");
        Ok(file_id)
    }
}

/// Drive file ids are URL-safe base64: letters, digits, `-` and `_`.
fn required_id(file_id: Option<String>) -> GatewayResult<String> {
    let id = file_id
        .map(|id| id.trim().to_string())
        .filter(|id| !id.is_empty())
        .ok_or(GatewayError::MissingRequiredField("fileId"))?;
    if !id
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(GatewayError::InvalidFileId(id));
    }
    Ok(id)
}
