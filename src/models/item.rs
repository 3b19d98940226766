//! Drive file records and the shapes exchanged with callers.

use bytes::Bytes;
use serde::{Deserialize, Serialize};

/// MIME type used when an uploaded part does not declare one.
pub const DEFAULT_MIME_TYPE: &str = "application/octet-stream";

/// A file received from a caller, held in memory for the length of a request.
#[derive(Clone, Debug)]
pub struct UploadedFile {
    /// Original filename of the uploaded part.
    pub file_name: String,

    /// Content type declared by the part.
    pub mime_type: String,

    /// Raw payload.
    pub content: Bytes,
}

/// Media payload forwarded to the backend.
#[derive(Clone, Debug)]
pub struct Media {
    pub mime_type: String,
    pub content: Bytes,
}

impl From<UploadedFile> for Media {
    fn from(file: UploadedFile) -> Self {
        Self {
            mime_type: file.mime_type,
            content: file.content,
        }
    }
}

/// A new object to create inside a parent folder.
#[derive(Clone, Debug)]
pub struct NewObject {
    pub name: String,
    pub parent_id: String,
    /// Encoded metadata blob, stored in Drive's `description` field.
    pub description: String,
    pub media: Media,
}

/// Full replacement of an existing object's name, metadata and content.
#[derive(Clone, Debug)]
pub struct ObjectPatch {
    pub name: String,
    pub description: String,
    pub media: Media,
}

/// One file as returned by a backend listing.
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq, Eq)]
pub struct DriveFile {
    pub id: String,
    pub name: String,
    /// Raw metadata blob. Missing for files uploaded without metadata.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Backend response to a successful update.
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq, Eq)]
pub struct UpdatedObject {
    pub id: String,
    pub name: String,
}

/// Response body for `POST /upload`.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct CreatedItem {
    pub id: String,
}

/// Caller-facing projection of a stored file, as returned by `GET /list`.
///
/// `text` carries the Drive filename; the `text` key of the metadata blob
/// is not surfaced here.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ListingEntry {
    pub id: String,
    pub text: String,
    pub image: String,
    pub price: String,
    pub category: String,
    pub collection: String,
    #[serde(rename = "type")]
    pub item_type: String,
    pub description: String,
    pub how_to_use: String,
    pub price_two: String,
}
