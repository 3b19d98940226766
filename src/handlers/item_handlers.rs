//! HTTP handlers for file upload, listing, update and deletion.
//! Multipart forms are parsed into [`ItemForm`] at the boundary; storage and
//! metadata concerns are delegated to `GatewayService`.

use crate::{
    errors::AppError,
    models::{
        item::{CreatedItem, DEFAULT_MIME_TYPE, ListingEntry, UpdatedObject, UploadedFile},
        metadata::ItemMetadata,
    },
    services::gateway_service::GatewayService,
};
use axum::{
    Json,
    extract::{Multipart, State, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use tracing::{debug, info};

pub const WELCOME_MESSAGE: &str = "Welcome to the Google Drive API service!";

/// Fallback filename for file parts that do not carry one.
const UNNAMED_FILE: &str = "untitled";

/// Typed view of an upload or update form.
#[derive(Debug, Default)]
pub struct ItemForm {
    pub file: Option<UploadedFile>,
    pub file_id: Option<String>,
    pub metadata: ItemMetadata,
}

/// Body of `POST /delete`.
#[derive(Debug, Deserialize)]
pub struct DeleteRequest {
    #[serde(rename = "fileId", default)]
    pub file_id: Option<String>,
}

/// Read every part of a multipart form.
///
/// `file` becomes the uploaded file, `fileId` the target id, and the eight
/// metadata names fill [`ItemMetadata`]. Other parts are ignored. A repeated
/// field keeps its last value.
pub async fn read_item_form(mut multipart: Multipart) -> Result<ItemForm, AppError> {
    let mut form = ItemForm::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::bad_request(format!("Multipart error: {e}")))?
    {
        let Some(name) = field.name().map(str::to_owned) else {
            continue;
        };

        if name == "file" {
            let file_name = field
                .file_name()
                .filter(|n| !n.is_empty())
                .unwrap_or(UNNAMED_FILE)
                .to_string();
            let mime_type = field
                .content_type()
                .unwrap_or(DEFAULT_MIME_TYPE)
                .to_string();
            let content = field
                .bytes()
                .await
                .map_err(|e| AppError::bad_request(format!("Failed to read file: {e}")))?;
            form.file = Some(UploadedFile {
                file_name,
                mime_type,
                content,
            });
            continue;
        }

        let text = field
            .text()
            .await
            .map_err(|e| AppError::bad_request(format!("Failed to read field `{name}`: {e}")))?;
        if name == "fileId" {
            form.file_id = Some(text);
        } else if !form.metadata.set_field(&name, text) {
            debug!(field = %name, "ignoring unknown form field");
        }
    }

    Ok(form)
}

/// `GET /`
pub async fn welcome() -> &'static str {
    WELCOME_MESSAGE
}

/// `POST /upload`: store a file and its metadata.
pub async fn upload_item(
    State(service): State<GatewayService>,
    multipart: Multipart,
) -> Result<Json<CreatedItem>, AppError> {
    let form = read_item_form(multipart).await?;
    if let Some(file) = &form.file {
        info!(
            file_name = %file.file_name,
            mime_type = %file.mime_type,
            size = file.content.len(),
            "upload requested"
        );
    }

    let created = service.upload(form.file, form.metadata).await?;
    Ok(Json(created))
}

/// `GET /list`: list the folder with decoded metadata.
pub async fn list_items(
    State(service): State<GatewayService>,
) -> Result<Json<Vec<ListingEntry>>, AppError> {
    Ok(Json(service.list().await?))
}

/// `POST /update`: replace a file's content and metadata.
pub async fn update_item(
    State(service): State<GatewayService>,
    multipart: Multipart,
) -> Result<Json<UpdatedObject>, AppError> {
    let form = read_item_form(multipart).await?;
    let updated = service
        .update(form.file_id, form.file, form.metadata)
        .await?;
    Ok(Json(updated))
}

/// `POST /delete`: delete a file by `fileId`.
pub async fn delete_item(
    State(service): State<GatewayService>,
    payload: Result<Json<DeleteRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(request) = payload.map_err(|rejection| AppError::bad_request(rejection.body_text()))?;
    let id = service.delete(request.file_id).await?;
    Ok((StatusCode::OK, format!("File deleted: {id}")))
}
