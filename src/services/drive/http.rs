//! Drive v3 REST backend.
//!
//! - create: `POST   {upload}/files?uploadType=multipart`
//! - list:   `GET    {api}/files?q='<folder>' in parents` (all pages)
//! - update: `PATCH  {upload}/files/{id}?uploadType=multipart`
//! - delete: `DELETE {api}/files/{id}`
//!
//! Uploads send a `multipart/related` body: the JSON file resource first,
//! then the raw media.

use super::{
    BackendError, BackendResult, DriveBackend,
    auth::{AccessTokenProvider, ServiceAccountKey},
};
use crate::models::item::{CreatedItem, DriveFile, Media, NewObject, ObjectPatch, UpdatedObject};
use async_trait::async_trait;
use reqwest::{RequestBuilder, Response, StatusCode, Url, header};
use serde::Deserialize;
use serde_json::{Value, json};
use std::time::Duration;
use tracing::debug;
use uuid::Uuid;

pub const DEFAULT_API_BASE: &str = "https://www.googleapis.com/drive/v3";
pub const DEFAULT_UPLOAD_BASE: &str = "https://www.googleapis.com/upload/drive/v3";
const LIST_PAGE_SIZE: &str = "100";
const LIST_FIELDS: &str = "nextPageToken, files(id, name, description)";

/// Base URLs of the metadata and upload endpoints.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DriveEndpoints {
    pub api_base: String,
    pub upload_base: String,
}

impl Default for DriveEndpoints {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            upload_base: DEFAULT_UPLOAD_BASE.to_string(),
        }
    }
}

impl DriveEndpoints {
    fn files(&self) -> BackendResult<Url> {
        endpoint_url(&self.api_base, None)
    }

    fn file(&self, id: &str) -> BackendResult<Url> {
        endpoint_url(&self.api_base, Some(id))
    }

    fn upload_files(&self) -> BackendResult<Url> {
        endpoint_url(&self.upload_base, None)
    }

    fn upload_file(&self, id: &str) -> BackendResult<Url> {
        endpoint_url(&self.upload_base, Some(id))
    }
}

/// `{base}/files[/{id}]`. The id is pushed as a single percent-encoded path
/// segment, so `/`, `?` and `#` inside it never leave the files collection.
fn endpoint_url(base: &str, id: Option<&str>) -> BackendResult<Url> {
    if let Some(id) = id {
        if id.is_empty() || id == "." || id == ".." {
            return Err(BackendError::InvalidFileId(id.to_string()));
        }
    }

    let mut url =
        Url::parse(base).map_err(|err| BackendError::InvalidEndpoint(format!("{base}: {err}")))?;
    {
        let mut segments = url
            .path_segments_mut()
            .map_err(|_| BackendError::InvalidEndpoint(base.to_string()))?;
        segments.pop_if_empty().push("files");
        if let Some(id) = id {
            segments.push(id);
        }
    }
    Ok(url)
}

pub struct GoogleDriveBackend {
    http: reqwest::Client,
    tokens: AccessTokenProvider,
    endpoints: DriveEndpoints,
}

impl GoogleDriveBackend {
    pub fn new(
        key: ServiceAccountKey,
        endpoints: DriveEndpoints,
        timeout: Duration,
    ) -> BackendResult<Self> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            tokens: AccessTokenProvider::new(key, http.clone()),
            http,
            endpoints,
        })
    }

    /// Attach a bearer token, send, and map non-2xx responses to errors.
    async fn send(&self, request: RequestBuilder, file_id: Option<&str>) -> BackendResult<Response> {
        let token = self.tokens.access_token().await?;
        let response = request.bearer_auth(token).send().await?;
        ensure_success(response, file_id).await
    }

    fn upload_request(&self, request: RequestBuilder, resource: &Value, media: &Media) -> RequestBuilder {
        let boundary = format!("drive-gateway-{}", Uuid::new_v4().simple());
        let body = multipart_related(resource, media, &boundary);
        request
            .query(&[("uploadType", "multipart")])
            .header(
                header::CONTENT_TYPE,
                format!("multipart/related; boundary={boundary}"),
            )
            .body(body)
    }
}

#[async_trait]
impl DriveBackend for GoogleDriveBackend {
    async fn create_object(&self, object: NewObject) -> BackendResult<String> {
        let resource = json!({
            "name": &object.name,
            "parents": [&object.parent_id],
            "description": &object.description,
            "mimeType": &object.media.mime_type,
        });
        let request = self
            .upload_request(self.http.post(self.endpoints.upload_files()?), &resource, &object.media)
            .query(&[("fields", "id")]);

        let created: CreatedItem = self.send(request, None).await?.json().await?;
        debug!(id = %created.id, "created Drive file");
        Ok(created.id)
    }

    async fn list_objects(&self, parent_id: &str) -> BackendResult<Vec<DriveFile>> {
        let query = format!("'{}' in parents", escape_query_literal(parent_id));
        let mut files = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let request = {
                let mut params = vec![
                    ("q", query.as_str()),
                    ("fields", LIST_FIELDS),
                    ("pageSize", LIST_PAGE_SIZE),
                ];
                if let Some(token) = page_token.as_deref() {
                    params.push(("pageToken", token));
                }
                self.http.get(self.endpoints.files()?).query(&params)
            };
            let page: FileList = self.send(request, None).await?.json().await?;
            files.extend(page.files);

            match page.next_page_token {
                Some(token) if !token.is_empty() => page_token = Some(token),
                _ => break,
            }
        }

        debug!(parent_id, count = files.len(), "listed Drive files");
        Ok(files)
    }

    async fn update_object(&self, id: &str, patch: ObjectPatch) -> BackendResult<UpdatedObject> {
        let resource = json!({
            "name": &patch.name,
            "description": &patch.description,
            "mimeType": &patch.media.mime_type,
        });
        let request = self
            .upload_request(self.http.patch(self.endpoints.upload_file(id)?), &resource, &patch.media)
            .query(&[("fields", "id,name")]);

        Ok(self.send(request, Some(id)).await?.json().await?)
    }

    async fn delete_object(&self, id: &str) -> BackendResult<()> {
        let request = self.http.delete(self.endpoints.file(id)?);
        self.send(request, Some(id)).await?;
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FileList {
    #[serde(default)]
    files: Vec<DriveFile>,
    #[serde(default)]
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

async fn ensure_success(response: Response, file_id: Option<&str>) -> BackendResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    if status == StatusCode::NOT_FOUND {
        if let Some(id) = file_id {
            return Err(BackendError::NotFound(id.to_string()));
        }
    }
    Err(BackendError::Api {
        status: status.as_u16(),
        message: api_error_message(&body),
    })
}

/// Extract `error.message` from a Google error envelope, or fall back to the raw body.
fn api_error_message(body: &str) -> String {
    serde_json::from_str::<ErrorEnvelope>(body)
        .map(|envelope| envelope.error.message)
        .unwrap_or_else(|_| body.trim().to_string())
}

/// Escape a value for use inside a single-quoted Drive query literal.
pub fn escape_query_literal(value: &str) -> String {
    value.replace('\\', "\\\\").replace('\'', "\\'")
}

/// Build a `multipart/related` upload body.
pub fn multipart_related(resource: &Value, media: &Media, boundary: &str) -> Vec<u8> {
    let mut body = Vec::with_capacity(media.content.len() + 512);
    body.extend_from_slice(
        format!("--{boundary}\r\nContent-Type: application/json; charset=UTF-8\r\n\r\n").as_bytes(),
    );
    body.extend_from_slice(resource.to_string().as_bytes());
    body.extend_from_slice(
        format!("\r\n--{boundary}\r\nContent-Type: {}\r\n\r\n", media.mime_type).as_bytes(),
    );
    body.extend_from_slice(&media.content);
    body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());
    body
}
