//! Process-local backend.
//!
//! Objects live in a vector in insertion order, so listings come back in the
//! order files were created. Nothing survives a restart.

use super::{BackendError, BackendResult, DriveBackend};
use crate::models::item::{DriveFile, NewObject, ObjectPatch, UpdatedObject};
use async_trait::async_trait;
use bytes::Bytes;
use tokio::sync::RwLock;
use uuid::Uuid;

/// One object as held by [`InMemoryDrive`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StoredObject {
    pub id: String,
    pub name: String,
    pub parent_id: String,
    pub description: Option<String>,
    pub mime_type: String,
    pub content: Bytes,
}

#[derive(Debug, Default)]
pub struct InMemoryDrive {
    objects: RwLock<Vec<StoredObject>>,
}

impl InMemoryDrive {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetch a stored object, including its content.
    pub async fn get(&self, id: &str) -> Option<StoredObject> {
        self.objects
            .read()
            .await
            .iter()
            .find(|object| object.id == id)
            .cloned()
    }

    /// Insert an object as-is, e.g. one written by another client.
    pub async fn insert(&self, object: StoredObject) {
        self.objects.write().await.push(object);
    }
}

#[async_trait]
impl DriveBackend for InMemoryDrive {
    async fn create_object(&self, object: NewObject) -> BackendResult<String> {
        let id = Uuid::new_v4().simple().to_string();
        self.insert(StoredObject {
            id: id.clone(),
            name: object.name,
            parent_id: object.parent_id,
            description: Some(object.description),
            mime_type: object.media.mime_type,
            content: object.media.content,
        })
        .await;
        Ok(id)
    }

    async fn list_objects(&self, parent_id: &str) -> BackendResult<Vec<DriveFile>> {
        Ok(self
            .objects
            .read()
            .await
            .iter()
            .filter(|object| object.parent_id == parent_id)
            .map(|object| DriveFile {
                id: object.id.clone(),
                name: object.name.clone(),
                description: object.description.clone(),
            })
            .collect())
    }

    async fn update_object(&self, id: &str, patch: ObjectPatch) -> BackendResult<UpdatedObject> {
        let mut objects = self.objects.write().await;
        let object = objects
            .iter_mut()
            .find(|object| object.id == id)
            .ok_or_else(|| BackendError::NotFound(id.to_string()))?;

        object.name = patch.name;
        object.description = Some(patch.description);
        object.mime_type = patch.media.mime_type;
        object.content = patch.media.content;

        Ok(UpdatedObject {
            id: object.id.clone(),
            name: object.name.clone(),
        })
    }

    async fn delete_object(&self, id: &str) -> BackendResult<()> {
        let mut objects = self.objects.write().await;
        let before = objects.len();
        objects.retain(|object| object.id != id);
        if objects.len() == before {
            return Err(BackendError::NotFound(id.to_string()));
        }
        Ok(())
    }
}
