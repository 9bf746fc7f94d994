use std::collections::HashMap;
use std::path::Path;

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use log::debug;
use tokio::sync::RwLock;

use crate::cloud::bucket::ObjectBucket;
use crate::error::{CollectError, CollectResult};

#[derive(Debug, Clone)]
struct StoredObject {
    body: Bytes,
    last_modified: DateTime<Utc>,
}

/// In-process bucket used for dry runs and tests.
///
/// Objects live in a map guarded by an async `RwLock`; URLs take the form
/// `memory://<bucket>/<key>`.
#[derive(Debug, Default)]
pub struct MemoryBucket {
    name: String,
    objects: RwLock<HashMap<String, StoredObject>>,
}

impl MemoryBucket {
    pub fn new(name: &str) -> Self {
        MemoryBucket {
            name: name.to_string(),
            objects: RwLock::new(HashMap::new()),
        }
    }

    /// Bucket name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Contents of an object, if stored
    pub async fn get_object(&self, key: &str) -> Option<Bytes> {
        self.objects.read().await.get(key).map(|o| o.body.clone())
    }

    /// Sorted list of stored keys
    pub async fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.objects.read().await.keys().cloned().collect();
        keys.sort();
        keys
    }

    /// Override the last-modified stamp of a stored object
    pub async fn set_last_modified(&self, key: &str, time: DateTime<Utc>) -> bool {
        match self.objects.write().await.get_mut(key) {
            Some(object) => {
                object.last_modified = time;
                true
            }
            None => false,
        }
    }
}

#[async_trait]
impl ObjectBucket for MemoryBucket {
    async fn object_exists(&self, key: &str) -> CollectResult<bool> {
        Ok(self.objects.read().await.contains_key(key))
    }

    async fn last_modified(&self, key: &str) -> CollectResult<DateTime<Utc>> {
        self.objects
            .read()
            .await
            .get(key)
            .map(|o| o.last_modified)
            .ok_or_else(|| CollectError::storage(key, "no such object"))
    }

    async fn put_object(&self, key: &str, body: Bytes) -> CollectResult<()> {
        debug!("Storing {} bytes at memory://{}/{}", body.len(), self.name, key);
        self.objects.write().await.insert(
            key.to_string(),
            StoredObject {
                body,
                last_modified: Utc::now(),
            },
        );
        Ok(())
    }

    async fn put_object_from_file(&self, key: &str, path: &Path) -> CollectResult<()> {
        let body = tokio::fs::read(path)
            .await
            .map_err(|e| CollectError::discovery(path.to_string_lossy(), e))?;
        self.put_object(key, Bytes::from(body)).await
    }

    async fn delete_object(&self, key: &str) -> CollectResult<()> {
        self.objects.write().await.remove(key);
        Ok(())
    }

    fn object_url(&self, key: &str) -> String {
        format!("memory://{}/{}", self.name, key)
    }
}
