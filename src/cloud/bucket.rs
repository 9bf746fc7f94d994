use std::path::Path;

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};

use crate::error::CollectResult;

/// A handle on one object-storage bucket.
///
/// The handle is shared by every collection task that targets the bucket, so
/// implementations must accept concurrent calls on distinct keys without
/// external locking.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ObjectBucket: Send + Sync {
    /// Whether an object is stored under `key`
    async fn object_exists(&self, key: &str) -> CollectResult<bool>;

    /// Last-modified time of the object under `key`, normalised to UTC
    async fn last_modified(&self, key: &str) -> CollectResult<DateTime<Utc>>;

    /// Store `body` under `key`, replacing any previous object
    async fn put_object(&self, key: &str, body: Bytes) -> CollectResult<()>;

    /// Store the contents of a local file under `key`
    async fn put_object_from_file(&self, key: &str, path: &Path) -> CollectResult<()>;

    /// Remove the object under `key`
    async fn delete_object(&self, key: &str) -> CollectResult<()>;

    /// Public URL at which the object under `key` can be fetched
    fn object_url(&self, key: &str) -> String;
}
