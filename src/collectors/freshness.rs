use std::io::ErrorKind;
use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use log::debug;

use crate::cloud::bucket::ObjectBucket;
use crate::collectable::Collectable;
use crate::error::{CollectError, CollectResult};
use crate::utils::paths::to_object_key;

/// Decides whether a destination has to be (re)written.
///
/// Validators only read: neither the entity nor the destination is touched.
#[async_trait]
pub trait FreshValidator: Send + Sync {
    async fn needs_collect(
        &self,
        entity: &dyn Collectable,
        base: &Path,
        object_key: &str,
    ) -> CollectResult<bool>;
}

/// Compares against the file at `base/object_key`
#[derive(Debug, Default, Clone, Copy)]
pub struct LocalFreshValidator;

#[async_trait]
impl FreshValidator for LocalFreshValidator {
    async fn needs_collect(
        &self,
        entity: &dyn Collectable,
        base: &Path,
        object_key: &str,
    ) -> CollectResult<bool> {
        let target = base.join(object_key);

        let metadata = match tokio::fs::metadata(&target).await {
            Ok(metadata) => metadata,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("{} does not exist yet", target.display());
                return Ok(true);
            }
            Err(e) => return Err(CollectError::write(target.to_string_lossy(), e)),
        };

        match metadata.modified() {
            Ok(modified) => Ok(entity.is_updated_since(DateTime::<Utc>::from(modified))),
            // No usable timestamp on this platform
            Err(_) => Ok(true),
        }
    }
}

/// Compares against the object under `object_key` in a bucket
pub struct RemoteFreshValidator {
    bucket: Arc<dyn ObjectBucket>,
}

impl RemoteFreshValidator {
    pub fn new(bucket: Arc<dyn ObjectBucket>) -> Self {
        RemoteFreshValidator { bucket }
    }
}

#[async_trait]
impl FreshValidator for RemoteFreshValidator {
    async fn needs_collect(
        &self,
        entity: &dyn Collectable,
        _base: &Path,
        object_key: &str,
    ) -> CollectResult<bool> {
        let key = to_object_key(object_key);
        if !self.bucket.object_exists(&key).await? {
            debug!("Object {} does not exist yet", key);
            return Ok(true);
        }

        let stored = self.bucket.last_modified(&key).await?;
        Ok(entity.is_updated_since(stored))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cloud::bucket::MockObjectBucket;
    use crate::collectable::LeafFile;
    use chrono::{Duration, TimeZone};
    use tempfile::TempDir;

    async fn source_file(dir: &TempDir) -> LeafFile {
        let path = dir.path().join("src.png");
        std::fs::write(&path, b"img").unwrap();
        LeafFile::open("", &path.to_string_lossy()).await
    }

    #[tokio::test]
    async fn test_local_missing_destination() {
        let dir = TempDir::new().unwrap();
        let entity = source_file(&dir).await;

        let needs = LocalFreshValidator
            .needs_collect(&entity, dir.path(), "out/dst.png")
            .await
            .unwrap();
        assert!(needs);
    }

    #[tokio::test]
    async fn test_local_newer_destination_is_fresh() {
        let dir = TempDir::new().unwrap();
        let entity = source_file(&dir).await;
        // Written after the source, so never older
        std::fs::write(dir.path().join("dst.png"), b"img").unwrap();

        let needs = LocalFreshValidator
            .needs_collect(&entity, dir.path(), "dst.png")
            .await
            .unwrap();
        assert!(!needs);
    }

    #[tokio::test]
    async fn test_local_older_destination_needs_collect() {
        let dir = TempDir::new().unwrap();
        let dst = dir.path().join("dst.png");
        std::fs::write(&dst, b"old").unwrap();
        let old = std::time::SystemTime::UNIX_EPOCH + std::time::Duration::from_secs(86_400);
        std::fs::File::options()
            .write(true)
            .open(&dst)
            .unwrap()
            .set_modified(old)
            .unwrap();
        let entity = source_file(&dir).await;

        let needs = LocalFreshValidator
            .needs_collect(&entity, dir.path(), "dst.png")
            .await
            .unwrap();
        assert!(needs);
    }

    #[tokio::test]
    async fn test_local_unreadable_source_always_collects() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("dst.png"), b"img").unwrap();
        let entity = LeafFile::open("", "/nonexistent/src.png").await;

        let needs = LocalFreshValidator
            .needs_collect(&entity, dir.path(), "dst.png")
            .await
            .unwrap();
        assert!(needs);
    }

    #[tokio::test]
    async fn test_remote_missing_object() {
        let dir = TempDir::new().unwrap();
        let entity = source_file(&dir).await;

        let mut bucket = MockObjectBucket::new();
        bucket
            .expect_object_exists()
            .withf(|key| key == "notes/a.png")
            .returning(|_| Ok(false));
        bucket.expect_last_modified().never();

        let validator = RemoteFreshValidator::new(Arc::new(bucket));
        assert!(validator.needs_collect(&entity, dir.path(), "/notes/a.png").await.unwrap());
    }

    #[tokio::test]
    async fn test_remote_compares_timestamps() {
        let dir = TempDir::new().unwrap();
        let entity = source_file(&dir).await;
        let source_time = entity.updated_time().unwrap();

        let newer = source_time + Duration::hours(1);
        let mut bucket = MockObjectBucket::new();
        bucket.expect_object_exists().returning(|_| Ok(true));
        bucket.expect_last_modified().returning(move |_| Ok(newer));
        let validator = RemoteFreshValidator::new(Arc::new(bucket));
        assert!(!validator.needs_collect(&entity, dir.path(), "a.png").await.unwrap());

        let older = Utc.with_ymd_and_hms(2000, 1, 1, 0, 0, 0).unwrap();
        let mut bucket = MockObjectBucket::new();
        bucket.expect_object_exists().returning(|_| Ok(true));
        bucket.expect_last_modified().returning(move |_| Ok(older));
        let validator = RemoteFreshValidator::new(Arc::new(bucket));
        assert!(validator.needs_collect(&entity, dir.path(), "a.png").await.unwrap());
    }

    #[tokio::test]
    async fn test_remote_metadata_error_propagates() {
        let dir = TempDir::new().unwrap();
        let entity = source_file(&dir).await;

        let mut bucket = MockObjectBucket::new();
        bucket
            .expect_object_exists()
            .returning(|key| Err(CollectError::storage(key, "403 Forbidden")));
        let validator = RemoteFreshValidator::new(Arc::new(bucket));

        let err = validator.needs_collect(&entity, dir.path(), "a.png").await.unwrap_err();
        assert!(matches!(err, CollectError::Storage { .. }));
    }
}
