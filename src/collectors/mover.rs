use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use log::debug;
use tokio_util::sync::CancellationToken;

use crate::cloud::bucket::ObjectBucket;
use crate::collectable::Collectable;
use crate::error::CollectResult;
use crate::utils::paths::to_object_key;

/// Writes a collectable to its destination backend
#[async_trait]
pub trait Mover: Send + Sync {
    async fn commit(
        &self,
        entity: &dyn Collectable,
        cancel: &CancellationToken,
        base: &Path,
        object_key: &str,
    ) -> CollectResult<()>;
}

/// Writes to `base/object_key` on the local filesystem
#[derive(Debug, Default, Clone, Copy)]
pub struct LocalMover;

#[async_trait]
impl Mover for LocalMover {
    async fn commit(
        &self,
        entity: &dyn Collectable,
        cancel: &CancellationToken,
        base: &Path,
        object_key: &str,
    ) -> CollectResult<()> {
        let target = base.join(object_key);
        debug!("Writing {} to {}", entity.uri(), target.display());
        entity.write_to(cancel, &target).await
    }
}

/// Puts the object under `object_key` in a bucket
pub struct RemoteMover {
    bucket: Arc<dyn ObjectBucket>,
}

impl RemoteMover {
    pub fn new(bucket: Arc<dyn ObjectBucket>) -> Self {
        RemoteMover { bucket }
    }
}

#[async_trait]
impl Mover for RemoteMover {
    async fn commit(
        &self,
        entity: &dyn Collectable,
        cancel: &CancellationToken,
        _base: &Path,
        object_key: &str,
    ) -> CollectResult<()> {
        let key = to_object_key(object_key);
        debug!("Uploading {} as {}", entity.uri(), key);
        entity.put_to(cancel, self.bucket.as_ref(), &key).await
    }
}
