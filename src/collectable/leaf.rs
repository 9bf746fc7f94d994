use std::path::Path;

use async_trait::async_trait;
use log::debug;
use tokio_util::sync::CancellationToken;

use crate::cloud::bucket::ObjectBucket;
use crate::collectable::mapper::ReferenceMapper;
use crate::collectable::source::{canonical_uri, fetch_bytes, prepare_target, stat_source, write_bytes};
use crate::collectable::{Collectable, FileAttrs};
use crate::error::{CollectError, CollectResult};
use crate::models::FileType;
use crate::utils::paths::{is_remote_uri, normalize_path};

/// A file with no dependencies, such as an image.
///
/// Opening only checks that the source exists. The content is streamed when
/// the file is committed.
#[derive(Debug, Clone)]
pub struct LeafFile {
    attrs: FileAttrs,
}

impl LeafFile {
    pub async fn open(parent: &str, uri: &str) -> Self {
        let uri = canonical_uri(uri);
        let mut attrs = FileAttrs::new(FileType::Standalone, parent, &uri);

        match stat_source(&uri).await {
            Ok(updated) => attrs.updated_time = updated,
            Err(e) => {
                debug!("Captured error while opening {}: {}", uri, e);
                attrs.error = Some(e);
            }
        }

        LeafFile { attrs }
    }
}

#[async_trait]
impl Collectable for LeafFile {
    fn attrs(&self) -> &FileAttrs {
        &self.attrs
    }

    async fn find_dependencies(
        &self,
        cancel: &CancellationToken,
    ) -> CollectResult<Vec<Box<dyn Collectable>>> {
        self.attrs.guard(cancel)?;
        Ok(Vec::new())
    }

    fn replace_dependency_references(
        &mut self,
        cancel: &CancellationToken,
        _base: &Path,
        _object_key: &str,
        _mapper: &dyn ReferenceMapper,
    ) -> CollectResult<()> {
        self.attrs.guard(cancel)
    }

    async fn write_to(&self, cancel: &CancellationToken, target: &Path) -> CollectResult<()> {
        self.attrs.guard(cancel)?;
        let uri = &self.attrs.uri;

        if is_remote_uri(uri) {
            let content = fetch_bytes(uri).await?;
            return write_bytes(target, &content).await;
        }

        if normalize_path(target) == Path::new(uri) {
            debug!("{} is its own destination, nothing to copy", uri);
            return Ok(());
        }

        prepare_target(target).await?;
        tokio::fs::copy(uri, target)
            .await
            .map_err(|e| CollectError::write(target.to_string_lossy(), e))?;
        Ok(())
    }

    async fn put_to(
        &self,
        cancel: &CancellationToken,
        bucket: &dyn ObjectBucket,
        key: &str,
    ) -> CollectResult<()> {
        self.attrs.guard(cancel)?;
        let uri = &self.attrs.uri;

        if is_remote_uri(uri) {
            let content = fetch_bytes(uri).await?;
            bucket.put_object(key, content).await
        } else {
            bucket.put_object_from_file(key, Path::new(uri)).await
        }
    }
}
