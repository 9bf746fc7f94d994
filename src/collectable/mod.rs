//! Files that can be collected.
//!
//! A [`Collectable`] wraps one file (a document or an asset) and knows how to
//! discover the files it references, rewrite those references, and write
//! itself to a local path or an object-storage bucket.
//!
//! Opening a file never fails. A read or stat error is captured inside the
//! entity and returned by every later operation, so a broken dependency only
//! surfaces when the collector actually reaches it.
//!
//! Every operation takes a [`CancellationToken`] and checks it on entry. An
//! operation that has already started runs to completion.
//!
//! ## Variants
//!
//! - [`LeafFile`]: any file without references (images and the like)
//! - [`MarkdownFile`]: a Markdown document whose image references are dependencies

use std::path::Path;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio_util::sync::CancellationToken;

use crate::cloud::bucket::ObjectBucket;
use crate::error::{CollectError, CollectResult};
use crate::models::FileType;

pub mod leaf;
pub mod mapper;
pub mod markdown;
pub mod source;

pub use leaf::LeafFile;
pub use mapper::{LocalReferenceMapper, ReferenceMapper, RemoteReferenceMapper, RoutingReferenceMapper};
pub use markdown::MarkdownFile;

/// Identity and attributes shared by every collectable file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileAttrs {
    /// URI of the document that referenced this file, empty for roots
    pub parent: String,
    /// Absolute path or URL of the file
    pub uri: String,
    pub file_type: FileType,
    /// Source modification time, `None` when unknown
    pub updated_time: Option<DateTime<Utc>>,
    /// Error captured while opening the file
    pub error: Option<CollectError>,
}

impl FileAttrs {
    pub fn new(file_type: FileType, parent: &str, uri: &str) -> Self {
        FileAttrs {
            parent: parent.to_string(),
            uri: uri.to_string(),
            file_type,
            updated_time: None,
            error: None,
        }
    }

    /// Entry check for every operation: cancellation first, then the captured error
    pub fn guard(&self, cancel: &CancellationToken) -> CollectResult<()> {
        if cancel.is_cancelled() {
            return Err(CollectError::Cancelled {
                uri: self.uri.clone(),
            });
        }
        match &self.error {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }

    /// Unknown modification times always count as updated
    pub fn is_updated_since(&self, time: DateTime<Utc>) -> bool {
        match self.updated_time {
            Some(updated) => updated > time,
            None => true,
        }
    }
}

#[async_trait]
pub trait Collectable: Send + Sync {
    fn attrs(&self) -> &FileAttrs;

    fn file_type(&self) -> FileType {
        self.attrs().file_type
    }

    fn parent(&self) -> &str {
        &self.attrs().parent
    }

    fn uri(&self) -> &str {
        &self.attrs().uri
    }

    fn updated_time(&self) -> Option<DateTime<Utc>> {
        self.attrs().updated_time
    }

    /// Whether the source changed after `time`
    fn is_updated_since(&self, time: DateTime<Utc>) -> bool {
        self.attrs().is_updated_since(time)
    }

    fn discovery_error(&self) -> Option<&CollectError> {
        self.attrs().error.as_ref()
    }

    /// Files referenced by this one, in the order they appear
    async fn find_dependencies(
        &self,
        cancel: &CancellationToken,
    ) -> CollectResult<Vec<Box<dyn Collectable>>>;

    /// Rewrite every embedded reference with `mapper`, in a single pass
    fn replace_dependency_references(
        &mut self,
        cancel: &CancellationToken,
        base: &Path,
        object_key: &str,
        mapper: &dyn ReferenceMapper,
    ) -> CollectResult<()>;

    /// Write the file to a local path
    async fn write_to(&self, cancel: &CancellationToken, target: &Path) -> CollectResult<()>;

    /// Store the file under `key` in a bucket
    async fn put_to(
        &self,
        cancel: &CancellationToken,
        bucket: &dyn ObjectBucket,
        key: &str,
    ) -> CollectResult<()>;
}

/// Open a file as the collectable variant matching `file_type`
pub async fn open_collectable(file_type: FileType, parent: &str, uri: &str) -> Box<dyn Collectable> {
    if file_type.is_composite() {
        Box::new(MarkdownFile::open(parent, uri).await)
    } else {
        Box::new(LeafFile::open(parent, uri).await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn attrs_at(time: Option<DateTime<Utc>>) -> FileAttrs {
        let mut attrs = FileAttrs::new(FileType::Standalone, "", "/tmp/a.png");
        attrs.updated_time = time;
        attrs
    }

    #[test]
    fn test_is_updated_since() {
        let t = Utc.with_ymd_and_hms(2023, 5, 1, 12, 0, 0).unwrap();
        assert!(attrs_at(None).is_updated_since(t));
        assert!(attrs_at(Some(t + Duration::seconds(1))).is_updated_since(t));
        assert!(!attrs_at(Some(t)).is_updated_since(t));
        assert!(!attrs_at(Some(t - Duration::seconds(1))).is_updated_since(t));
    }

    #[test]
    fn test_guard_checks_cancellation_before_captured_error() {
        let mut attrs = attrs_at(None);
        attrs.error = Some(CollectError::discovery("/tmp/a.png", "denied"));

        let token = CancellationToken::new();
        assert_eq!(attrs.guard(&token), Err(CollectError::discovery("/tmp/a.png", "denied")));

        token.cancel();
        assert!(attrs.guard(&token).unwrap_err().is_cancelled());
    }

    #[tokio::test]
    async fn test_open_collectable_picks_variant() {
        let dir = tempfile::TempDir::new().unwrap();
        let doc = dir.path().join("a.md");
        std::fs::write(&doc, b"text").unwrap();
        let uri = doc.to_string_lossy().to_string();

        let entity = open_collectable(FileType::Markdown, "", &uri).await;
        assert_eq!(entity.file_type(), FileType::Markdown);
        assert!(entity.discovery_error().is_none());

        let entity = open_collectable(FileType::Standalone, "", &uri).await;
        assert_eq!(entity.file_type(), FileType::Standalone);
    }
}
