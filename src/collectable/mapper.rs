use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;

use crate::cloud::bucket::ObjectBucket;
use crate::models::FileType;
use crate::utils::paths::{companion_dir_name, companion_key, reference_basename};

/// Computes the reference a document should carry for a relocated dependency.
///
/// Mappers are pure: the same inputs always produce the same bytes and no I/O
/// happens. They run once per matched reference during a rewrite pass.
pub trait ReferenceMapper: Send + Sync {
    fn map(&self, file_type: FileType, original: &[u8], base: &Path, object_key: &str) -> Vec<u8>;
}

/// Points references at the companion directory next to the document
#[derive(Debug, Default, Clone, Copy)]
pub struct LocalReferenceMapper;

impl ReferenceMapper for LocalReferenceMapper {
    fn map(&self, _file_type: FileType, original: &[u8], _base: &Path, object_key: &str) -> Vec<u8> {
        let basename = reference_basename(&String::from_utf8_lossy(original));
        format!("{}/{}", companion_dir_name(object_key), basename).into_bytes()
    }
}

/// Points references at the public URL of the dependency's object
pub struct RemoteReferenceMapper {
    bucket: Arc<dyn ObjectBucket>,
}

impl RemoteReferenceMapper {
    pub fn new(bucket: Arc<dyn ObjectBucket>) -> Self {
        RemoteReferenceMapper { bucket }
    }
}

impl ReferenceMapper for RemoteReferenceMapper {
    fn map(&self, _file_type: FileType, original: &[u8], _base: &Path, object_key: &str) -> Vec<u8> {
        let basename = reference_basename(&String::from_utf8_lossy(original));
        let key = format!("{}/{}", companion_key(object_key), basename);
        self.bucket.object_url(&key).into_bytes()
    }
}

/// Sends the listed file types to the remote mapper and everything else to the local one
pub struct RoutingReferenceMapper {
    remote_types: HashSet<FileType>,
    local: LocalReferenceMapper,
    remote: RemoteReferenceMapper,
}

impl RoutingReferenceMapper {
    pub fn new(bucket: Arc<dyn ObjectBucket>, remote_types: HashSet<FileType>) -> Self {
        RoutingReferenceMapper {
            remote_types,
            local: LocalReferenceMapper,
            remote: RemoteReferenceMapper::new(bucket),
        }
    }
}

impl ReferenceMapper for RoutingReferenceMapper {
    fn map(&self, file_type: FileType, original: &[u8], base: &Path, object_key: &str) -> Vec<u8> {
        if self.remote_types.contains(&file_type) {
            self.remote.map(file_type, original, base, object_key)
        } else {
            self.local.map(file_type, original, base, object_key)
        }
    }
}
