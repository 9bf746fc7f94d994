use std::path::Path;

use async_trait::async_trait;
use bytes::Bytes;
use futures::future::join_all;
use lazy_static::lazy_static;
use log::debug;
use regex::bytes::{Captures, Regex};
use tokio_util::sync::CancellationToken;

use crate::cloud::bucket::ObjectBucket;
use crate::collectable::leaf::LeafFile;
use crate::collectable::mapper::ReferenceMapper;
use crate::collectable::source::{canonical_uri, read_source, write_bytes};
use crate::collectable::{Collectable, FileAttrs};
use crate::error::CollectResult;
use crate::models::FileType;
use crate::utils::paths::resolve_reference;

lazy_static! {
    /// `![alt](target "title")`. The target is group 1 when written as
    /// `<target>`, group 2 otherwise. Titles may be `"..."`, `'...'` or `(...)`.
    static ref IMAGE_REFERENCE: Regex = Regex::new(
        r#"!\[[^\]\[]*\]\((?:<([^<>\n]+)>|([^()\s]+))(\s+(?:"[^"]*"|'[^']*'|\([^()]*\)))?\s*\)"#
    )
    .unwrap();
}

fn target_of<'c>(caps: &Captures<'c>) -> Option<regex::bytes::Match<'c>> {
    caps.get(1).or_else(|| caps.get(2))
}

/// Raw reference targets in `content`, in order of appearance
pub fn find_references(content: &[u8]) -> Vec<String> {
    IMAGE_REFERENCE
        .captures_iter(content)
        .filter_map(|caps| target_of(&caps))
        .map(|target| String::from_utf8_lossy(target.as_bytes()).to_string())
        .collect()
}

/// A Markdown document whose image references are its dependencies.
///
/// The whole document is buffered when opened; the buffer is rewritten at most
/// once and then written out as-is.
#[derive(Debug, Clone)]
pub struct MarkdownFile {
    attrs: FileAttrs,
    buffer: Bytes,
    rewritten: bool,
}

impl MarkdownFile {
    pub async fn open(parent: &str, uri: &str) -> Self {
        let uri = canonical_uri(uri);
        let mut attrs = FileAttrs::new(FileType::Markdown, parent, &uri);

        let buffer = match read_source(&uri).await {
            Ok((content, updated)) => {
                attrs.updated_time = updated;
                content
            }
            Err(e) => {
                debug!("Captured error while opening {}: {}", uri, e);
                attrs.error = Some(e);
                Bytes::new()
            }
        };

        MarkdownFile {
            attrs,
            buffer,
            rewritten: false,
        }
    }

    /// Current document content
    pub fn content(&self) -> &[u8] {
        &self.buffer
    }
}

#[async_trait]
impl Collectable for MarkdownFile {
    fn attrs(&self) -> &FileAttrs {
        &self.attrs
    }

    async fn find_dependencies(
        &self,
        cancel: &CancellationToken,
    ) -> CollectResult<Vec<Box<dyn Collectable>>> {
        self.attrs.guard(cancel)?;

        let uri = &self.attrs.uri;
        // References are always opened as leaves, so the tree cannot loop back
        let opened = join_all(
            find_references(&self.buffer)
                .iter()
                .map(|reference| {
                    let resolved = resolve_reference(uri, reference);
                    async move { LeafFile::open(uri, &resolved).await }
                }),
        )
        .await;

        Ok(opened
            .into_iter()
            .map(|leaf| Box::new(leaf) as Box<dyn Collectable>)
            .collect())
    }

    fn replace_dependency_references(
        &mut self,
        cancel: &CancellationToken,
        base: &Path,
        object_key: &str,
        mapper: &dyn ReferenceMapper,
    ) -> CollectResult<()> {
        self.attrs.guard(cancel)?;
        if self.rewritten {
            debug!("References of {} already rewritten", self.attrs.uri);
            return Ok(());
        }

        let rewritten = IMAGE_REFERENCE.replace_all(&self.buffer, |caps: &Captures<'_>| {
            let whole = &caps[0];
            let (start, end) = match (caps.get(0), target_of(caps)) {
                (Some(m), Some(target)) => (target.start() - m.start(), target.end() - m.start()),
                _ => return whole.to_vec(),
            };

            let mapped = mapper.map(FileType::Standalone, &whole[start..end], base, object_key);
            let mut out = Vec::with_capacity(whole.len() + mapped.len());
            out.extend_from_slice(&whole[..start]);
            out.extend_from_slice(&mapped);
            out.extend_from_slice(&whole[end..]);
            out
        });

        self.buffer = Bytes::from(rewritten.into_owned());
        self.rewritten = true;
        Ok(())
    }

    async fn write_to(&self, cancel: &CancellationToken, target: &Path) -> CollectResult<()> {
        self.attrs.guard(cancel)?;
        write_bytes(target, &self.buffer).await
    }

    async fn put_to(
        &self,
        cancel: &CancellationToken,
        bucket: &dyn ObjectBucket,
        key: &str,
    ) -> CollectResult<()> {
        self.attrs.guard(cancel)?;
        bucket.put_object(key, self.buffer.clone()).await
    }
}
