use std::path::Path;
use std::time::Duration;

use bytes::Bytes;
use chrono::{DateTime, Utc};
use lazy_static::lazy_static;
use log::debug;

use crate::constants::HTTP_TIMEOUT_SECS;
use crate::error::{CollectError, CollectResult};
use crate::utils::paths::{is_remote_uri, normalize_path};

lazy_static! {
    static ref HTTP_CLIENT: reqwest::Client = reqwest::Client::builder()
        .timeout(Duration::from_secs(HTTP_TIMEOUT_SECS))
        .build()
        .unwrap_or_else(|_| reqwest::Client::new());
}

/// Absolute form of a source location; URLs are kept verbatim
pub fn canonical_uri(uri: &str) -> String {
    if is_remote_uri(uri) {
        uri.to_string()
    } else {
        normalize_path(Path::new(uri)).to_string_lossy().to_string()
    }
}

fn modified_time(metadata: &std::fs::Metadata) -> Option<DateTime<Utc>> {
    metadata.modified().ok().map(DateTime::<Utc>::from)
}

/// Read a whole source into memory along with its modification time.
///
/// Remote sources report no modification time.
pub async fn read_source(uri: &str) -> CollectResult<(Bytes, Option<DateTime<Utc>>)> {
    if is_remote_uri(uri) {
        return Ok((fetch_bytes(uri).await?, None));
    }

    let metadata = tokio::fs::metadata(uri)
        .await
        .map_err(|e| CollectError::discovery(uri, e))?;
    if !metadata.is_file() {
        return Err(CollectError::discovery(uri, "not a regular file"));
    }

    let content = tokio::fs::read(uri)
        .await
        .map_err(|e| CollectError::discovery(uri, e))?;
    Ok((Bytes::from(content), modified_time(&metadata)))
}

/// Check that a source exists and return its modification time
pub async fn stat_source(uri: &str) -> CollectResult<Option<DateTime<Utc>>> {
    if is_remote_uri(uri) {
        probe_remote(uri).await?;
        return Ok(None);
    }

    let metadata = tokio::fs::metadata(uri)
        .await
        .map_err(|e| CollectError::discovery(uri, e))?;
    if !metadata.is_file() {
        return Err(CollectError::discovery(uri, "not a regular file"));
    }
    Ok(modified_time(&metadata))
}

/// HEAD a remote source, failing on a non-success status
async fn probe_remote(url: &str) -> CollectResult<()> {
    let response = HTTP_CLIENT
        .head(url)
        .send()
        .await
        .map_err(|e| CollectError::discovery(url, e))?;

    if !response.status().is_success() {
        return Err(CollectError::discovery(
            url,
            format!("server answered {}", response.status()),
        ));
    }
    Ok(())
}

/// GET a remote source into memory
pub async fn fetch_bytes(url: &str) -> CollectResult<Bytes> {
    debug!("Fetching {}", url);
    let response = HTTP_CLIENT
        .get(url)
        .send()
        .await
        .and_then(|r| r.error_for_status())
        .map_err(|e| CollectError::discovery(url, e))?;

    response
        .bytes()
        .await
        .map_err(|e| CollectError::discovery(url, e))
}

/// Create the parent directories of a write target
pub async fn prepare_target(target: &Path) -> CollectResult<()> {
    if let Some(parent) = target.parent() {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| CollectError::write(parent.to_string_lossy(), e))?;
        }
    }
    Ok(())
}

/// Write bytes to a local target, creating parent directories
pub async fn write_bytes(target: &Path, content: &[u8]) -> CollectResult<()> {
    prepare_target(target).await?;
    tokio::fs::write(target, content)
        .await
        .map_err(|e| CollectError::write(target.to_string_lossy(), e))
}
