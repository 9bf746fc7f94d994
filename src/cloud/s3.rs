use std::future::Future;
use std::io;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use bytes::{Bytes, BytesMut};
use chrono::{DateTime, Utc};
use futures::TryStreamExt;
use log::{debug, info, warn};
use rusoto_core::{ByteStream, RusotoError};
use rusoto_s3::{
    CreateBucketRequest, DeleteObjectRequest, HeadBucketError, HeadBucketRequest,
    HeadObjectError, HeadObjectOutput, HeadObjectRequest, PutObjectRequest, S3Client, S3,
};
use tokio::time::sleep;
use tokio_util::codec::{BytesCodec, FramedRead};

use crate::cloud::bucket::ObjectBucket;
use crate::cloud::client::create_s3_client;
use crate::config::ObsConfig;
use crate::constants::{DEFAULT_OBJECT_ACL, MAX_UPLOAD_RETRIES, RETRY_BASE_DELAY_MS};
use crate::error::{CollectError, CollectResult};

/// Bucket on an S3-compatible object store (AWS S3, Aliyun OSS, MinIO, ...).
///
/// Objects are uploaded with a canned ACL so that [`ObjectBucket::object_url`]
/// hands out URLs that resolve for readers of the collected documents.
pub struct S3Bucket {
    client: Arc<S3Client>,
    bucket: String,
    acl: String,
    url_base: String,
}

impl S3Bucket {
    /// Create a bucket handle around an existing client.
    ///
    /// # Arguments
    ///
    /// * `client` - Shared S3 client
    /// * `bucket` - Bucket name
    /// * `acl` - Canned ACL applied to every uploaded object
    /// * `url_base` - Public URL prefix of the bucket, without trailing slash
    pub fn new(client: Arc<S3Client>, bucket: &str, acl: &str, url_base: &str) -> Self {
        S3Bucket {
            client,
            bucket: bucket.to_string(),
            acl: acl.to_string(),
            url_base: url_base.trim_end_matches('/').to_string(),
        }
    }

    /// Build a bucket handle from the `OBS` configuration section
    pub fn from_config(config: &ObsConfig) -> Result<Self> {
        let client = create_s3_client(config)?;
        let acl = config.acl.as_deref().unwrap_or(DEFAULT_OBJECT_ACL);
        let url_base = public_url_base(
            &config.bucket,
            config.endpoint.as_deref(),
            config.region.as_deref(),
        );
        Ok(S3Bucket::new(client, &config.bucket, acl, &url_base))
    }

    /// Build a bucket handle and create the bucket when it does not exist yet
    pub async fn get_or_create(config: &ObsConfig) -> Result<Self> {
        let bucket = S3Bucket::from_config(config)?;
        bucket.ensure_exists().await?;
        Ok(bucket)
    }

    async fn ensure_exists(&self) -> Result<()> {
        let request = HeadBucketRequest {
            bucket: self.bucket.clone(),
            ..Default::default()
        };

        match self.client.head_bucket(request).await {
            Ok(_) => {
                debug!("Bucket {} exists", self.bucket);
                Ok(())
            }
            Err(RusotoError::Service(HeadBucketError::NoSuchBucket(_))) => self.create().await,
            Err(RusotoError::Unknown(response)) if response.status.as_u16() == 404 => {
                self.create().await
            }
            Err(e) => Err(anyhow!("Failed to check bucket {}: {}", self.bucket, e)),
        }
    }

    async fn create(&self) -> Result<()> {
        info!("Creating bucket {}", self.bucket);
        self.client
            .create_bucket(CreateBucketRequest {
                bucket: self.bucket.clone(),
                acl: Some(self.acl.clone()),
                ..Default::default()
            })
            .await
            .context(format!("Failed to create bucket {}", self.bucket))?;
        Ok(())
    }

    async fn head(&self, key: &str) -> CollectResult<Option<HeadObjectOutput>> {
        let request = HeadObjectRequest {
            bucket: self.bucket.clone(),
            key: key.to_string(),
            ..Default::default()
        };

        match self.client.head_object(request).await {
            Ok(output) => Ok(Some(output)),
            Err(RusotoError::Service(HeadObjectError::NoSuchKey(_))) => Ok(None),
            // HEAD responses carry no body, so a missing key often surfaces as a bare 404
            Err(RusotoError::Unknown(response)) if response.status.as_u16() == 404 => Ok(None),
            Err(e) => Err(CollectError::storage(key, e)),
        }
    }

    /// Upload with retries, building a fresh body for every attempt
    async fn put_with_retry<F, Fut>(&self, key: &str, make_body: F) -> CollectResult<()>
    where
        F: Fn() -> Fut + Send + Sync,
        Fut: Future<Output = io::Result<ByteStream>> + Send,
    {
        let mut attempt = 0;

        loop {
            attempt += 1;

            let body = make_body()
                .await
                .map_err(|e| CollectError::storage(key, e))?;

            let request = PutObjectRequest {
                bucket: self.bucket.clone(),
                key: key.to_string(),
                body: Some(body),
                acl: Some(self.acl.clone()),
                content_type: content_type_for(key).map(str::to_string),
                ..Default::default()
            };

            match self.client.put_object(request).await {
                Ok(_) => {
                    debug!("Uploaded s3://{}/{}", self.bucket, key);
                    return Ok(());
                }
                Err(e) => {
                    if attempt >= MAX_UPLOAD_RETRIES {
                        return Err(CollectError::storage(
                            key,
                            format!("upload failed after {} attempts: {}", MAX_UPLOAD_RETRIES, e),
                        ));
                    }

                    // Exponential backoff
                    let delay = Duration::from_millis(RETRY_BASE_DELAY_MS * 2u64.pow(attempt as u32));
                    warn!("Upload attempt {} for {} failed, retrying in {:?}: {}", attempt, key, delay, e);
                    sleep(delay).await;
                }
            }
        }
    }
}

#[async_trait]
impl ObjectBucket for S3Bucket {
    async fn object_exists(&self, key: &str) -> CollectResult<bool> {
        Ok(self.head(key).await?.is_some())
    }

    async fn last_modified(&self, key: &str) -> CollectResult<DateTime<Utc>> {
        let output = self
            .head(key)
            .await?
            .ok_or_else(|| CollectError::storage(key, "no such object"))?;

        let raw = output
            .last_modified
            .ok_or_else(|| CollectError::storage(key, "response has no Last-Modified header"))?;

        parse_http_date(&raw).ok_or_else(|| {
            CollectError::storage(key, format!("unparseable Last-Modified '{}'", raw))
        })
    }

    async fn put_object(&self, key: &str, body: Bytes) -> CollectResult<()> {
        self.put_with_retry(key, || {
            let body = body.clone();
            async move { Ok(ByteStream::from(body.to_vec())) }
        })
        .await
    }

    async fn put_object_from_file(&self, key: &str, path: &Path) -> CollectResult<()> {
        let path = path.to_path_buf();
        self.put_with_retry(key, || {
            let path = path.clone();
            async move { file_body(&path).await }
        })
        .await
    }

    async fn delete_object(&self, key: &str) -> CollectResult<()> {
        self.client
            .delete_object(DeleteObjectRequest {
                bucket: self.bucket.clone(),
                key: key.to_string(),
                ..Default::default()
            })
            .await
            .map_err(|e| CollectError::storage(key, e))?;
        Ok(())
    }

    fn object_url(&self, key: &str) -> String {
        format!("{}/{}", self.url_base, key.trim_start_matches('/'))
    }
}

/// Stream a local file as an upload body
async fn file_body(path: &Path) -> io::Result<ByteStream> {
    let file = tokio::fs::File::open(path).await?;
    let size = file.metadata().await?.len() as usize;
    let stream = FramedRead::new(file, BytesCodec::new()).map_ok(BytesMut::freeze);
    Ok(ByteStream::new_with_size(stream, size))
}

/// Parse an HTTP date (`Wed, 21 Oct 2015 07:28:00 GMT`) into UTC
pub fn parse_http_date(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc2822(raw.trim())
        .map(|t| t.with_timezone(&Utc))
        .ok()
}

/// Virtual-hosted public URL prefix of a bucket
pub fn public_url_base(bucket: &str, endpoint: Option<&str>, region: Option<&str>) -> String {
    match endpoint.filter(|e| !e.is_empty()) {
        Some(endpoint) => {
            let (scheme, host) = match endpoint.split_once("://") {
                Some((scheme, host)) => (scheme, host),
                None => ("https", endpoint),
            };
            format!("{}://{}.{}", scheme, bucket, host.trim_end_matches('/'))
        }
        None => {
            let region = region.unwrap_or("us-east-1");
            format!("https://{}.s3.{}.amazonaws.com", bucket, region)
        }
    }
}

fn content_type_for(key: &str) -> Option<&'static str> {
    let ext = key.rsplit('.').next()?.to_ascii_lowercase();
    let content_type = match ext.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "svg" => "image/svg+xml",
        "webp" => "image/webp",
        "md" | "markdown" => "text/markdown; charset=utf-8",
        _ => return None,
    };
    Some(content_type)
}
