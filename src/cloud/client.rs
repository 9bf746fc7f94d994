use std::sync::Arc;

use anyhow::{Context, Result};
use log::{info, warn};
use rusoto_core::{HttpClient, Region};
use rusoto_credential::StaticProvider;
use rusoto_s3::S3Client;

use crate::cloud::bucket::ObjectBucket;
use crate::cloud::memory::MemoryBucket;
use crate::cloud::s3::S3Bucket;
use crate::config::ObsConfig;
use crate::constants::CUSTOM_REGION_NAME;
use crate::error::CollectError;

/// Object-storage providers understood by the factory
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    /// Any S3-compatible service (AWS, Aliyun OSS, MinIO)
    S3,
    /// In-process bucket, nothing leaves the machine
    Memory,
}

impl Provider {
    pub fn parse(name: &str) -> Result<Self, CollectError> {
        match name.trim().to_ascii_lowercase().as_str() {
            "s3" | "aws" | "ali" | "oss" | "minio" => Ok(Provider::S3),
            "memory" => Ok(Provider::Memory),
            _ => Err(CollectError::UnsupportedProvider(name.to_string())),
        }
    }
}

/// Resolve the region to talk to, honouring a custom endpoint
fn resolve_region(config: &ObsConfig) -> Region {
    if let Some(endpoint) = config.endpoint.as_deref().filter(|e| !e.is_empty()) {
        let endpoint = if endpoint.contains("://") {
            endpoint.to_string()
        } else {
            format!("https://{}", endpoint)
        };
        return Region::Custom {
            name: config
                .region
                .clone()
                .unwrap_or_else(|| CUSTOM_REGION_NAME.to_string()),
            endpoint,
        };
    }

    match config.region.as_deref() {
        Some(name) => match name.parse::<Region>() {
            Ok(r) => r,
            Err(_) => {
                warn!("Invalid region '{}', using default", name);
                Region::default()
            }
        },
        None => Region::default(),
    }
}

/// Create an S3 client with the static credentials from the configuration
pub fn create_s3_client(config: &ObsConfig) -> Result<Arc<S3Client>> {
    let region = resolve_region(config);
    let credentials = StaticProvider::new_minimal(config.akid.clone(), config.aks.clone());
    let http_client = HttpClient::new().context("Failed to create HTTP client")?;

    Ok(Arc::new(S3Client::new_with(http_client, credentials, region)))
}

/// Open the bucket named in the configuration, creating it when needed
pub async fn obtain_bucket(config: &ObsConfig) -> Result<Arc<dyn ObjectBucket>> {
    match Provider::parse(&config.provider)? {
        Provider::S3 => {
            info!("Using S3-compatible bucket {}", config.bucket);
            let bucket = S3Bucket::get_or_create(config).await?;
            Ok(Arc::new(bucket))
        }
        Provider::Memory => {
            info!("Using in-memory bucket {}", config.bucket);
            Ok(Arc::new(MemoryBucket::new(&config.bucket)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn obs(provider: &str, endpoint: Option<&str>, region: Option<&str>) -> ObsConfig {
        ObsConfig {
            provider: provider.to_string(),
            akid: "id".to_string(),
            aks: "secret".to_string(),
            endpoint: endpoint.map(str::to_string),
            bucket: "assets".to_string(),
            region: region.map(str::to_string),
            acl: None,
        }
    }

    #[test]
    fn test_provider_parse() {
        assert_eq!(Provider::parse("ali").unwrap(), Provider::S3);
        assert_eq!(Provider::parse("S3").unwrap(), Provider::S3);
        assert_eq!(Provider::parse("memory").unwrap(), Provider::Memory);
        assert_eq!(
            Provider::parse("gcs").unwrap_err(),
            CollectError::UnsupportedProvider("gcs".to_string())
        );
    }

    #[test]
    fn test_resolve_region_custom_endpoint() {
        let region = resolve_region(&obs("ali", Some("oss-cn-hangzhou.aliyuncs.com"), None));
        assert_eq!(
            region,
            Region::Custom {
                name: CUSTOM_REGION_NAME.to_string(),
                endpoint: "https://oss-cn-hangzhou.aliyuncs.com".to_string(),
            }
        );
    }

    #[test]
    fn test_resolve_region_named() {
        assert_eq!(resolve_region(&obs("s3", None, Some("eu-west-1"))).name(), "eu-west-1");
        assert_eq!(
            resolve_region(&obs("s3", None, Some("invalid-region"))).name(),
            Region::default().name()
        );
    }

    #[tokio::test]
    async fn test_obtain_memory_bucket() {
        let bucket = obtain_bucket(&obs("memory", None, None)).await.unwrap();
        assert_eq!(bucket.object_url("k"), "memory://assets/k");
    }

    #[tokio::test]
    async fn test_obtain_unsupported_provider() {
        let err = obtain_bucket(&obs("dropbox", None, None)).await.err().unwrap();
        assert!(err.to_string().contains("Unsupported provider"));
    }
}
