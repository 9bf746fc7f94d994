//! Object-storage integration for collected assets.
//!
//! Dependencies of a document can be committed to a bucket instead of a local
//! directory; the document then references them through the bucket's public
//! URLs.
//!
//! ## Supported Providers
//!
//! - **S3-compatible**: AWS S3, Aliyun OSS, MinIO and friends (`s3`, `aws`, `ali`, `oss`, `minio`)
//! - **Memory**: in-process bucket for dry runs and tests (`memory`)
//!
//! ## Usage Example
//!
//! ```no_run
//! use cres::cloud::client::obtain_bucket;
//! use cres::config::ObsConfig;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let config = ObsConfig {
//!     provider: "ali".to_string(),
//!     akid: "KEY".to_string(),
//!     aks: "SECRET".to_string(),
//!     endpoint: Some("oss-cn-hangzhou.aliyuncs.com".to_string()),
//!     bucket: "my-notes-assets".to_string(),
//!     region: None,
//!     acl: None,
//! };
//!
//! let bucket = obtain_bucket(&config).await?;
//! println!("{}", bucket.object_url("notes/today_medias/cat.png"));
//! # Ok(())
//! # }
//! ```

/// The bucket abstraction shared by validators, movers and mappers
pub mod bucket;

/// S3 client construction and the provider factory
pub mod client;

/// S3-compatible bucket implementation
pub mod s3;

/// In-memory bucket implementation
pub mod memory;

pub use bucket::ObjectBucket;
pub use memory::MemoryBucket;
pub use s3::S3Bucket;
