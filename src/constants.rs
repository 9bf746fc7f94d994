//! Global constants for cres.
//!
//! This module centralizes all hardcoded values to improve maintainability
//! and make configuration changes easier.

// Layout constants
/// Suffix appended to a document's stem to name its companion-assets location
pub const COMPANION_SUFFIX: &str = "_medias";

/// Name of the configuration file looked up in the user's home directory
pub const DEFAULT_CONFIG_FILE: &str = ".cresrc.yml";

/// File extensions recognised as Markdown documents
pub const MARKDOWN_EXTENSIONS: &[&str] = &["md", "markdown"];

/// URI schemes treated as network sources
pub const REMOTE_SCHEMES: &[&str] = &["http://", "https://"];

// Object storage constants
/// Canned ACL applied to uploaded objects when none is configured
pub const DEFAULT_OBJECT_ACL: &str = "public-read";

/// Region name used for custom S3-compatible endpoints
pub const CUSTOM_REGION_NAME: &str = "custom";

// Timeout and retry constants
/// Maximum upload retry attempts
pub const MAX_UPLOAD_RETRIES: usize = 3;

/// Base retry delay in milliseconds
pub const RETRY_BASE_DELAY_MS: u64 = 250;

/// Timeout for HTTP source requests in seconds
pub const HTTP_TIMEOUT_SECS: u64 = 30;
