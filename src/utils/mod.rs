//! Utility functions for locating documents and their assets.
//!
//! ## Common Use Cases
//!
//! ### Deriving the companion-assets location
//!
//! ```
//! use cres::utils::paths::{companion_key, dependency_key};
//!
//! assert_eq!(companion_key("notes/target.md"), "notes/target_medias");
//! assert_eq!(
//!     dependency_key("notes/target.md", "/home/me/imgs/cat.png"),
//!     "notes/target_medias/cat.png"
//! );
//! ```

/// Path, URI and object-key helpers
pub mod paths;
