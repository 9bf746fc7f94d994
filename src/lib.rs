//! # cres
//!
//! Collects documents together with every file they reference and rewrites the
//! references so they keep working at the new location.
//!
//! ## Overview
//!
//! A Markdown document is copied to a local directory; the images it embeds
//! are copied into a companion directory next to it (`target.md` gets
//! `target_medias/`) or uploaded to an object-storage bucket, in which case
//! the document links to the objects' public URLs. Destinations that are
//! already up to date are skipped.
//!
//! ## Features
//!
//! - **Dependency-aware**: references are discovered, rewritten and collected before the document itself
//! - **Concurrent**: one task per file, the first failing dependency cancels its siblings
//! - **Mixed placement**: documents stay local while their assets go to a bucket
//! - **Freshness checks**: unchanged destinations are left alone unless forced
//! - **Batch mode**: whole directory trees, each document collected independently
//!
//! ## Usage
//!
//! ```no_run
//! use std::path::PathBuf;
//! use std::sync::Arc;
//!
//! use cres::collectable::open_collectable;
//! use cres::collectors::{run_batch, CollectJob, CollectOptions, Generator, LocalGenerator};
//! use cres::models::FileType;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let generator: Arc<dyn Generator> = Arc::new(LocalGenerator);
//! let source = PathBuf::from("drafts/post.md");
//! let entity = open_collectable(FileType::Markdown, "", "drafts/post.md").await;
//!
//! let job = CollectJob {
//!     source,
//!     collector: generator.generate(
//!         entity,
//!         PathBuf::from("/srv/blog"),
//!         "2024/post.md".to_string(),
//!         generator.clone(),
//!         CollectOptions::new(),
//!     ),
//! };
//!
//! let report = run_batch(vec![job]).await;
//! println!("{}", report.summary);
//! # Ok(())
//! # }
//! ```
//!
//! ## Module Organization
//!
//! - [`cli`]: Command-line interface definitions and argument parsing
//! - [`commands`]: `copy`, `collect` and `move` handlers
//! - [`collectable`]: Files that can be collected and reference mappers
//! - [`collectors`]: The collector, freshness validators, movers and generators
//! - [`cloud`]: Object-storage buckets (S3-compatible and in-memory)
//! - [`config`]: YAML configuration
//! - [`models`]: Core data models
//! - [`error`]: Error types
//! - [`utils`]: Path and object-key helpers
//! - [`constants`]: Application-wide constants

/// Command-line interface definitions and argument parsing
pub mod cli;

/// Core data models and structures used throughout the application
pub mod models;

/// Error types for collection
pub mod error;

/// Collectable files and reference mappers
pub mod collectable;

/// Collection orchestration
pub mod collectors;

/// Subcommand handlers
pub mod commands;

/// Path and object-key helpers
pub mod utils;

/// Object-storage integration
pub mod cloud;

/// Configuration loading
pub mod config;

/// Application constants and configuration values
pub mod constants;

/// Test utilities and helpers
#[cfg(test)]
pub mod test_utils;
