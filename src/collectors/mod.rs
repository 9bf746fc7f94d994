//! Dependency-aware collection.
//!
//! A [`Collector`](collector::Collector) drives one file through freshness
//! validation, dependency discovery, reference rewriting, concurrent
//! collection of its dependencies and finally its own commit.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │              Generators                 │
//! │  ┌─────────┬──────────┬──────────────┐  │
//! │  │  Local  │  Remote  │ PartialRemote│  │
//! │  └─────────┴──────────┴──────────────┘  │
//! ├─────────────────────────────────────────┤
//! │              Collector                  │
//! │   validate → discover → rewrite →       │
//! │   fan out children → commit             │
//! ├─────────────────────────────────────────┤
//! │  Freshness validators  │    Movers      │
//! │   (local / bucket)     │ (local/bucket) │
//! └─────────────────────────────────────────┘
//! ```
//!
//! Each dependency runs as its own task. The first failing dependency cancels
//! its siblings through a child [`CancellationToken`](tokio_util::sync::CancellationToken)
//! and its error becomes the parent's result.
//!
//! ## Usage Example
//!
//! ```no_run
//! use std::path::PathBuf;
//! use std::sync::Arc;
//!
//! use cres::collectable::open_collectable;
//! use cres::collectors::generator::{CollectOptions, Generator, LocalGenerator};
//! use cres::models::FileType;
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let generator: Arc<dyn Generator> = Arc::new(LocalGenerator);
//! let entity = open_collectable(FileType::Markdown, "", "notes/today.md").await;
//! let collector = generator.generate(
//!     entity,
//!     PathBuf::from("/srv/notes"),
//!     "2024/today.md".to_string(),
//!     generator.clone(),
//!     CollectOptions::new(),
//! );
//!
//! let outcome = collector.collect(CancellationToken::new()).await??;
//! println!("{:?}", outcome);
//! # Ok(())
//! # }
//! ```

/// The per-file orchestrator
pub mod collector;

/// Freshness validators
pub mod freshness;

/// Local and bucket movers
pub mod mover;

/// Backend binding
pub mod generator;

/// Fan-in over independent root documents
pub mod batch;

pub use batch::{run_batch, BatchReport, CollectJob};
pub use collector::Collector;
pub use generator::{CollectOptions, Generator, LocalGenerator, PartialRemoteGenerator, RemoteGenerator};
