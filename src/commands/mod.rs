//! Command handlers behind the `copy`, `collect` and `move` subcommands.
//!
//! Every handler plans one [`CollectJob`] per root document, runs them as an
//! independent batch and prints the summary line. Setup problems (bad
//! arguments, unreadable config, unknown provider) are returned as errors;
//! per-document failures are only counted.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use log::{debug, info, warn};
use walkdir::WalkDir;

use crate::cli::{Args, Commands};
use crate::cloud::client::obtain_bucket;
use crate::collectable::open_collectable;
use crate::collectors::{
    run_batch, BatchReport, CollectJob, CollectOptions, Generator, LocalGenerator,
    PartialRemoteGenerator,
};
use crate::config::load_config;
use crate::error::CollectError;
use crate::models::FileType;
use crate::utils::paths::{normalize_path, to_object_key};

pub mod collect;
pub mod copy;
pub mod relocate;

/// Options shared by every subcommand
#[derive(Debug, Clone, Default)]
pub struct CommandContext {
    pub types: HashSet<FileType>,
    pub recursive: bool,
    pub config: Option<PathBuf>,
    pub dep2obs: HashSet<FileType>,
    pub force: bool,
}

impl From<&Args> for CommandContext {
    fn from(args: &Args) -> Self {
        CommandContext {
            types: args.types.iter().copied().collect(),
            recursive: args.recursive,
            config: args.config.clone(),
            dep2obs: args.dep2obs.iter().copied().collect(),
            force: args.force,
        }
    }
}

/// Run the subcommand selected on the command line
pub async fn execute(args: &Args) -> Result<BatchReport> {
    let ctx = CommandContext::from(args);
    match &args.command {
        Commands::Copy { source, destination } => copy::run(&ctx, source, destination).await,
        Commands::Collect {
            source,
            key,
            move_sources,
        } => collect::run(&ctx, source, key, *move_sources).await,
        Commands::Move { source, destination } => relocate::run(&ctx, source, destination).await,
    }
}

/// Generator for dependencies: the bucket for `--dep2obs` types, local otherwise
pub async fn dependency_generator(ctx: &CommandContext) -> Result<Arc<dyn Generator>> {
    if ctx.dep2obs.is_empty() {
        return Ok(Arc::new(LocalGenerator));
    }

    let config = load_config(ctx.config.as_deref())?;
    let obs = config.obs()?;
    let bucket = obtain_bucket(obs)
        .await
        .context(format!("Failed to open bucket {}", obs.bucket))?;

    info!("Dependencies of type {:?} go to bucket {}", ctx.dep2obs, obs.bucket);
    Ok(Arc::new(PartialRemoteGenerator::new(bucket, ctx.dep2obs.clone())))
}

/// Check that `source` fits the mode: a file normally, a directory with `--recursive`
pub fn validate_source(source: &Path, recursive: bool) -> Result<(), CollectError> {
    let metadata = std::fs::metadata(source).map_err(|e| {
        CollectError::Argument(format!("cannot access source {}: {}", source.display(), e))
    })?;

    if recursive && !metadata.is_dir() {
        return Err(CollectError::Argument(format!(
            "{} is not a directory",
            source.display()
        )));
    }
    if !recursive && !metadata.is_file() {
        return Err(CollectError::Argument(format!(
            "{} is not a file, use --recursive for directories",
            source.display()
        )));
    }
    Ok(())
}

/// Root documents to collect as `(source, base, key)` triples
pub fn plan_targets(
    source: &Path,
    destination: &Path,
    ctx: &CommandContext,
) -> Result<Vec<(PathBuf, PathBuf, String)>> {
    validate_source(source, ctx.recursive)?;

    if normalize_path(source) == normalize_path(destination) {
        return Err(CollectError::Argument(format!(
            "source and destination are both {}",
            source.display()
        ))
        .into());
    }

    if !ctx.recursive {
        let key = destination
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .ok_or_else(|| {
                CollectError::Argument(format!("{} has no file name", destination.display()))
            })?;
        let base = destination.parent().unwrap_or_else(|| Path::new("")).to_path_buf();
        return Ok(vec![(source.to_path_buf(), base, key)]);
    }

    let mut targets = Vec::new();
    for entry in WalkDir::new(source).sort_by_file_name() {
        let entry = entry.context(format!("Failed to walk {}", source.display()))?;
        if !entry.file_type().is_file() {
            continue;
        }

        let path = entry.path();
        if !ctx.types.contains(&FileType::from_path(path)) {
            continue;
        }

        let relative = path.strip_prefix(source).unwrap_or(path);
        let key = to_object_key(&relative.to_string_lossy());
        debug!("Planned {} as {}", path.display(), key);
        targets.push((path.to_path_buf(), destination.to_path_buf(), key));
    }

    if targets.is_empty() {
        warn!("No files of type {:?} found under {}", ctx.types, source.display());
    }
    Ok(targets)
}

/// Build one job per planned target
pub async fn plan_jobs(
    source: &Path,
    destination: &Path,
    ctx: &CommandContext,
    dep_generator: Arc<dyn Generator>,
) -> Result<Vec<CollectJob>> {
    let targets = plan_targets(source, destination, ctx)?;
    let root_generator = LocalGenerator;

    let mut jobs = Vec::with_capacity(targets.len());
    for (path, base, key) in targets {
        let entity = open_collectable(FileType::from_path(&path), "", &path.to_string_lossy()).await;
        let collector = root_generator.generate(
            entity,
            base,
            key,
            dep_generator.clone(),
            CollectOptions::new().force(ctx.force),
        );
        jobs.push(CollectJob {
            source: path,
            collector,
        });
    }
    Ok(jobs)
}

/// Plan, run and report one batch from `source` into `destination`
pub async fn collect_into(
    ctx: &CommandContext,
    source: &Path,
    destination: &Path,
) -> Result<BatchReport> {
    let dep_generator = dependency_generator(ctx).await?;
    let jobs = plan_jobs(source, destination, ctx, dep_generator).await?;
    info!("Collecting {} file(s) from {}", jobs.len(), source.display());

    let report = run_batch(jobs).await;
    println!("{}", report.summary);
    Ok(report)
}

/// Delete the given source documents, logging failures
pub async fn remove_sources(sources: &[PathBuf]) -> usize {
    let mut removed = 0;
    for source in sources {
        match tokio::fs::remove_file(source).await {
            Ok(()) => {
                debug!("Removed {}", source.display());
                removed += 1;
            }
            Err(e) => warn!("Failed to remove {}: {}", source.display(), e),
        }
    }
    removed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::write_document;
    use tempfile::TempDir;

    fn ctx(recursive: bool, types: &[FileType]) -> CommandContext {
        CommandContext {
            types: types.iter().copied().collect(),
            recursive,
            ..Default::default()
        }
    }

    #[test]
    fn test_validate_source() {
        let dir = TempDir::new().unwrap();
        let doc = write_document(dir.path(), "a.md", 0).unwrap();

        assert!(validate_source(&doc, false).is_ok());
        assert!(validate_source(dir.path(), true).is_ok());
        assert!(matches!(validate_source(dir.path(), false), Err(CollectError::Argument(_))));
        assert!(matches!(validate_source(&doc, true), Err(CollectError::Argument(_))));
        assert!(validate_source(&dir.path().join("none.md"), false).is_err());
    }

    #[test]
    fn test_plan_single_file() {
        let dir = TempDir::new().unwrap();
        let doc = write_document(dir.path(), "a.md", 0).unwrap();
        let dest = dir.path().join("out/target.md");

        let targets = plan_targets(&doc, &dest, &ctx(false, &[FileType::Markdown])).unwrap();
        assert_eq!(targets, vec![(doc, dir.path().join("out"), "target.md".to_string())]);
    }

    #[test]
    fn test_plan_recursive_filters_types() {
        let dir = TempDir::new().unwrap();
        let src = dir.path().join("src");
        write_document(&src, "a.md", 1).unwrap();
        write_document(&src, "nested/b.markdown", 0).unwrap();
        std::fs::write(src.join("notes.txt"), "plain").unwrap();
        let dest = dir.path().join("out");

        let targets = plan_targets(&src, &dest, &ctx(true, &[FileType::Markdown])).unwrap();
        let keys: Vec<&str> = targets.iter().map(|(_, _, key)| key.as_str()).collect();
        assert_eq!(keys, vec!["a.md", "nested/b.markdown"]);
        assert!(targets.iter().all(|(_, base, _)| base == &dest));

        let targets = plan_targets(&src, &dest, &ctx(true, &[FileType::Standalone])).unwrap();
        let keys: Vec<&str> = targets.iter().map(|(_, _, key)| key.as_str()).collect();
        assert_eq!(keys, vec!["images/image_0.png", "notes.txt"]);
    }

    #[test]
    fn test_plan_rejects_same_source_and_destination() {
        let dir = TempDir::new().unwrap();
        let doc = write_document(dir.path(), "a.md", 0).unwrap();

        let err = plan_targets(&doc, &doc, &ctx(false, &[FileType::Markdown])).unwrap_err();
        assert!(err.to_string().contains("source and destination"));
    }

    #[tokio::test]
    async fn test_dependency_generator_without_dep2obs_needs_no_config() {
        let context = CommandContext {
            config: Some(PathBuf::from("/nonexistent/cresrc.yml")),
            ..Default::default()
        };
        assert!(dependency_generator(&context).await.is_ok());
    }

    #[tokio::test]
    async fn test_dependency_generator_requires_config() {
        let context = CommandContext {
            config: Some(PathBuf::from("/nonexistent/cresrc.yml")),
            dep2obs: HashSet::from([FileType::Standalone]),
            ..Default::default()
        };
        assert!(dependency_generator(&context).await.is_err());
    }

    #[tokio::test]
    async fn test_remove_sources() {
        let dir = TempDir::new().unwrap();
        let doc = write_document(dir.path(), "a.md", 0).unwrap();

        let removed = remove_sources(&[doc.clone(), dir.path().join("gone.md")]).await;
        assert_eq!(removed, 1);
        assert!(!doc.exists());
    }
}
