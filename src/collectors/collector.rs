use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use futures::stream::{FuturesUnordered, StreamExt};
use log::{debug, info};
use tokio::sync::oneshot;
use tokio_util::sync::CancellationToken;

use crate::collectable::{Collectable, ReferenceMapper};
use crate::collectors::freshness::FreshValidator;
use crate::collectors::generator::{CollectOptions, Generator};
use crate::collectors::mover::Mover;
use crate::error::{CollectError, CollectResult};
use crate::models::CollectOutcome;
use crate::utils::paths::dependency_key;

/// Receives the single result of a spawned collection
pub type Completion = oneshot::Receiver<CollectResult<CollectOutcome>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    ValidatingFreshness,
    DiscoveringDependencies,
    RewritingReferences,
    CollectingDependencies,
    CommittingSelf,
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            State::ValidatingFreshness => "validating freshness",
            State::DiscoveringDependencies => "discovering dependencies",
            State::RewritingReferences => "rewriting references",
            State::CollectingDependencies => "collecting dependencies",
            State::CommittingSelf => "committing",
        };
        f.write_str(name)
    }
}

/// Collects one file and, recursively, everything it references.
///
/// A collector owns its entity. Dependencies are collected by child
/// collectors running as separate tasks, each produced by the dependency
/// generator; the entity itself is committed only after every child
/// succeeded.
pub struct Collector {
    target: Box<dyn Collectable>,
    base: PathBuf,
    object_key: String,
    force: bool,
    validator: Arc<dyn FreshValidator>,
    mover: Arc<dyn Mover>,
    dep_generator: Arc<dyn Generator>,
}

impl Collector {
    /// Create a collector for `target`, committed at `base/object_key`.
    ///
    /// A dependency generator set in `options` takes precedence over
    /// `dep_generator`.
    pub fn new(
        target: Box<dyn Collectable>,
        base: PathBuf,
        object_key: String,
        validator: Arc<dyn FreshValidator>,
        mover: Arc<dyn Mover>,
        dep_generator: Arc<dyn Generator>,
        options: CollectOptions,
    ) -> Self {
        Collector {
            target,
            base,
            object_key,
            force: options.force,
            validator,
            mover,
            dep_generator: options.dep_generator.unwrap_or(dep_generator),
        }
    }

    pub fn uri(&self) -> &str {
        self.target.uri()
    }

    pub fn base(&self) -> &Path {
        &self.base
    }

    pub fn object_key(&self) -> &str {
        &self.object_key
    }

    /// Start collecting on a new task.
    ///
    /// The returned receiver yields exactly one result. It is closed without a
    /// value only if the task panicked.
    pub fn collect(self, cancel: CancellationToken) -> Completion {
        let (tx, rx) = oneshot::channel();
        tokio::spawn(async move {
            let result = self.run(cancel).await;
            // Nobody waiting is fine
            let _ = tx.send(result);
        });
        rx
    }

    /// Collect on the current task
    pub async fn run(mut self, cancel: CancellationToken) -> CollectResult<CollectOutcome> {
        let uri = self.target.uri().to_string();
        if cancel.is_cancelled() {
            return Err(CollectError::Cancelled { uri });
        }

        if !self.force {
            self.enter(State::ValidatingFreshness);
            let needs_collect = self
                .validator
                .needs_collect(self.target.as_ref(), &self.base, &self.object_key)
                .await?;
            if !needs_collect {
                info!("Skipping {}: destination is up to date", uri);
                return Ok(CollectOutcome::Skipped);
            }
        }

        self.enter(State::DiscoveringDependencies);
        let dependencies = self.target.find_dependencies(&cancel).await?;
        let count = dependencies.len();

        if !dependencies.is_empty() {
            self.enter(State::RewritingReferences);
            let mapper: Arc<dyn ReferenceMapper> = self.dep_generator.reference_mapper();
            self.target.replace_dependency_references(
                &cancel,
                &self.base,
                &self.object_key,
                mapper.as_ref(),
            )?;

            self.enter(State::CollectingDependencies);
            self.collect_dependencies(dependencies, &cancel).await?;
        }

        self.enter(State::CommittingSelf);
        self.mover
            .commit(self.target.as_ref(), &cancel, &self.base, &self.object_key)
            .await?;

        info!("Collected {} ({} dependencies)", uri, count);
        Ok(CollectOutcome::Collected { dependencies: count })
    }

    fn enter(&self, state: State) {
        debug!("[{}] {}", self.object_key, state);
    }

    /// Run one child per dependency and wait for all of them to settle.
    ///
    /// The first failure cancels the remaining children and is returned once
    /// they have finished.
    async fn collect_dependencies(
        &self,
        dependencies: Vec<Box<dyn Collectable>>,
        cancel: &CancellationToken,
    ) -> CollectResult<()> {
        let scope = cancel.child_token();

        let mut pending: FuturesUnordered<_> = dependencies
            .into_iter()
            .map(|dependency| {
                let uri = dependency.uri().to_string();
                let key = dependency_key(&self.object_key, &uri);
                let child = self.dep_generator.generate(
                    dependency,
                    self.base.clone(),
                    key,
                    self.dep_generator.clone(),
                    CollectOptions::new().force(self.force),
                );
                let completion = child.collect(scope.clone());
                async move {
                    let result = completion
                        .await
                        .unwrap_or_else(|_| Err(CollectError::Interrupted { uri: uri.clone() }));
                    (uri, result)
                }
            })
            .collect();

        let mut first_error: Option<CollectError> = None;
        while let Some((uri, result)) = pending.next().await {
            match result {
                Ok(_) => debug!("[{}] dependency {} done", self.object_key, uri),
                Err(e) if first_error.is_none() => {
                    debug!("[{}] dependency {} failed, cancelling siblings", self.object_key, uri);
                    scope.cancel();
                    first_error = Some(e);
                }
                Err(e) => debug!("[{}] dependency {} ended: {}", self.object_key, uri, e),
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}
