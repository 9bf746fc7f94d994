use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;

use crate::cloud::bucket::ObjectBucket;
use crate::collectable::{
    Collectable, LocalReferenceMapper, ReferenceMapper, RemoteReferenceMapper, RoutingReferenceMapper,
};
use crate::collectors::collector::Collector;
use crate::collectors::freshness::{FreshValidator, LocalFreshValidator, RemoteFreshValidator};
use crate::collectors::mover::{LocalMover, Mover, RemoteMover};
use crate::models::FileType;

/// Per-collector options
#[derive(Clone, Default)]
pub struct CollectOptions {
    /// Skip the freshness check
    pub force: bool,
    /// Generator used for dependencies instead of the one passed to `generate`
    pub dep_generator: Option<Arc<dyn Generator>>,
}

impl CollectOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn force(mut self, force: bool) -> Self {
        self.force = force;
        self
    }

    pub fn dep_generator(mut self, generator: Arc<dyn Generator>) -> Self {
        self.dep_generator = Some(generator);
        self
    }
}

/// Binds a collectable to the validator, mover and mapper of one backend.
pub trait Generator: Send + Sync {
    /// Build the collector for `entity`, with `dep_generator` handling its dependencies
    fn generate(
        &self,
        entity: Box<dyn Collectable>,
        base: PathBuf,
        object_key: String,
        dep_generator: Arc<dyn Generator>,
        options: CollectOptions,
    ) -> Collector;

    /// Mapper a parent uses for references to files this generator places
    fn reference_mapper(&self) -> Arc<dyn ReferenceMapper>;
}

/// Everything goes to the local filesystem
#[derive(Debug, Default, Clone, Copy)]
pub struct LocalGenerator;

impl Generator for LocalGenerator {
    fn generate(
        &self,
        entity: Box<dyn Collectable>,
        base: PathBuf,
        object_key: String,
        dep_generator: Arc<dyn Generator>,
        options: CollectOptions,
    ) -> Collector {
        Collector::new(
            entity,
            base,
            object_key,
            Arc::new(LocalFreshValidator),
            Arc::new(LocalMover),
            dep_generator,
            options,
        )
    }

    fn reference_mapper(&self) -> Arc<dyn ReferenceMapper> {
        Arc::new(LocalReferenceMapper)
    }
}

/// Everything goes to one bucket
#[derive(Clone)]
pub struct RemoteGenerator {
    bucket: Arc<dyn ObjectBucket>,
    validator: Arc<dyn FreshValidator>,
    mover: Arc<dyn Mover>,
}

impl RemoteGenerator {
    pub fn new(bucket: Arc<dyn ObjectBucket>) -> Self {
        RemoteGenerator {
            validator: Arc::new(RemoteFreshValidator::new(bucket.clone())),
            mover: Arc::new(RemoteMover::new(bucket.clone())),
            bucket,
        }
    }
}

impl Generator for RemoteGenerator {
    fn generate(
        &self,
        entity: Box<dyn Collectable>,
        base: PathBuf,
        object_key: String,
        dep_generator: Arc<dyn Generator>,
        options: CollectOptions,
    ) -> Collector {
        Collector::new(
            entity,
            base,
            object_key,
            self.validator.clone(),
            self.mover.clone(),
            dep_generator,
            options,
        )
    }

    fn reference_mapper(&self) -> Arc<dyn ReferenceMapper> {
        Arc::new(RemoteReferenceMapper::new(self.bucket.clone()))
    }
}

/// Sends the listed file types to a bucket and everything else to the local filesystem
#[derive(Clone)]
pub struct PartialRemoteGenerator {
    bucket: Arc<dyn ObjectBucket>,
    remote_types: HashSet<FileType>,
    local: LocalGenerator,
    remote: RemoteGenerator,
}

impl PartialRemoteGenerator {
    pub fn new(bucket: Arc<dyn ObjectBucket>, remote_types: HashSet<FileType>) -> Self {
        PartialRemoteGenerator {
            remote: RemoteGenerator::new(bucket.clone()),
            local: LocalGenerator,
            bucket,
            remote_types,
        }
    }

    pub fn routes_remote(&self, file_type: FileType) -> bool {
        self.remote_types.contains(&file_type)
    }
}

impl Generator for PartialRemoteGenerator {
    fn generate(
        &self,
        entity: Box<dyn Collectable>,
        base: PathBuf,
        object_key: String,
        dep_generator: Arc<dyn Generator>,
        options: CollectOptions,
    ) -> Collector {
        if self.routes_remote(entity.file_type()) {
            self.remote.generate(entity, base, object_key, dep_generator, options)
        } else {
            self.local.generate(entity, base, object_key, dep_generator, options)
        }
    }

    fn reference_mapper(&self) -> Arc<dyn ReferenceMapper> {
        Arc::new(RoutingReferenceMapper::new(
            self.bucket.clone(),
            self.remote_types.clone(),
        ))
    }
}
