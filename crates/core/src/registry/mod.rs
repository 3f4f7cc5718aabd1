//! Builder registry
//!
//! Resolves a marker kind to the builder registered for it, caching both the
//! kind → builder key answer and the constructed builder instances.

mod cache;
pub mod traits;

pub use traits::{KEY_VALUE_TRAIT_DISCOVERER, KeyValueTraitDiscoverer, TraitRegistry};

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::{
    diagnostics::DiagnosticSink,
    error::{Error, catch_fault},
    interfaces::{MarkerMetadata, TestCaseBuilder},
    types::{BuilderKey, MarkerKind},
};

use cache::{PopulateError, ResolutionCache};

/// Constructs a builder instance. May fail; failures are reported, not cached.
pub type BuilderFactory =
    Arc<dyn Fn() -> anyhow::Result<Arc<dyn TestCaseBuilder>> + Send + Sync>;

pub struct BuilderRegistry {
    metadata: Arc<dyn MarkerMetadata>,
    factories: HashMap<BuilderKey, BuilderFactory>,
    builder_types: ResolutionCache<MarkerKind, Option<BuilderKey>>,
    instances: ResolutionCache<BuilderKey, Arc<dyn TestCaseBuilder>>,
    diagnostics: Arc<dyn DiagnosticSink>,
}

impl fmt::Debug for BuilderRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BuilderRegistry")
            .field("factories", &self.factories.keys().collect::<Vec<_>>())
            .field("resolved_kinds", &self.builder_types.len())
            .field("instances", &self.instances.len())
            .finish()
    }
}

impl BuilderRegistry {
    pub fn new(metadata: Arc<dyn MarkerMetadata>, diagnostics: Arc<dyn DiagnosticSink>) -> Self {
        Self {
            metadata,
            factories: HashMap::new(),
            builder_types: ResolutionCache::default(),
            instances: ResolutionCache::default(),
            diagnostics,
        }
    }

    /// Register a factory that builds the builder for `key`
    pub fn register<F, B>(&mut self, key: impl Into<BuilderKey>, factory: F)
    where
        F: Fn() -> anyhow::Result<B> + Send + Sync + 'static,
        B: TestCaseBuilder + 'static,
    {
        let factory: BuilderFactory =
            Arc::new(move || factory().map(|builder| Arc::new(builder) as Arc<dyn TestCaseBuilder>));
        self.register_factory(key, factory);
    }

    pub fn register_factory(&mut self, key: impl Into<BuilderKey>, factory: BuilderFactory) {
        self.factories.insert(key.into(), factory);
    }

    /// Register an already constructed builder
    pub fn register_instance(&mut self, key: impl Into<BuilderKey>, builder: Arc<dyn TestCaseBuilder>) {
        self.register_factory(key, Arc::new(move || Ok::<_, anyhow::Error>(builder.clone())));
    }

    /// The builder key for a marker kind.
    ///
    /// The first lookup of a kind asks the marker metadata and caches the
    /// answer, `None` included. Malformed metadata counts as "no builder".
    pub fn resolve_builder_type(&self, kind: &MarkerKind) -> Option<BuilderKey> {
        self.builder_types.get_or_populate(kind, || {
            match self.metadata.builder_association(kind) {
                Ok(key) => {
                    tracing::debug!("Marker kind '{}' resolved to builder {:?}", kind, key);
                    key
                }
                Err(err) => {
                    tracing::debug!("Marker kind '{}' has unusable builder metadata: {}", kind, err);
                    None
                }
            }
        })
    }

    /// The cached resolution for `kind`, without resolving it
    pub fn cached_builder_type(&self, kind: &MarkerKind) -> Option<Option<BuilderKey>> {
        self.builder_types.get(kind)
    }

    /// The builder instance for `key`, constructing it on first use.
    ///
    /// A construction failure is sent to the diagnostic sink and yields
    /// `None`; it is not remembered, so a later call constructs again.
    /// Calls that were waiting on that failed construction yield `None`
    /// without constructing or reporting again.
    pub fn get_builder(&self, key: &BuilderKey) -> Option<Arc<dyn TestCaseBuilder>> {
        match self.instances.get_or_try_populate(key, || self.construct(key)) {
            Ok(builder) => Some(builder),
            Err(PopulateError::Failed(err)) => {
                self.diagnostics.send(&err.to_string());
                None
            }
            Err(PopulateError::Joined) => {
                tracing::debug!("Builder '{}' failed to construct for a concurrent caller", key);
                None
            }
        }
    }

    fn construct(&self, key: &BuilderKey) -> Result<Arc<dyn TestCaseBuilder>, Error> {
        let Some(factory) = self.factories.get(key) else {
            return Err(Error::BuilderConstruction {
                builder: key.to_string(),
                reason: "no builder is registered under this key".to_string(),
            });
        };

        tracing::debug!("Constructing builder '{}'", key);
        catch_fault(|| factory()).map_err(|fault| Error::BuilderConstruction {
            builder: key.to_string(),
            reason: fault.to_string(),
        })
    }
}
