//! Trait discovery
//!
//! Trait markers on a class or method resolve to a trait discoverer the same
//! way test-kind markers resolve to builders; the discoverer turns each
//! marker into `(name, value)` pairs.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use anyhow::Context;

use crate::{
    interfaces::{MarkerMetadata, MethodInfo, TraitDiscoverer, TypeInfo},
    types::{BuilderKey, Marker, MarkerFamily, MarkerKind, Traits},
};

use super::cache::ResolutionCache;

/// Key the built-in [`KeyValueTraitDiscoverer`] is registered under
pub const KEY_VALUE_TRAIT_DISCOVERER: &str = "key-value";

/// Reads the `name` and `value` properties of a trait marker
#[derive(Debug, Default, Clone, Copy)]
pub struct KeyValueTraitDiscoverer;

impl TraitDiscoverer for KeyValueTraitDiscoverer {
    fn traits(&self, marker: &Marker) -> anyhow::Result<Vec<(String, String)>> {
        let name = marker
            .str_property("name")
            .with_context(|| format!("Trait marker '{}' is missing a 'name' property", marker.kind))?;
        let value = marker.str_property("value").unwrap_or_default();
        Ok(vec![(name.to_string(), value.to_string())])
    }
}

pub struct TraitRegistry {
    metadata: Arc<dyn MarkerMetadata>,
    discoverers: HashMap<BuilderKey, Arc<dyn TraitDiscoverer>>,
    resolved: ResolutionCache<MarkerKind, Option<BuilderKey>>,
}

impl fmt::Debug for TraitRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TraitRegistry")
            .field("discoverers", &self.discoverers.keys().collect::<Vec<_>>())
            .field("resolved_kinds", &self.resolved.len())
            .finish()
    }
}

impl TraitRegistry {
    /// A registry with [`KeyValueTraitDiscoverer`] registered
    pub fn new(metadata: Arc<dyn MarkerMetadata>) -> Self {
        let mut registry = Self {
            metadata,
            discoverers: HashMap::new(),
            resolved: ResolutionCache::default(),
        };
        registry.register(KEY_VALUE_TRAIT_DISCOVERER, Arc::new(KeyValueTraitDiscoverer));
        registry
    }

    pub fn register(&mut self, key: impl Into<BuilderKey>, discoverer: Arc<dyn TraitDiscoverer>) {
        self.discoverers.insert(key.into(), discoverer);
    }

    /// The discoverer key for a trait marker kind, cached like builder keys
    pub fn resolve(&self, kind: &MarkerKind) -> Option<BuilderKey> {
        self.resolved.get_or_populate(kind, || {
            self.metadata.trait_discoverer(kind).unwrap_or_else(|err| {
                tracing::debug!("Trait marker kind '{}' has unusable metadata: {}", kind, err);
                None
            })
        })
    }

    /// Collect the traits declared by `markers`, in marker order
    pub fn traits_for(&self, markers: &[Marker]) -> anyhow::Result<Traits> {
        let mut traits = Traits::new();
        self.collect(markers, &mut traits)?;
        Ok(traits)
    }

    /// Traits of a method: the class's traits followed by the method's own
    pub fn method_traits(&self, class: &dyn TypeInfo, method: &dyn MethodInfo) -> anyhow::Result<Traits> {
        let mut traits = Traits::new();
        self.collect(&class.markers(MarkerFamily::Trait), &mut traits)?;
        self.collect(&method.markers(MarkerFamily::Trait)?, &mut traits)?;
        Ok(traits)
    }

    fn collect(&self, markers: &[Marker], traits: &mut Traits) -> anyhow::Result<()> {
        for marker in markers {
            let Some(key) = self.resolve(&marker.kind) else {
                continue;
            };
            let Some(discoverer) = self.discoverers.get(&key) else {
                tracing::debug!("No trait discoverer registered under '{}'", key);
                continue;
            };

            for (name, value) in discoverer.traits(marker)? {
                let values = traits.entry(name).or_default();
                if !values.contains(&value) {
                    values.push(value);
                }
            }
        }
        Ok(())
    }
}
