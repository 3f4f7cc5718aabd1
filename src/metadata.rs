use std::sync::atomic::{AtomicUsize, Ordering};

use testscout_core::{BuilderKey, MarkerKind, MarkerMetadata, Result};

/// Wraps a [`MarkerMetadata`] and counts the lookups made through it
#[derive(Debug, Default)]
pub struct CountingMetadata<M> {
    inner: M,
    builder_lookups: AtomicUsize,
    trait_lookups: AtomicUsize,
}

impl<M> CountingMetadata<M> {
    pub fn new(inner: M) -> Self {
        Self {
            inner,
            builder_lookups: AtomicUsize::new(0),
            trait_lookups: AtomicUsize::new(0),
        }
    }

    pub fn builder_lookups(&self) -> usize {
        self.builder_lookups.load(Ordering::SeqCst)
    }

    pub fn trait_lookups(&self) -> usize {
        self.trait_lookups.load(Ordering::SeqCst)
    }
}

impl<M: MarkerMetadata> MarkerMetadata for CountingMetadata<M> {
    fn builder_association(&self, kind: &MarkerKind) -> Result<Option<BuilderKey>> {
        self.builder_lookups.fetch_add(1, Ordering::SeqCst);
        self.inner.builder_association(kind)
    }

    fn trait_discoverer(&self, kind: &MarkerKind) -> Result<Option<BuilderKey>> {
        self.trait_lookups.fetch_add(1, Ordering::SeqCst);
        self.inner.trait_discoverer(kind)
    }
}
