//! Marker metadata interface
//!
//! Answers which builder (or trait discoverer) a marker kind is bound to.

use crate::{
    error::Result,
    types::{BuilderKey, MarkerKind},
};

/// Source of marker kind declarations.
///
/// Lookups may walk a chain of declarations and are expected to be
/// comparatively expensive; the registry caches their answers per kind.
pub trait MarkerMetadata: Send + Sync {
    /// The case builder declared for `kind`, if any
    fn builder_association(&self, kind: &MarkerKind) -> Result<Option<BuilderKey>>;

    /// The trait discoverer declared for `kind`, if any
    fn trait_discoverer(&self, kind: &MarkerKind) -> Result<Option<BuilderKey>>;
}
