//! Collection grouping
//!
//! Decides which [`TestCollection`] a class belongs to. Classes in one
//! collection share fixtures and never run in parallel with each other.

mod per_assembly;
mod per_class;

pub use per_assembly::CollectionPerAssembly;
pub use per_class::CollectionPerClass;

use std::sync::Arc;

use crate::{
    interfaces::TypeInfo,
    types::{TestAssembly, TestCollection},
};

pub trait CollectionGrouper: Send + Sync {
    /// Short name shown in the framework display name
    fn display_name(&self) -> &str;

    /// The collection for `class`. Repeated calls for the same class must
    /// return the same collection instance.
    fn collection_for(&self, class: &dyn TypeInfo) -> Arc<TestCollection>;
}

/// Creates a custom grouper for an assembly; registered by name so the
/// assembly's collection behavior marker can select it.
pub type GrouperFactory =
    Arc<dyn Fn(&TestAssembly) -> Arc<dyn CollectionGrouper> + Send + Sync>;
