//! Service implementations of the interface traits
//!
//! This module provides concrete, data-driven implementations of the
//! introspection and marker metadata interfaces.

pub mod marker_catalog;
pub mod static_assembly;

pub use marker_catalog::{MarkerCatalog, MarkerDeclaration, TRAIT_KIND};
pub use static_assembly::{AssemblyManifest, StaticAssembly, StaticMethod, StaticType};
