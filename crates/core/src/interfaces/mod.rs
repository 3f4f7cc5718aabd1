//! Core interfaces for the discovery engine
//!
//! This module defines the trait seams between the engine and its
//! collaborators: the host's introspection provider, the marker metadata
//! source, and the pluggable case builders.

pub mod builder;
pub mod introspection;
pub mod marker_metadata;

pub use builder::{TestCaseBuilder, TestCaseIter, TraitDiscoverer};
pub use introspection::{AssemblyInfo, MethodInfo, TypeInfo};
pub use marker_metadata::MarkerMetadata;
