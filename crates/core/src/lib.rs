//! testscout - Marker-driven test discovery
//!
//! This crate provides functionality to:
//! - Resolve test-kind markers on methods to the builders that produce test cases
//! - Group test classes into test collections
//! - Walk classes and assemblies, isolating faults to the method that raised them
//! - Report test cases to a consumer that may stop discovery at any point
pub mod collection;
pub mod config;
pub mod diagnostics;
pub mod discovery;
pub mod error;
pub mod interfaces;
pub mod naming;
pub mod registry;
pub mod services;
pub mod types;

// Re-export commonly used types and traits
pub use error::{Error, Fault, Result};
pub use types::*;

// Re-export main API components
pub use collection::{CollectionGrouper, CollectionPerAssembly, CollectionPerClass};
pub use config::{CollectionBehavior, Config, DiscoveryOptions, MethodDisplay};
pub use diagnostics::{CollectingSink, DiagnosticSink, NullSink, TracingSink};
pub use discovery::{DiscoveryEngine, EngineBuilder, FRAMEWORK_DISPLAY_NAME};
pub use interfaces::{
    AssemblyInfo, MarkerMetadata, MethodInfo, TestCaseBuilder, TestCaseIter, TraitDiscoverer, TypeInfo,
};
pub use naming::{DefaultNamer, TestCaseDetails, TestCaseNamer};
pub use registry::{BuilderRegistry, TraitRegistry};
pub use services::{AssemblyManifest, MarkerCatalog, MarkerDeclaration, StaticAssembly, StaticMethod, StaticType};
