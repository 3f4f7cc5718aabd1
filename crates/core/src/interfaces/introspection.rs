//! Introspection interface
//!
//! Provides abstraction over the host's view of assemblies, types and
//! methods, so discovery never depends on a concrete reflection mechanism.

use std::sync::Arc;

use crate::{
    error::Result,
    types::{Marker, MarkerFamily},
};

/// A loaded unit under test
pub trait AssemblyInfo: Send + Sync {
    /// Assembly name, used for collection ids and display names
    fn name(&self) -> &str;

    /// All types declared in the assembly, in declaration order
    fn types(&self) -> Result<Vec<Arc<dyn TypeInfo>>>;

    /// Assembly-level markers of the given family
    fn markers(&self, family: MarkerFamily) -> Vec<Marker>;
}

/// A candidate test class
pub trait TypeInfo: Send + Sync {
    /// Full name of the type; two handles with the same name are the same class
    fn name(&self) -> &str;

    /// Abstract types cannot hold runnable tests
    fn is_abstract(&self) -> bool {
        false
    }

    /// Methods of the type in enumeration order
    fn methods(&self, include_private: bool) -> Result<Vec<Arc<dyn MethodInfo>>>;

    /// Class-level markers of the given family
    fn markers(&self, family: MarkerFamily) -> Vec<Marker>;
}

/// A method of a candidate test class
pub trait MethodInfo: Send + Sync {
    fn name(&self) -> &str;

    fn is_public(&self) -> bool {
        true
    }

    /// Markers of the given family attached to the method, including the
    /// ones inherited through marker kind declarations. Inspection is user
    /// territory and may fail.
    fn markers(&self, family: MarkerFamily) -> anyhow::Result<Vec<Marker>>;
}
