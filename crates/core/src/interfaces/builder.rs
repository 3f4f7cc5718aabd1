//! Case builder interface
//!
//! Defines the capability a builder must implement to turn one marked
//! method into test cases.

use crate::{
    config::DiscoveryOptions,
    types::{Marker, TestCase, TestMethod},
};

/// Lazily produced test cases. An `Err` item is a discovery fault.
pub type TestCaseIter<'a> = Box<dyn Iterator<Item = anyhow::Result<TestCase>> + 'a>;

/// Turns a marked method into zero or more test cases.
///
/// Builders are cached and shared across methods, classes and threads, so
/// they must not keep per-call state.
pub trait TestCaseBuilder: Send + Sync {
    fn discover<'a>(
        &'a self,
        options: &'a DiscoveryOptions,
        method: &'a TestMethod,
        marker: &'a Marker,
    ) -> anyhow::Result<TestCaseIter<'a>>;
}

/// Resolves a trait marker into `(name, value)` pairs
pub trait TraitDiscoverer: Send + Sync {
    fn traits(&self, marker: &Marker) -> anyhow::Result<Vec<(String, String)>>;
}
