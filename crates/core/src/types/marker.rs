use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

/// Kind used for the default (empty) test marker context, e.g. when labelling
/// an error case for a method whose discovery faulted.
pub const DEFAULT_TEST_KIND: &str = "fact";

/// Discriminator of a marker, e.g. `fact` or `theory`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MarkerKind(String);

impl MarkerKind {
    pub fn new(kind: impl Into<String>) -> Self {
        Self(kind.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for MarkerKind {
    fn from(kind: &str) -> Self {
        Self::new(kind)
    }
}

impl From<String> for MarkerKind {
    fn from(kind: String) -> Self {
        Self(kind)
    }
}

impl fmt::Display for MarkerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Name a builder or trait discoverer is registered under
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BuilderKey(String);

impl BuilderKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for BuilderKey {
    fn from(key: &str) -> Self {
        Self::new(key)
    }
}

impl From<String> for BuilderKey {
    fn from(key: String) -> Self {
        Self(key)
    }
}

impl fmt::Display for BuilderKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The family a marker belongs to. Introspection providers filter markers by
/// family, so a method's test-kind markers never mix with its trait markers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MarkerFamily {
    /// Identifies a method as a test (`fact`, `theory`, ...)
    TestKind,
    /// Key/value categorisation resolved by a trait discoverer
    Trait,
    /// Places a class into a named test collection
    Collection,
    /// Assembly-level collection and parallelization settings
    CollectionBehavior,
}

/// A declarative annotation attached to an assembly, class or method.
///
/// The kind-specific configuration a builder reads lives in the common
/// fields (`display_name`, `skip`, `timeout_ms`) or in `properties`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Marker {
    pub kind: MarkerKind,
    pub family: MarkerFamily,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skip: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_ms: Option<u64>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub properties: BTreeMap<String, serde_json::Value>,
}

impl Marker {
    pub fn new(family: MarkerFamily, kind: impl Into<MarkerKind>) -> Self {
        Self {
            kind: kind.into(),
            family,
            display_name: None,
            skip: None,
            timeout_ms: None,
            properties: BTreeMap::new(),
        }
    }

    /// Shorthand for a marker of the test-kind family
    pub fn test(kind: impl Into<MarkerKind>) -> Self {
        Self::new(MarkerFamily::TestKind, kind)
    }

    /// A `key = value` trait marker
    pub fn trait_pair(kind: impl Into<MarkerKind>, name: &str, value: &str) -> Self {
        Self::new(MarkerFamily::Trait, kind)
            .with_property("name", name)
            .with_property("value", value)
    }

    /// The empty test marker used when no real marker context is available
    pub fn default_test() -> Self {
        Self::test(DEFAULT_TEST_KIND)
    }

    pub fn with_display_name(mut self, display_name: impl Into<String>) -> Self {
        self.display_name = Some(display_name.into());
        self
    }

    pub fn with_skip(mut self, reason: impl Into<String>) -> Self {
        self.skip = Some(reason.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout_ms = Some(u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX));
        self
    }

    pub fn with_property(mut self, name: &str, value: impl Into<serde_json::Value>) -> Self {
        self.properties.insert(name.to_string(), value.into());
        self
    }

    pub fn property(&self, name: &str) -> Option<&serde_json::Value> {
        self.properties.get(name)
    }

    pub fn str_property(&self, name: &str) -> Option<&str> {
        self.property(name).and_then(|v| v.as_str())
    }

    pub fn bool_property(&self, name: &str) -> Option<bool> {
        self.property(name).and_then(|v| v.as_bool())
    }

    pub fn u64_property(&self, name: &str) -> Option<u64> {
        self.property(name).and_then(|v| v.as_u64())
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_ms.map(Duration::from_millis)
    }
}
