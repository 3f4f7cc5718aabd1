//! Display names and unique ids for test cases

use crate::{
    config::{DiscoveryOptions, MethodDisplay},
    types::{Marker, TestMethod, Traits},
};

/// Everything a builder (or the engine, for error cases) needs to label a
/// test case produced from one method and marker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestCaseDetails {
    pub display_name: String,
    pub unique_id: String,
    pub collection: String,
    pub class_name: String,
    pub method_name: String,
    pub skip_reason: Option<String>,
    pub timeout_ms: Option<u64>,
    pub traits: Traits,
}

pub trait TestCaseNamer: Send + Sync {
    fn details(&self, options: &DiscoveryOptions, method: &TestMethod, marker: &Marker) -> TestCaseDetails;
}

/// Names cases after the marker's display name, falling back to the
/// method name in the configured [`MethodDisplay`] style. Unique ids are an
/// md5 digest of the collection, class and method.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultNamer;

impl DefaultNamer {
    pub fn unique_id(method: &TestMethod) -> String {
        let class = method.class();
        let key = format!(
            "{}\0{}\0{}",
            class.collection().id,
            class.name(),
            method.name()
        );
        format!("{:x}", md5::compute(key.as_bytes()))
    }
}

impl TestCaseNamer for DefaultNamer {
    fn details(&self, options: &DiscoveryOptions, method: &TestMethod, marker: &Marker) -> TestCaseDetails {
        let display_name = match &marker.display_name {
            Some(name) => name.clone(),
            None => match options.method_display {
                MethodDisplay::ClassAndMethod => method.qualified_name(),
                MethodDisplay::Method => method.name().to_string(),
            },
        };

        TestCaseDetails {
            display_name,
            unique_id: Self::unique_id(method),
            collection: method.class().collection().display_name.clone(),
            class_name: method.class().name().to_string(),
            method_name: method.name().to_string(),
            skip_reason: marker.skip.clone(),
            timeout_ms: marker.timeout_ms,
            traits: method.traits().clone(),
        }
    }
}
