use crate::{
    config::DiscoveryOptions,
    naming::TestCaseNamer,
    registry::BuilderRegistry,
    types::{MarkerFamily, TestCase, TestMethod},
};

/// Discovers the test cases of one method
pub(crate) struct MethodDiscovery<'a> {
    registry: &'a BuilderRegistry,
    namer: &'a dyn TestCaseNamer,
}

impl<'a> MethodDiscovery<'a> {
    pub(crate) fn new(registry: &'a BuilderRegistry, namer: &'a dyn TestCaseNamer) -> Self {
        Self { registry, namer }
    }

    /// Hands every case the method's builder yields to `on_test_case`, in
    /// yield order. Returns `Ok(false)` as soon as the callback asks to stop.
    ///
    /// An error from marker inspection, from the builder or from one of the
    /// yielded items is a fault and is returned to the caller.
    pub(crate) fn discover(
        &self,
        method: &TestMethod,
        options: &DiscoveryOptions,
        on_test_case: &mut dyn FnMut(TestCase) -> bool,
    ) -> anyhow::Result<bool> {
        let markers = method.method().markers(MarkerFamily::TestKind)?;

        let marker = match markers.as_slice() {
            [] => return Ok(true),
            [marker] => marker,
            [first, ..] => {
                let message = format!(
                    "Test method '{}' has multiple test-kind markers",
                    method.qualified_name()
                );
                let details = self.namer.details(options, method, first);
                return Ok(on_test_case(TestCase::error(details, message)));
            }
        };

        let Some(builder_key) = self.registry.resolve_builder_type(&marker.kind) else {
            tracing::debug!(
                "Marker '{}' on '{}' has no builder, skipping",
                marker.kind,
                method.qualified_name()
            );
            return Ok(true);
        };

        let Some(builder) = self.registry.get_builder(&builder_key) else {
            return Ok(true);
        };

        for test_case in builder.discover(options, method, marker)? {
            if !on_test_case(test_case?) {
                return Ok(false);
            }
        }

        Ok(true)
    }
}
