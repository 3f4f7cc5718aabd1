use crate::{
    config::DiscoveryOptions,
    error::{Result, catch_fault},
    naming::TestCaseNamer,
    registry::{BuilderRegistry, TraitRegistry},
    types::{Marker, TestCase, TestClass, TestMethod},
};

use super::method::MethodDiscovery;

/// Discovers every method of a class, isolating per-method faults
pub(crate) struct ClassDiscovery<'a> {
    methods: MethodDiscovery<'a>,
    traits: &'a TraitRegistry,
    namer: &'a dyn TestCaseNamer,
}

impl<'a> ClassDiscovery<'a> {
    pub(crate) fn new(
        registry: &'a BuilderRegistry,
        traits: &'a TraitRegistry,
        namer: &'a dyn TestCaseNamer,
    ) -> Self {
        Self {
            methods: MethodDiscovery::new(registry, namer),
            traits,
            namer,
        }
    }

    /// Visits the class's methods, non-public ones included, in enumeration
    /// order. A method whose discovery faults is reported as one error case
    /// and the walk moves on. Returns `Ok(false)` once the callback asks to
    /// stop; an error enumerating the methods is returned as is.
    pub(crate) fn discover(
        &self,
        class: &TestClass,
        options: &DiscoveryOptions,
        on_test_case: &mut dyn FnMut(TestCase) -> bool,
    ) -> Result<bool> {
        let methods = class.class().methods(true)?;
        tracing::debug!("Discovering {} methods of '{}'", methods.len(), class.name());

        for method in methods {
            let test_method = TestMethod::new(class.clone(), method);

            let outcome = catch_fault(|| {
                let traits = self
                    .traits
                    .method_traits(class.class().as_ref(), test_method.method().as_ref())?;
                let test_method = test_method.clone().with_traits(traits);
                self.methods.discover(&test_method, options, &mut *on_test_case)
            });

            match outcome {
                Ok(true) => {}
                Ok(false) => {
                    tracing::debug!("Discovery of '{}' stopped by the consumer", class.name());
                    return Ok(false);
                }
                Err(fault) => {
                    tracing::debug!("Discovery of '{}' faulted: {}", test_method.qualified_name(), fault);
                    let details = self.namer.details(options, &test_method, &Marker::default_test());
                    let message = format!("Exception during discovery:\n{}", fault.detail());
                    on_test_case(TestCase::error(details, message));
                }
            }
        }

        Ok(true)
    }
}
