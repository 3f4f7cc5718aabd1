//! Ready-made case builders
//!
//! [`FactBuilder`] and [`TheoryBuilder`] cover the two usual test kinds: a
//! plain test and a data-driven one. [`FailingBuilder`] and
//! [`RecordingBuilder`] exist to observe how discovery reacts to builders.

use std::sync::Arc;

use anyhow::{Context, anyhow};
use parking_lot::Mutex;
use serde_json::Value;
use testscout_core::{
    DefaultNamer, DiscoveryOptions, Marker, TestCase, TestCaseBuilder, TestCaseIter, TestCaseNamer, TestMethod,
};

/// Builder key [`FactBuilder`] is usually registered under
pub const FACT: &str = "fact";
/// Builder key [`TheoryBuilder`] is usually registered under
pub const THEORY: &str = "theory";

/// One test case per marked method
#[derive(Debug, Default, Clone, Copy)]
pub struct FactBuilder;

impl TestCaseBuilder for FactBuilder {
    fn discover<'a>(
        &'a self,
        options: &'a DiscoveryOptions,
        method: &'a TestMethod,
        marker: &'a Marker,
    ) -> anyhow::Result<TestCaseIter<'a>> {
        let case = TestCase::new(DefaultNamer.details(options, method, marker));
        Ok(Box::new(std::iter::once(Ok(case))))
    }
}

/// One test case per row of the marker's `data` property.
///
/// Each row must be a JSON array of arguments. Rows are produced lazily; a
/// row that is not an array is yielded as an error. With theory
/// pre-enumeration disabled the method becomes a single case.
#[derive(Debug, Default, Clone, Copy)]
pub struct TheoryBuilder;

impl TestCaseBuilder for TheoryBuilder {
    fn discover<'a>(
        &'a self,
        options: &'a DiscoveryOptions,
        method: &'a TestMethod,
        marker: &'a Marker,
    ) -> anyhow::Result<TestCaseIter<'a>> {
        let details = DefaultNamer.details(options, method, marker);
        if !options.pre_enumerate_theories {
            return Ok(Box::new(std::iter::once(Ok(TestCase::new(details)))));
        }

        let rows = marker
            .property("data")
            .and_then(Value::as_array)
            .with_context(|| format!("Theory '{}' has no 'data' rows", method.qualified_name()))?;

        Ok(Box::new(rows.iter().enumerate().map(move |(index, row)| -> anyhow::Result<TestCase> {
            let args = row
                .as_array()
                .ok_or_else(|| anyhow!("Data row {index} of '{}' is not an array", method.qualified_name()))?;
            Ok(TestCase::new(details.clone()).with_data(args.clone()))
        })))
    }
}

/// Always fails to produce cases
#[derive(Debug, Clone)]
pub struct FailingBuilder {
    message: String,
}

impl FailingBuilder {
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into() }
    }
}

impl TestCaseBuilder for FailingBuilder {
    fn discover<'a>(
        &'a self,
        _options: &'a DiscoveryOptions,
        _method: &'a TestMethod,
        _marker: &'a Marker,
    ) -> anyhow::Result<TestCaseIter<'a>> {
        Err(anyhow!("{}", self.message))
    }
}

/// Delegates to another builder and remembers which methods it was asked about
pub struct RecordingBuilder {
    inner: Arc<dyn TestCaseBuilder>,
    calls: Mutex<Vec<String>>,
}

impl RecordingBuilder {
    pub fn new(inner: impl TestCaseBuilder + 'static) -> Self {
        Self {
            inner: Arc::new(inner),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Qualified names of the methods seen so far, in call order
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }
}

impl TestCaseBuilder for RecordingBuilder {
    fn discover<'a>(
        &'a self,
        options: &'a DiscoveryOptions,
        method: &'a TestMethod,
        marker: &'a Marker,
    ) -> anyhow::Result<TestCaseIter<'a>> {
        self.calls.lock().push(method.qualified_name());
        self.inner.discover(options, method, marker)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use testscout_core::{StaticMethod, StaticType, TestClass, TestCollection};

    fn method(name: &str) -> TestMethod {
        let collection = Arc::new(TestCollection::new("Calc.Tests", "Test collection for Calc", None));
        let class = TestClass::new(collection, Arc::new(StaticType::new("Calc")));
        TestMethod::new(class, Arc::new(StaticMethod::new(name)))
    }

    #[test]
    fn test_theory_rows_become_cases() -> anyhow::Result<()> {
        let method = method("Add");
        let marker = Marker::test(THEORY).with_property("data", json!([[1, 2], [3, 4]]));
        let options = DiscoveryOptions::default();

        let cases = TheoryBuilder
            .discover(&options, &method, &marker)?
            .collect::<anyhow::Result<Vec<_>>>()?;

        let names: Vec<_> = cases.iter().map(|c| c.display_name.as_str()).collect();
        assert_eq!(names, vec!["Calc.Add(1, 2)", "Calc.Add(3, 4)"]);
        assert_ne!(cases[0].unique_id, cases[1].unique_id);
        Ok(())
    }

    #[test]
    fn test_theory_without_pre_enumeration() -> anyhow::Result<()> {
        let method = method("Add");
        let marker = Marker::test(THEORY).with_property("data", json!([[1, 2], [3, 4]]));
        let options = DiscoveryOptions::default().with_pre_enumerate_theories(false);

        let cases: Vec<_> = TheoryBuilder.discover(&options, &method, &marker)?.collect();
        assert_eq!(cases.len(), 1);
        Ok(())
    }

    #[test]
    fn test_bad_row_is_yielded_as_error() -> anyhow::Result<()> {
        let method = method("Add");
        let marker = Marker::test(THEORY).with_property("data", json!([[1], "oops", [2]]));
        let options = DiscoveryOptions::default();

        let items: Vec<_> = TheoryBuilder.discover(&options, &method, &marker)?.collect();
        assert!(items[0].is_ok());
        assert_eq!(
            items[1].as_ref().unwrap_err().to_string(),
            "Data row 1 of 'Calc.Add' is not an array"
        );
        assert!(items[2].is_ok());
        Ok(())
    }

    #[test]
    fn test_recording_builder_delegates() -> anyhow::Result<()> {
        let builder = RecordingBuilder::new(FactBuilder);
        let options = DiscoveryOptions::default();
        let cases: Vec<_> = builder.discover(&options, &method("Add"), &Marker::test(FACT))?.collect();

        assert_eq!(cases.len(), 1);
        assert_eq!(builder.calls(), vec!["Calc.Add"]);
        Ok(())
    }
}
