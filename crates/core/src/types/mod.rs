pub mod collection;
pub mod marker;
pub mod test_case;
pub mod test_unit;

use std::collections::BTreeMap;

/// Trait name to values, in sorted order
pub type Traits = BTreeMap<String, Vec<String>>;

// Re-export commonly used types
pub use collection::TestCollection;
pub use marker::{BuilderKey, DEFAULT_TEST_KIND, Marker, MarkerFamily, MarkerKind};
pub use test_case::{TestCase, TestCaseKind};
pub use test_unit::{TestAssembly, TestClass, TestMethod};
