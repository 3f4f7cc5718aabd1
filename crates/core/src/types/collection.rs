use serde::{Deserialize, Serialize};

/// A named group of test classes that share fixtures and run in the same
/// parallelization domain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestCollection {
    pub id: String,
    pub display_name: String,
    pub assembly_name: String,
    /// Name of the collection definition when classes opted into a named collection
    #[serde(skip_serializing_if = "Option::is_none")]
    pub definition: Option<String>,
}

impl TestCollection {
    pub fn new(
        assembly_name: impl Into<String>,
        display_name: impl Into<String>,
        definition: Option<String>,
    ) -> Self {
        let assembly_name = assembly_name.into();
        let display_name = display_name.into();
        let id = format!(
            "{:x}",
            md5::compute(format!("{assembly_name}\0{display_name}").as_bytes())
        );
        Self {
            id,
            display_name,
            assembly_name,
            definition,
        }
    }
}
