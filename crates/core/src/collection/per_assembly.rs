use std::sync::Arc;

use crate::{interfaces::TypeInfo, types::TestCollection};

use super::CollectionGrouper;

/// Every class of the assembly shares a single collection
#[derive(Debug)]
pub struct CollectionPerAssembly {
    collection: Arc<TestCollection>,
}

impl CollectionPerAssembly {
    pub fn new(assembly_name: impl Into<String>) -> Self {
        let assembly_name = assembly_name.into();
        let display_name = format!("Test collection for {assembly_name}");
        Self {
            collection: Arc::new(TestCollection::new(assembly_name, display_name, None)),
        }
    }
}

impl CollectionGrouper for CollectionPerAssembly {
    fn display_name(&self) -> &str {
        "collection-per-assembly"
    }

    fn collection_for(&self, _class: &dyn TypeInfo) -> Arc<TestCollection> {
        self.collection.clone()
    }
}
