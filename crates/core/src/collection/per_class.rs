use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;

use crate::{
    interfaces::TypeInfo,
    types::{MarkerFamily, TestCollection},
};

use super::CollectionGrouper;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum CollectionKey {
    Class(String),
    Definition(String),
}

/// One collection per class, unless the class names a shared collection
/// through a `collection` marker with a `name` property.
#[derive(Debug)]
pub struct CollectionPerClass {
    assembly_name: String,
    collections: Mutex<HashMap<CollectionKey, Arc<TestCollection>>>,
}

impl CollectionPerClass {
    pub fn new(assembly_name: impl Into<String>) -> Self {
        Self {
            assembly_name: assembly_name.into(),
            collections: Mutex::new(HashMap::new()),
        }
    }

    fn definition_name(class: &dyn TypeInfo) -> Option<String> {
        class
            .markers(MarkerFamily::Collection)
            .iter()
            .find_map(|m| m.str_property("name").map(str::to_string))
    }
}

impl CollectionGrouper for CollectionPerClass {
    fn display_name(&self) -> &str {
        "collection-per-class"
    }

    fn collection_for(&self, class: &dyn TypeInfo) -> Arc<TestCollection> {
        let key = match Self::definition_name(class) {
            Some(name) => CollectionKey::Definition(name),
            None => CollectionKey::Class(class.name().to_string()),
        };

        self.collections
            .lock()
            .entry(key)
            .or_insert_with_key(|key| {
                let collection = match key {
                    CollectionKey::Definition(name) => {
                        TestCollection::new(&self.assembly_name, name.clone(), Some(name.clone()))
                    }
                    CollectionKey::Class(name) => TestCollection::new(
                        &self.assembly_name,
                        format!("Test collection for {name}"),
                        None,
                    ),
                };
                tracing::debug!("Created test collection '{}'", collection.display_name);
                Arc::new(collection)
            })
            .clone()
    }
}
