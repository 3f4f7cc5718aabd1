use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::interfaces::{AssemblyInfo, MethodInfo, TypeInfo};

use super::{TestCollection, Traits};

/// One loaded unit under test
#[derive(Clone)]
pub struct TestAssembly {
    info: Arc<dyn AssemblyInfo>,
    config_file: Option<PathBuf>,
}

impl TestAssembly {
    pub fn new(info: Arc<dyn AssemblyInfo>, config_file: Option<PathBuf>) -> Self {
        Self { info, config_file }
    }

    pub fn info(&self) -> &Arc<dyn AssemblyInfo> {
        &self.info
    }

    pub fn name(&self) -> &str {
        self.info.name()
    }

    pub fn config_file(&self) -> Option<&Path> {
        self.config_file.as_deref()
    }
}

impl fmt::Debug for TestAssembly {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TestAssembly")
            .field("name", &self.name())
            .field("config_file", &self.config_file)
            .finish()
    }
}

/// A class under test, bound to the collection it was assigned to
#[derive(Clone)]
pub struct TestClass {
    collection: Arc<TestCollection>,
    class: Arc<dyn TypeInfo>,
}

impl TestClass {
    pub fn new(collection: Arc<TestCollection>, class: Arc<dyn TypeInfo>) -> Self {
        Self { collection, class }
    }

    pub fn collection(&self) -> &Arc<TestCollection> {
        &self.collection
    }

    pub fn class(&self) -> &Arc<dyn TypeInfo> {
        &self.class
    }

    pub fn name(&self) -> &str {
        self.class.name()
    }
}

impl fmt::Debug for TestClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TestClass")
            .field("name", &self.name())
            .field("collection", &self.collection.display_name)
            .finish()
    }
}

/// A method of a [`TestClass`], with the traits resolved for it
#[derive(Clone)]
pub struct TestMethod {
    class: TestClass,
    method: Arc<dyn MethodInfo>,
    traits: Traits,
}

impl TestMethod {
    pub fn new(class: TestClass, method: Arc<dyn MethodInfo>) -> Self {
        Self {
            class,
            method,
            traits: Traits::new(),
        }
    }

    pub fn with_traits(mut self, traits: Traits) -> Self {
        self.traits = traits;
        self
    }

    pub fn class(&self) -> &TestClass {
        &self.class
    }

    pub fn method(&self) -> &Arc<dyn MethodInfo> {
        &self.method
    }

    pub fn name(&self) -> &str {
        self.method.name()
    }

    pub fn traits(&self) -> &Traits {
        &self.traits
    }

    /// `Class.Method`
    pub fn qualified_name(&self) -> String {
        format!("{}.{}", self.class.name(), self.name())
    }
}

impl fmt::Debug for TestMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TestMethod")
            .field("class", &self.class.name())
            .field("method", &self.name())
            .field("traits", &self.traits)
            .finish()
    }
}
