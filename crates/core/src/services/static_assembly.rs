//! In-memory introspection provider
//!
//! Implements the introspection interfaces over plain data, either built in
//! code or loaded from a JSON assembly manifest.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;

use crate::{
    error::{Error, Result},
    interfaces::{AssemblyInfo, MethodInfo, TypeInfo},
    types::{Marker, MarkerFamily},
};

use super::{MarkerCatalog, MarkerDeclaration};

fn of_family(markers: &[Marker], family: MarkerFamily) -> Vec<Marker> {
    markers.iter().filter(|m| m.family == family).cloned().collect()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StaticMethod {
    pub name: String,
    #[serde(default = "default_public")]
    pub public: bool,
    #[serde(default)]
    pub markers: Vec<Marker>,
}

fn default_public() -> bool {
    true
}

impl StaticMethod {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            public: true,
            markers: Vec::new(),
        }
    }

    pub fn private(mut self) -> Self {
        self.public = false;
        self
    }

    pub fn with_marker(mut self, marker: Marker) -> Self {
        self.markers.push(marker);
        self
    }
}

impl MethodInfo for StaticMethod {
    fn name(&self) -> &str {
        &self.name
    }

    fn is_public(&self) -> bool {
        self.public
    }

    fn markers(&self, family: MarkerFamily) -> anyhow::Result<Vec<Marker>> {
        Ok(of_family(&self.markers, family))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StaticType {
    pub name: String,
    #[serde(default, rename = "abstract")]
    pub is_abstract: bool,
    #[serde(default)]
    pub markers: Vec<Marker>,
    #[serde(default)]
    pub methods: Vec<StaticMethod>,
}

impl StaticType {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            is_abstract: false,
            markers: Vec::new(),
            methods: Vec::new(),
        }
    }

    pub fn abstract_type(mut self) -> Self {
        self.is_abstract = true;
        self
    }

    pub fn with_marker(mut self, marker: Marker) -> Self {
        self.markers.push(marker);
        self
    }

    pub fn with_method(mut self, method: StaticMethod) -> Self {
        self.methods.push(method);
        self
    }
}

impl TypeInfo for StaticType {
    fn name(&self) -> &str {
        &self.name
    }

    fn is_abstract(&self) -> bool {
        self.is_abstract
    }

    fn methods(&self, include_private: bool) -> Result<Vec<Arc<dyn MethodInfo>>> {
        Ok(self
            .methods
            .iter()
            .filter(|m| include_private || m.public)
            .map(|m| Arc::new(m.clone()) as Arc<dyn MethodInfo>)
            .collect())
    }

    fn markers(&self, family: MarkerFamily) -> Vec<Marker> {
        of_family(&self.markers, family)
    }
}

#[derive(Debug, Clone, Default)]
pub struct StaticAssembly {
    name: String,
    markers: Vec<Marker>,
    types: Vec<Arc<StaticType>>,
}

impl StaticAssembly {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_marker(mut self, marker: Marker) -> Self {
        self.markers.push(marker);
        self
    }

    pub fn with_type(mut self, ty: StaticType) -> Self {
        self.types.push(Arc::new(ty));
        self
    }

    /// The type named `name`, as the handle the engine works with
    pub fn type_info(&self, name: &str) -> Option<Arc<dyn TypeInfo>> {
        self.types
            .iter()
            .find(|t| t.name == name)
            .map(|t| t.clone() as Arc<dyn TypeInfo>)
    }
}

impl AssemblyInfo for StaticAssembly {
    fn name(&self) -> &str {
        &self.name
    }

    fn types(&self) -> Result<Vec<Arc<dyn TypeInfo>>> {
        Ok(self
            .types
            .iter()
            .map(|t| t.clone() as Arc<dyn TypeInfo>)
            .collect())
    }

    fn markers(&self, family: MarkerFamily) -> Vec<Marker> {
        of_family(&self.markers, family)
    }
}

/// JSON description of an assembly and the marker kinds it uses
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssemblyManifest {
    pub name: String,
    #[serde(default)]
    pub markers: Vec<Marker>,
    #[serde(default)]
    pub declarations: Vec<MarkerDeclaration>,
    #[serde(default)]
    pub types: Vec<StaticType>,
}

impl AssemblyManifest {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load_from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        serde_json::from_str(&contents).map_err(|e| {
            Error::IntrospectionError(format!("Failed to parse manifest {}: {e}", path.display()))
        })
    }

    /// Split into the introspection handle and the marker catalog
    /// (built-in declarations plus the manifest's own).
    pub fn into_parts(self) -> (StaticAssembly, MarkerCatalog) {
        let mut catalog = MarkerCatalog::with_defaults();
        for declaration in self.declarations {
            catalog.declare(declaration);
        }

        let assembly = StaticAssembly {
            name: self.name,
            markers: self.markers,
            types: self.types.into_iter().map(Arc::new).collect(),
        };
        (assembly, catalog)
    }
}
