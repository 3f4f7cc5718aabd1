//! Static marker catalog
//!
//! Provides a [`MarkerMetadata`] built from explicit declarations: each
//! marker kind may name its builder, its trait discoverer, and a base kind
//! it inherits unset associations from.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

use crate::{
    error::{Error, Result},
    interfaces::MarkerMetadata,
    registry::KEY_VALUE_TRAIT_DISCOVERER,
    types::{BuilderKey, MarkerKind},
};

/// Kind of the built-in `name = value` trait marker
pub const TRAIT_KIND: &str = "trait";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkerDeclaration {
    pub kind: MarkerKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base: Option<MarkerKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub builder: Option<BuilderKey>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trait_discoverer: Option<BuilderKey>,
}

impl MarkerDeclaration {
    pub fn new(kind: impl Into<MarkerKind>) -> Self {
        Self {
            kind: kind.into(),
            base: None,
            builder: None,
            trait_discoverer: None,
        }
    }

    pub fn with_base(mut self, base: impl Into<MarkerKind>) -> Self {
        self.base = Some(base.into());
        self
    }

    pub fn with_builder(mut self, builder: impl Into<BuilderKey>) -> Self {
        self.builder = Some(builder.into());
        self
    }

    pub fn with_trait_discoverer(mut self, discoverer: impl Into<BuilderKey>) -> Self {
        self.trait_discoverer = Some(discoverer.into());
        self
    }
}

#[derive(Debug, Clone, Default)]
pub struct MarkerCatalog {
    declarations: HashMap<MarkerKind, MarkerDeclaration>,
}

impl MarkerCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// A catalog that already declares the built-in `trait` marker kind
    pub fn with_defaults() -> Self {
        Self::new().with_declaration(
            MarkerDeclaration::new(TRAIT_KIND).with_trait_discoverer(KEY_VALUE_TRAIT_DISCOVERER),
        )
    }

    pub fn declare(&mut self, declaration: MarkerDeclaration) -> &mut Self {
        self.declarations.insert(declaration.kind.clone(), declaration);
        self
    }

    pub fn with_declaration(mut self, declaration: MarkerDeclaration) -> Self {
        self.declare(declaration);
        self
    }

    pub fn declaration(&self, kind: &MarkerKind) -> Option<&MarkerDeclaration> {
        self.declarations.get(kind)
    }

    /// Walk from `kind` towards its bases and return the first association
    /// `pick` finds. Undeclared kinds have no association; a base chain that
    /// loops or names an undeclared base is malformed.
    fn walk(
        &self,
        kind: &MarkerKind,
        pick: impl Fn(&MarkerDeclaration) -> Option<&BuilderKey>,
    ) -> Result<Option<BuilderKey>> {
        let Some(mut declaration) = self.declarations.get(kind) else {
            return Ok(None);
        };
        let mut seen = HashSet::from([kind]);

        loop {
            if let Some(key) = pick(declaration) {
                return Ok(Some(key.clone()));
            }
            let Some(base) = declaration.base.as_ref() else {
                return Ok(None);
            };
            if !seen.insert(base) {
                return Err(Error::MetadataError(format!(
                    "Marker kind '{kind}' has a cyclic base chain through '{base}'"
                )));
            }
            declaration = self.declarations.get(base).ok_or_else(|| {
                Error::MetadataError(format!(
                    "Marker kind '{}' derives from undeclared kind '{base}'",
                    declaration.kind
                ))
            })?;
        }
    }
}

impl MarkerMetadata for MarkerCatalog {
    fn builder_association(&self, kind: &MarkerKind) -> Result<Option<BuilderKey>> {
        self.walk(kind, |d| d.builder.as_ref())
    }

    fn trait_discoverer(&self, kind: &MarkerKind) -> Result<Option<BuilderKey>> {
        self.walk(kind, |d| d.trait_discoverer.as_ref())
    }
}
