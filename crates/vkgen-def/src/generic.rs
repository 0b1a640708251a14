//! A category-tagged type with direct references to other types.

use crate::category::TypeCategory;
use crate::definition::{IncludeSet, TypeDefinition, TypeRegistry, ValueRegistry};

/// A registry type described by its name, category, and the type names it
/// refers to directly (member types, parameter types, alias targets, the
/// flag-bits enum behind a bitmask).
///
/// Resolution reports only the direct references.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenericType {
    name: String,
    category: TypeCategory,
    references: Vec<String>,
}

impl GenericType {
    /// Create a type with no references.
    pub fn new(name: impl Into<String>, category: TypeCategory) -> Self {
        Self {
            name: name.into(),
            category,
            references: Vec::new(),
        }
    }

    /// Add a referenced type name (builder style). Duplicates and
    /// self-references are ignored.
    pub fn with_reference(mut self, name: impl Into<String>) -> Self {
        self.add_reference(name);
        self
    }

    /// Add a referenced type name. Duplicates and self-references are ignored.
    pub fn add_reference(&mut self, name: impl Into<String>) {
        let name = name.into();
        if name.is_empty() || name == self.name || self.references.contains(&name) {
            return;
        }
        self.references.push(name);
    }

    /// Referenced type names in insertion order.
    pub fn references(&self) -> &[String] {
        &self.references
    }
}

impl TypeDefinition for GenericType {
    fn registry_name(&self) -> &str {
        &self.name
    }

    fn category(&self) -> TypeCategory {
        self.category
    }

    fn resolve(&self, types: &TypeRegistry, _values: &ValueRegistry) -> IncludeSet {
        let mut set = IncludeSet::new();
        for name in &self.references {
            set.include_type(name, types);
        }
        set
    }
}
