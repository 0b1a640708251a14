//! Definition traits, registries, and the include-set bundle.
//!
//! Definitions are shared between the registries and every feature that
//! resolves them, so registries hold them behind `Rc`.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;
use std::rc::Rc;

use crate::category::TypeCategory;

/// Shared handle to a type definition.
pub type TypeRef = Rc<dyn TypeDefinition>;

/// Shared handle to a value definition.
pub type ValueRef = Rc<dyn ValueDefinition>;

/// Every known type, keyed by registry name.
pub type TypeRegistry = HashMap<String, TypeRef>;

/// Every known value, keyed by registry name.
pub type ValueRegistry = HashMap<String, ValueRef>;

/// A named type (struct, handle, enum, command, ...) from the registry.
pub trait TypeDefinition: fmt::Debug {
    /// Name under which the type is registered.
    fn registry_name(&self) -> &str;

    /// Category used to partition output.
    fn category(&self) -> TypeCategory;

    /// Report the further types and values this type pulls in.
    ///
    /// The definition itself need not appear in the result; the caller
    /// registers it.
    fn resolve(&self, types: &TypeRegistry, values: &ValueRegistry) -> IncludeSet;
}

/// A named value (enumerant, flag bit, constant) from the registry.
pub trait ValueDefinition: fmt::Debug {
    /// Name under which the value is registered.
    fn registry_name(&self) -> &str;

    /// Name of the type this value belongs to.
    fn underlying_type_name(&self) -> &str;

    /// The owning type's definition, when it was known at construction.
    fn resolved_type(&self) -> Option<&TypeRef>;

    /// Whether the value belongs to its type's baseline set.
    fn is_core(&self) -> bool;

    /// Report the further types and values this value pulls in.
    fn resolve(&self, types: &TypeRegistry, values: &ValueRegistry) -> IncludeSet;
}

/// The bundle returned by resolving a single definition.
#[derive(Debug, Clone, Default)]
pub struct IncludeSet {
    /// Type names to require.
    pub include_types: BTreeSet<String>,
    /// Value names to require.
    pub include_values: BTreeSet<String>,
    /// Type definitions already looked up.
    pub resolved_types: BTreeMap<String, TypeRef>,
    /// Value definitions already looked up.
    pub resolved_values: BTreeMap<String, ValueRef>,
}

impl IncludeSet {
    /// Create an empty bundle.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the bundle carries nothing.
    pub fn is_empty(&self) -> bool {
        self.include_types.is_empty()
            && self.include_values.is_empty()
            && self.resolved_types.is_empty()
            && self.resolved_values.is_empty()
    }

    /// Require a type by name, attaching its definition when the registry has one.
    pub fn include_type(&mut self, name: &str, types: &TypeRegistry) {
        self.include_types.insert(name.to_string());
        if let Some(def) = types.get(name) {
            self.resolved_types
                .insert(name.to_string(), Rc::clone(def));
        }
    }

    /// Require a value by name, attaching its definition when the registry has one.
    pub fn include_value(&mut self, name: &str, values: &ValueRegistry) {
        self.include_values.insert(name.to_string());
        if let Some(def) = values.get(name) {
            self.resolved_values
                .insert(name.to_string(), Rc::clone(def));
        }
    }

    /// Fold another bundle into this one.
    pub fn merge(&mut self, other: IncludeSet) {
        self.include_types.extend(other.include_types);
        self.include_values.extend(other.include_values);
        self.resolved_types.extend(other.resolved_types);
        self.resolved_values.extend(other.resolved_values);
    }
}
