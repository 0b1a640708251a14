//! The feature entity: requirement names plus their resolved closure.

use std::collections::{BTreeMap, BTreeSet};
use std::rc::Rc;

use serde::{Deserialize, Serialize};
use tracing::debug;
use vkgen_def::{
    IncludeSet, TypeDefinition, TypeRef, TypeRegistry, ValueDefinition, ValueRef, ValueRegistry,
};

/// Values grouped by the name of the type they belong to, then by value name.
pub type ValuesByType = BTreeMap<String, BTreeMap<String, ValueRef>>;

/// A named, versioned bundle of requirements and, once resolved, the closed
/// set of definitions needed to emit it.
#[derive(Debug, Clone, Default)]
pub struct Feature {
    api_name: String,
    feature_name: String,
    version: String,

    require_type_names: BTreeSet<String>,
    require_value_names: BTreeSet<String>,
    resolved_types: BTreeMap<String, TypeRef>,
    resolved_values: ValuesByType,
}

/// Outcome of [`Feature::resolve`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolveReport {
    /// Types in the closure.
    pub types_resolved: usize,
    /// Values in the closure.
    pub values_resolved: usize,
    /// Required type names absent from the type registry, sorted.
    pub skipped_types: Vec<String>,
    /// Required value names absent from the value registry, sorted.
    pub skipped_values: Vec<String>,
    /// Passes needed to reach the fixed point.
    pub rounds: usize,
}

impl Feature {
    /// Create an empty, anonymous feature.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty feature with identity.
    pub fn named(
        api_name: impl Into<String>,
        feature_name: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        Self {
            api_name: api_name.into(),
            feature_name: feature_name.into(),
            version: version.into(),
            ..Self::default()
        }
    }

    /// Same identity, no requirements and nothing resolved.
    pub(crate) fn empty_like(&self) -> Self {
        Self::named(&self.api_name, &self.feature_name, &self.version)
    }

    /// Feature name, e.g. `VK_VERSION_1_1`.
    pub fn name(&self) -> &str {
        &self.feature_name
    }

    /// API dialect(s) the feature was declared for.
    pub fn api_name(&self) -> &str {
        &self.api_name
    }

    /// Declared version string, e.g. `1.1`.
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Declared version as a semantic version. Missing minor or patch
    /// components are zero; `None` if the version is absent or not numeric.
    pub fn api_version(&self) -> Option<semver::Version> {
        let parts: Vec<&str> = self.version.trim().split('.').collect();
        if parts.is_empty() || parts.len() > 3 {
            return None;
        }
        let mut numbers = [0u64; 3];
        for (slot, part) in numbers.iter_mut().zip(&parts) {
            *slot = part.parse().ok()?;
        }
        Some(semver::Version::new(numbers[0], numbers[1], numbers[2]))
    }

    /// Directly required type (and command) names.
    pub fn required_type_names(&self) -> &BTreeSet<String> {
        &self.require_type_names
    }

    /// Directly required value names.
    pub fn required_value_names(&self) -> &BTreeSet<String> {
        &self.require_value_names
    }

    /// Require a type or command by name.
    pub fn require_type(&mut self, name: impl Into<String>) {
        self.require_type_names.insert(name.into());
    }

    /// Require a value by name.
    pub fn require_value(&mut self, name: impl Into<String>) {
        self.require_value_names.insert(name.into());
    }

    /// Resolved types by name.
    pub fn resolved_types(&self) -> &BTreeMap<String, TypeRef> {
        &self.resolved_types
    }

    /// Resolved values by underlying type name, then value name.
    pub fn resolved_values(&self) -> &ValuesByType {
        &self.resolved_values
    }

    /// A resolved type by name.
    pub fn resolved_type(&self, name: &str) -> Option<&TypeRef> {
        self.resolved_types.get(name)
    }

    /// A resolved value by underlying type name and value name.
    pub fn resolved_value(&self, type_name: &str, value_name: &str) -> Option<&ValueRef> {
        self.resolved_values.get(type_name)?.get(value_name)
    }

    /// Number of resolved values across all types.
    pub fn resolved_value_count(&self) -> usize {
        self.resolved_values.values().map(BTreeMap::len).sum()
    }

    /// Insert a resolved type under its own registry name.
    pub(crate) fn insert_resolved_type(&mut self, ty: TypeRef) {
        self.resolved_types
            .insert(ty.registry_name().to_string(), ty);
    }

    /// Insert a resolved value, keyed by its own underlying type name.
    pub(crate) fn insert_resolved_value(&mut self, value: ValueRef) {
        self.resolved_values
            .entry(value.underlying_type_name().to_string())
            .or_default()
            .insert(value.registry_name().to_string(), value);
    }

    /// Fold a definition's resolution bundle into this feature.
    ///
    /// Names are unioned into the requirement sets. Resolved definitions
    /// are added to the closure; values are grouped by their own underlying
    /// type name regardless of how the bundle keyed them.
    pub fn merge_include_set(&mut self, set: IncludeSet) {
        self.require_type_names.extend(set.include_types);
        self.require_value_names.extend(set.include_values);
        self.resolved_types.extend(set.resolved_types);
        for value in set.resolved_values.into_values() {
            self.insert_resolved_value(value);
        }
    }

    /// Fold another feature's requirement names into this one.
    ///
    /// Resolved definitions are not copied: this is for combining features
    /// before either has been resolved.
    pub fn merge_with(&mut self, other: &Feature) {
        self.require_type_names
            .extend(other.require_type_names.iter().cloned());
        self.require_value_names
            .extend(other.require_value_names.iter().cloned());
    }

    /// Compute the transitive closure of the requirements.
    ///
    /// Every required type, then every core value of a resolved type, then
    /// every required value is resolved against the registries and folded
    /// in. Passes repeat until no new name appears, so the result does not
    /// depend on iteration order or on whether definitions report direct or
    /// transitive dependencies. Names absent from a registry and not already
    /// in the closure are skipped and listed in the report.
    pub fn resolve(&mut self, types: &TypeRegistry, values: &ValueRegistry) -> ResolveReport {
        let mut report = ResolveReport::default();
        let mut seen_types: BTreeSet<String> = BTreeSet::new();
        let mut seen_values: BTreeSet<String> = BTreeSet::new();

        loop {
            let pending_types: BTreeSet<String> = self
                .require_type_names
                .iter()
                .chain(self.resolved_types.keys())
                .filter(|name| !seen_types.contains(*name))
                .cloned()
                .collect();

            for name in &pending_types {
                seen_types.insert(name.clone());
                if let Some(def) = types.get(name) {
                    let bundle = def.resolve(types, values);
                    self.merge_include_set(bundle);
                    self.insert_resolved_type(Rc::clone(def));
                } else if !self.resolved_types.contains_key(name) {
                    debug!(
                        feature = %self.feature_name,
                        type_name = %name,
                        "type not in registry, skipping"
                    );
                    report.skipped_types.push(name.clone());
                }
            }

            if !pending_types.is_empty() {
                self.require_core_values(values);
            }

            let pending_values: BTreeSet<String> = self
                .require_value_names
                .iter()
                .chain(self.resolved_values.values().flat_map(BTreeMap::keys))
                .filter(|name| !seen_values.contains(*name))
                .cloned()
                .collect();

            for name in &pending_values {
                seen_values.insert(name.clone());
                if let Some(def) = values.get(name) {
                    let bundle = def.resolve(types, values);
                    self.merge_include_set(bundle);
                    self.insert_resolved_value(Rc::clone(def));
                } else if !self.has_resolved_value(name) {
                    debug!(
                        feature = %self.feature_name,
                        value_name = %name,
                        "value not in registry, skipping"
                    );
                    report.skipped_values.push(name.clone());
                }
            }

            if pending_types.is_empty() && pending_values.is_empty() {
                break;
            }
            report.rounds += 1;
        }

        report.skipped_types.sort();
        report.skipped_values.sort();
        report.types_resolved = self.resolved_types.len();
        report.values_resolved = self.resolved_value_count();

        debug!(
            feature = %self.feature_name,
            types = report.types_resolved,
            values = report.values_resolved,
            rounds = report.rounds,
            "resolved feature"
        );
        report
    }

    fn has_resolved_value(&self, name: &str) -> bool {
        self.resolved_values
            .values()
            .any(|group| group.contains_key(name))
    }

    /// Require every core value whose type is already resolved.
    fn require_core_values(&mut self, values: &ValueRegistry) {
        for (name, value) in values {
            if value.is_core()
                && self
                    .resolved_types
                    .contains_key(value.underlying_type_name())
            {
                self.require_value_names.insert(name.clone());
            }
        }
    }
}
