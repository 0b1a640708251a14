//! Serializable view of a resolved feature.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use vkgen_def::{TypeCategory, TypeDefinition};

use crate::error::Result;
use crate::feature::Feature;

/// Names in a feature's resolved closure, for reports and golden files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureSummary {
    pub api: String,
    pub name: String,
    pub version: String,
    /// Resolved type names by category, sorted.
    pub types: BTreeMap<TypeCategory, Vec<String>>,
    /// Resolved value names by underlying type name, sorted.
    pub values: BTreeMap<String, Vec<String>>,
}

impl Feature {
    /// Summarize the resolved closure.
    pub fn summary(&self) -> FeatureSummary {
        let mut types: BTreeMap<TypeCategory, Vec<String>> = BTreeMap::new();
        for (name, ty) in self.resolved_types() {
            types.entry(ty.category()).or_default().push(name.clone());
        }

        let values: BTreeMap<String, Vec<String>> = self
            .resolved_values()
            .iter()
            .map(|(type_name, group)| (type_name.clone(), group.keys().cloned().collect()))
            .collect();

        FeatureSummary {
            api: self.api_name().to_string(),
            name: self.name().to_string(),
            version: self.version().to_string(),
            types,
            values,
        }
    }
}

impl FeatureSummary {
    /// Render as pretty-printed JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parse a summary rendered by [`FeatureSummary::to_json`].
    pub fn from_json(input: &str) -> Result<Self> {
        Ok(serde_json::from_str(input)?)
    }

    /// Total number of type names.
    pub fn type_count(&self) -> usize {
        self.types.values().map(Vec::len).sum()
    }
}
