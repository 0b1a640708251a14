//! Generator configuration (`vkgen.toml`) parsing.
//!
//! The configuration names the API dialect, the feature levels and the
//! extensions to generate, and whether the resolved closure is split per
//! type category.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{FeatureError, Result};

/// A complete generator configuration parsed from TOML.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratorConfig {
    /// What to generate.
    pub generate: GenerateSection,
}

/// The `[generate]` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerateSection {
    /// API dialect, matched against each feature's `api` attribute.
    #[serde(default = "default_api")]
    pub api: String,
    /// Feature levels, e.g. `VK_VERSION_1_1`.
    pub features: Vec<String>,
    /// Extensions folded into the same closure.
    #[serde(default)]
    pub extensions: Vec<String>,
    /// Partition the closure by type category.
    #[serde(default = "default_split", rename = "split-by-category")]
    pub split_by_category: bool,
}

fn default_api() -> String {
    "vulkan".to_string()
}

fn default_split() -> bool {
    true
}

impl GenerateSection {
    /// Generate the given feature levels of the default API.
    pub fn for_features<I, S>(features: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            api: default_api(),
            features: features.into_iter().map(Into::into).collect(),
            extensions: Vec::new(),
            split_by_category: default_split(),
        }
    }
}

impl GeneratorConfig {
    /// Parse a configuration from a TOML string.
    pub fn parse(input: &str) -> Result<Self> {
        let config: GeneratorConfig = toml::from_str(input)?;

        if config.generate.api.trim().is_empty() {
            return Err(FeatureError::InvalidConfig {
                detail: "generate.api must not be empty".to_string(),
            });
        }
        if config.generate.features.is_empty() {
            return Err(FeatureError::InvalidConfig {
                detail: "generate.features must name at least one feature".to_string(),
            });
        }
        if let Some(blank) = config
            .generate
            .features
            .iter()
            .chain(&config.generate.extensions)
            .find(|name| name.trim().is_empty())
        {
            return Err(FeatureError::InvalidConfig {
                detail: format!("blank feature or extension name '{blank}'"),
            });
        }

        Ok(config)
    }

    /// Parse a configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| FeatureError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&content)
    }
}
