//! Type categories used to partition generated output.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::DefError;

/// Classification tag on a type definition.
///
/// Values inherit the category of the type they belong to; values without a
/// resolved type fall into [`TypeCategory::Extension`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TypeCategory {
    /// No declared category (platform and C base types).
    None,
    Include,
    Define,
    Basetype,
    Bitmask,
    Handle,
    Enum,
    Funcpointer,
    Struct,
    Union,
    Command,
    /// API constants.
    Static,
    /// Fallback for values whose type is unknown.
    Extension,
}

impl TypeCategory {
    /// All categories, in declaration order.
    pub const ALL: [TypeCategory; 13] = [
        TypeCategory::None,
        TypeCategory::Include,
        TypeCategory::Define,
        TypeCategory::Basetype,
        TypeCategory::Bitmask,
        TypeCategory::Handle,
        TypeCategory::Enum,
        TypeCategory::Funcpointer,
        TypeCategory::Struct,
        TypeCategory::Union,
        TypeCategory::Command,
        TypeCategory::Static,
        TypeCategory::Extension,
    ];

    /// The lowercase label used in registry documents.
    pub fn as_str(&self) -> &'static str {
        match self {
            TypeCategory::None => "none",
            TypeCategory::Include => "include",
            TypeCategory::Define => "define",
            TypeCategory::Basetype => "basetype",
            TypeCategory::Bitmask => "bitmask",
            TypeCategory::Handle => "handle",
            TypeCategory::Enum => "enum",
            TypeCategory::Funcpointer => "funcpointer",
            TypeCategory::Struct => "struct",
            TypeCategory::Union => "union",
            TypeCategory::Command => "command",
            TypeCategory::Static => "static",
            TypeCategory::Extension => "extension",
        }
    }
}

impl fmt::Display for TypeCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TypeCategory {
    type Err = DefError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Ok(TypeCategory::None);
        }
        TypeCategory::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| DefError::UnknownCategory(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_registry_labels() {
        assert_eq!(
            "struct".parse::<TypeCategory>().unwrap(),
            TypeCategory::Struct
        );
        assert_eq!(
            "funcpointer".parse::<TypeCategory>().unwrap(),
            TypeCategory::Funcpointer
        );
        assert_eq!("".parse::<TypeCategory>().unwrap(), TypeCategory::None);
        assert!("structure".parse::<TypeCategory>().is_err());
    }

    #[test]
    fn serde_uses_lowercase() {
        let json = serde_json::to_string(&TypeCategory::Basetype).unwrap();
        assert_eq!(json, "\"basetype\"");
    }
}
