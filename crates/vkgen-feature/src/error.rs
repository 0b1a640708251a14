//! Feature error types.

use std::path::PathBuf;

use vkgen_def::DefError;

/// Errors that can occur while ingesting or generating feature levels.
///
/// Names missing from a registry are never errors; only malformed input
/// and unusable configuration are.
#[derive(Debug, thiserror::Error)]
pub enum FeatureError {
    /// A declaration or requirement entry lacks a required attribute.
    #[error("<{element}> in '{feature}' is missing required attribute '{attribute}'")]
    MissingAttribute {
        feature: String,
        element: String,
        attribute: String,
    },

    /// The node handed to ingestion is not a declaration.
    #[error("expected a <feature> or <extension> declaration, found <{tag}>")]
    NotADeclaration { tag: String },

    /// A configured feature level does not exist in the document.
    #[error("feature '{name}' not found in registry document")]
    FeatureNotFound { name: String },

    /// A configured feature level belongs to a different API dialect.
    #[error("feature '{feature}' is declared for '{declared}', not '{api}'")]
    ApiMismatch {
        feature: String,
        api: String,
        declared: String,
    },

    /// Invalid generator configuration.
    #[error("invalid configuration: {detail}")]
    InvalidConfig { detail: String },

    /// Malformed definition inside a declaration.
    #[error(transparent)]
    Definition(#[from] DefError),

    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Config file I/O error.
    #[error("cannot read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Result type alias for feature operations.
pub type Result<T> = std::result::Result<T, FeatureError>;
