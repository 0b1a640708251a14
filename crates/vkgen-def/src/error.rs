//! Definition error types.

/// Errors raised while building definitions from a spec tree.
#[derive(Debug, thiserror::Error)]
pub enum DefError {
    /// A required attribute is absent.
    #[error("<{element}> is missing required attribute '{attribute}'")]
    MissingAttribute { element: String, attribute: String },

    /// An attribute is present but cannot be interpreted.
    #[error("invalid {attribute}=\"{value}\" on '{name}': {detail}")]
    InvalidAttribute {
        name: String,
        attribute: String,
        value: String,
        detail: String,
    },

    /// Unrecognized type category string.
    #[error("unknown type category '{0}'")]
    UnknownCategory(String),

    /// The document lacks a section the loader needs.
    #[error("registry document has no <{0}> element")]
    MissingSection(String),
}

/// Result type alias for definition operations.
pub type Result<T> = std::result::Result<T, DefError>;
