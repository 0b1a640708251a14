//! Spec tree error types.

use std::path::PathBuf;

/// Errors that can occur while building a spec tree.
#[derive(Debug, thiserror::Error)]
pub enum TreeError {
    /// XML syntax error.
    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// Malformed attribute in an element start tag.
    #[error("XML attribute error: {0}")]
    Attribute(#[from] quick_xml::events::attributes::AttrError),

    /// An end tag without a matching start tag, or an unclosed element.
    #[error("unbalanced document: {detail}")]
    Unbalanced { detail: String },

    /// The document contains no element.
    #[error("document has no root element")]
    Empty,

    /// Failed to read the document from disk.
    #[error("cannot read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Result type alias for spec tree operations.
pub type Result<T> = std::result::Result<T, TreeError>;
