//! Specification-document tree for the vkgen generator.
//!
//! The registry document is held as an arena of element nodes with parent
//! links, so any node can reach the document root and search the whole
//! document for another declaration. Trees are built from XML with
//! [`SpecTree::parse`] or assembled directly with [`SpecTree::append`].

pub mod error;
mod parse;
pub mod tree;

pub use error::{Result, TreeError};
pub use tree::{Node, NodeId, SpecTree};
