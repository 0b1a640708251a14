//! Definitions and registries for the vkgen generator.
//!
//! A registry maps a name to a shared definition. Every definition can
//! resolve itself against the type and value registries, reporting the
//! further names and definitions it pulls in as an [`IncludeSet`]. The
//! feature layer folds those bundles into a closed set.
//!
//! Concrete definitions provided here:
//! - [`GenericType`]: any named type with a category and direct references
//! - [`EnumValue`]: an enumerant, possibly an offset-based extension value
//! - [`BitmaskValue`]: a single flag bit of a bitmask type

pub mod category;
pub mod definition;
pub mod error;
pub mod generic;
pub mod loader;
pub mod value;

pub use category::TypeCategory;
pub use definition::{
    IncludeSet, TypeDefinition, TypeRef, TypeRegistry, ValueDefinition, ValueRef, ValueRegistry,
};
pub use error::{DefError, Result};
pub use generic::GenericType;
pub use loader::load_registries;
pub use value::{BitmaskValue, EnumLiteral, EnumValue};
