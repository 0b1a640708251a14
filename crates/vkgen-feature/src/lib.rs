//! Feature-level requirement closure for the vkgen generator.
//!
//! A [`Feature`] is a named, versioned bundle of required type and value
//! names. The lifecycle is:
//!
//! 1. **Ingest**: [`read_feature`] walks a `<feature>` declaration and the
//!    declarations it depends on, collecting requirement names and adding
//!    any extension enumerants it defines to the value registry.
//! 2. **Resolve**: [`Feature::resolve`] computes the transitive closure
//!    against the type and value registries.
//! 3. **Partition**: [`Feature::filter_by_category`] splits the closure
//!    into one feature per type category for per-category emitters.
//!
//! [`pipeline::generate`] runs all three for a configured set of feature
//! levels.

pub mod categorize;
pub mod config;
pub mod error;
pub mod feature;
pub mod ingest;
pub mod pipeline;
pub mod summary;

pub use config::{GenerateSection, GeneratorConfig};
pub use error::{FeatureError, Result};
pub use feature::{Feature, ResolveReport};
pub use ingest::read_feature;
pub use pipeline::{generate, GenerationOutput};
pub use summary::FeatureSummary;
