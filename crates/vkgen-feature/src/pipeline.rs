//! Generation pipeline orchestrator.

use std::collections::BTreeMap;

use tracing::{debug, info};
use vkgen_def::{TypeCategory, TypeRegistry, ValueRegistry};
use vkgen_spec::{Node, SpecTree};

use crate::config::GenerateSection;
use crate::error::{FeatureError, Result};
use crate::feature::{Feature, ResolveReport};
use crate::ingest::read_feature;

/// Output of a successful pipeline run.
#[derive(Debug)]
pub struct GenerationOutput {
    /// The combined, resolved feature.
    pub feature: Feature,
    /// Per-category partition; empty unless splitting was requested.
    pub categories: BTreeMap<TypeCategory, Feature>,
    /// Resolution statistics.
    pub report: ResolveReport,
}

/// Run the full pipeline:
/// locate features -> order by version -> ingest features and extensions ->
/// resolve -> partition.
///
/// Feature levels are ingested lowest version first, then extensions in the
/// order given, all against the same value registry. The combined feature
/// takes the configured API and the identity of the highest feature level.
pub fn generate(
    tree: &SpecTree,
    config: &GenerateSection,
    types: &TypeRegistry,
    values: &mut ValueRegistry,
) -> Result<GenerationOutput> {
    let document = tree.document();

    // Stage 1: locate and check feature levels
    let mut levels = Vec::with_capacity(config.features.len());
    for name in &config.features {
        let node = locate(document, "feature", name)?;
        check_api(node, "api", name, &config.api)?;
        let identity = Feature::named(
            &config.api,
            name.as_str(),
            node.attr("number").unwrap_or_default(),
        );
        levels.push((identity, node));
    }
    levels.sort_by_key(|(identity, _)| {
        let version = identity.api_version();
        (version.is_none(), version)
    });

    let mut extensions = Vec::with_capacity(config.extensions.len());
    for name in &config.extensions {
        let node = locate(document, "extension", name)?;
        check_api(node, "supported", name, &config.api)?;
        extensions.push(node);
    }

    // Stage 2: ingest
    let mut combined = match levels.last() {
        Some((highest, _)) => highest.empty_like(),
        None => Feature::named(&config.api, "", ""),
    };
    for (identity, node) in &levels {
        let level = read_feature(*node, types, values)?;
        debug!(feature = identity.name(), version = identity.version(), "ingested feature level");
        combined.merge_with(&level);
    }
    for node in &extensions {
        let extension = read_feature(*node, types, values)?;
        debug!(extension = extension.name(), "ingested extension");
        combined.merge_with(&extension);
    }

    // Stage 3: resolve
    let report = combined.resolve(types, values);

    // Stage 4: partition
    let categories = if config.split_by_category {
        combined.filter_by_category()
    } else {
        BTreeMap::new()
    };

    info!(
        api = %config.api,
        feature = combined.name(),
        types = report.types_resolved,
        values = report.values_resolved,
        skipped_types = report.skipped_types.len(),
        skipped_values = report.skipped_values.len(),
        categories = categories.len(),
        "generation closure complete"
    );

    Ok(GenerationOutput {
        feature: combined,
        categories,
        report,
    })
}

fn locate<'a>(document: Node<'a>, tag: &str, name: &str) -> Result<Node<'a>> {
    document
        .find_declaration(tag, name)
        .ok_or_else(|| FeatureError::FeatureNotFound {
            name: name.to_string(),
        })
}

/// A declaration without the attribute applies to every API.
fn check_api(node: Node<'_>, attribute: &str, name: &str, api: &str) -> Result<()> {
    match node.attr(attribute) {
        Some(declared) if !declared.split(',').any(|a| a.trim() == api) => {
            Err(FeatureError::ApiMismatch {
                feature: name.to_string(),
                api: api.to_string(),
                declared: declared.to_string(),
            })
        }
        _ => Ok(()),
    }
}
