//! Read feature requirements from the registry document.
//!
//! Ingestion collects requirement names only; resolution against the
//! registries is a separate step. It does write to the value registry:
//! an `<enum extends=..>` entry inside a `<require>` block defines a new
//! value of an existing type, and that value must exist before any feature
//! that names it can be resolved.

use std::collections::HashSet;
use std::rc::Rc;

use tracing::{debug, trace, warn};
use vkgen_def::{BitmaskValue, EnumValue, TypeRegistry, ValueRef, ValueRegistry};
use vkgen_spec::Node;

use crate::error::{FeatureError, Result};
use crate::feature::Feature;

/// Tags that declare a feature level or an extension.
const DECLARATION_TAGS: [&str; 2] = ["feature", "extension"];

/// Build the requirement sets for one `<feature>` (or `<extension>`)
/// declaration, including everything reachable through `depends`.
///
/// Each declaration is read at most once per call, so circular `depends`
/// chains terminate and contribute the union of their requirements.
/// Dependencies are read before the declarations that name them; when both
/// define the same extension value, the dependent's definition is kept.
/// Dependencies that cannot be found in the document are skipped.
///
/// Inserts into `values` every extension value the visited declarations
/// define.
pub fn read_feature(
    node: Node<'_>,
    types: &TypeRegistry,
    values: &mut ValueRegistry,
) -> Result<Feature> {
    if !DECLARATION_TAGS.contains(&node.tag()) {
        return Err(FeatureError::NotADeclaration {
            tag: node.tag().to_string(),
        });
    }

    let name = declaration_name(node)?;
    let (api, version) = if node.tag() == "extension" {
        (node.attr("supported").unwrap_or_default(), "")
    } else {
        (
            node.attr("api").unwrap_or_default(),
            node.attr("number").unwrap_or_default(),
        )
    };
    let mut feature = Feature::named(api, name, version);

    let root = node.document_root();
    let mut visited: HashSet<String> = HashSet::new();
    // `Finish` is pushed beneath a declaration's dependencies, so every
    // dependency's values are registered before the declaration's own.
    let mut worklist = vec![Step::Visit(node)];

    while let Some(step) = worklist.pop() {
        match step {
            Step::Visit(current) => {
                let current_name = declaration_name(current)?;
                if !visited.insert(current_name.to_string()) {
                    trace!(feature = name, declaration = current_name, "already ingested");
                    continue;
                }
                worklist.push(Step::Finish(current, current_name));

                let mut dependencies = Vec::new();
                for dependency in dependency_names(current) {
                    match find_declaration(root, dependency) {
                        Some(dep_node) => dependencies.push(Step::Visit(dep_node)),
                        None => warn!(
                            feature = current_name,
                            dependency, "dependency declaration not found, skipping"
                        ),
                    }
                }
                worklist.extend(dependencies.into_iter().rev());
            }
            Step::Finish(current, current_name) => {
                let declared = read_requirements(current, current_name, types, values)?;
                feature.merge_with(&declared);
            }
        }
    }

    debug!(
        feature = name,
        declarations = visited.len(),
        types = feature.required_type_names().len(),
        values = feature.required_value_names().len(),
        "ingested feature"
    );
    Ok(feature)
}

enum Step<'a> {
    /// Queue the declaration's dependencies.
    Visit(Node<'a>),
    /// Read the declaration's own requirements.
    Finish(Node<'a>, &'a str),
}

/// Names listed in the `depends` attribute, comma-separated.
fn dependency_names<'a>(node: Node<'a>) -> impl Iterator<Item = &'a str> {
    node.attr("depends")
        .into_iter()
        .flat_map(|list| list.split(','))
        .map(str::trim)
        .filter(|name| !name.is_empty())
}

/// A `<feature>` with this name anywhere in the document, else an `<extension>`.
fn find_declaration<'a>(root: Node<'a>, name: &str) -> Option<Node<'a>> {
    DECLARATION_TAGS
        .iter()
        .find_map(|tag| root.find_declaration(tag, name))
}

fn declaration_name<'a>(node: Node<'a>) -> Result<&'a str> {
    node.attr("name")
        .filter(|name| !name.is_empty())
        .ok_or_else(|| FeatureError::MissingAttribute {
            feature: String::new(),
            element: node.tag().to_string(),
            attribute: "name".to_string(),
        })
}

/// Requirement names declared directly by one declaration's `<require>`
/// blocks, registering extension values along the way.
fn read_requirements(
    node: Node<'_>,
    feature_name: &str,
    types: &TypeRegistry,
    values: &mut ValueRegistry,
) -> Result<Feature> {
    let mut declared = Feature::new();

    for require in node.select("require") {
        for entry in require.children() {
            match entry.tag() {
                // Commands share the type namespace.
                "type" | "command" => declared.require_type(entry_name(entry, feature_name)?),
                "enum" => {
                    let name = entry_name(entry, feature_name)?;
                    if let Some(extends) = entry.attr("extends") {
                        let extended = types.get(extends).cloned();
                        let value: ValueRef = if entry.attr("bitpos").is_some() {
                            Rc::new(BitmaskValue::from_spec_node(extended, entry)?)
                        } else {
                            Rc::new(EnumValue::from_spec_node(extended, entry)?)
                        };
                        trace!(
                            feature = feature_name,
                            value = name,
                            extends,
                            "registering extension value"
                        );
                        values.insert(name.to_string(), value);
                    }
                    declared.require_value(name);
                }
                _ => {}
            }
        }
    }

    Ok(declared)
}

fn entry_name<'a>(entry: Node<'a>, feature_name: &str) -> Result<&'a str> {
    entry
        .attr("name")
        .filter(|name| !name.is_empty())
        .ok_or_else(|| FeatureError::MissingAttribute {
            feature: feature_name.to_string(),
            element: entry.tag().to_string(),
            attribute: "name".to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use vkgen_def::{GenericType, TypeCategory, TypeDefinition, ValueDefinition};
    use vkgen_spec::SpecTree;

    const REGISTRY: &str = r#"<registry>
    <feature api="vulkan" name="VK_VERSION_1_0" number="1.0">
        <require>
            <type name="VkInstance"/>
            <command name="vkCreateInstance"/>
            <enum name="VK_MAX_NAME_SIZE"/>
        </require>
    </feature>
    <feature api="vulkan" name="VK_VERSION_1_1" number="1.1" depends="VK_VERSION_1_0">
        <require>
            <type name="ColorFlags"/>
            <enum extends="ColorFlags" bitpos="3" name="COLOR_ALPHA_BIT"/>
            <enum extends="VkResult" extnumber="70" offset="0" dir="-"
                  name="VK_ERROR_OUT_OF_POOL_MEMORY"/>
        </require>
    </feature>
    <feature api="vulkan" name="VK_VERSION_1_2" number="1.2"
             depends=" VK_VERSION_1_1 , ,VK_VERSION_9_9">
        <require>
            <command name="vkResetQueryPool"/>
        </require>
    </feature>
    <feature api="vulkan" name="FEATURE_X" number="2.0" depends="FEATURE_Y">
        <require><type name="XType"/></require>
    </feature>
    <feature api="vulkan" name="FEATURE_Y" number="2.0" depends="FEATURE_X">
        <require><type name="YType"/></require>
    </feature>
    <feature api="vulkan" name="FEATURE_EXT" number="3.0" depends="VK_KHR_surface">
        <require/>
    </feature>
    <extensions>
        <extension name="VK_KHR_surface" number="1" supported="vulkan">
            <require>
                <type name="VkSurfaceKHR"/>
                <enum extends="VkResult" offset="0" dir="-" name="VK_ERROR_SURFACE_LOST_KHR"/>
            </require>
        </extension>
    </extensions>
</registry>"#;

    fn types() -> TypeRegistry {
        let mut types = TypeRegistry::new();
        for ty in [
            GenericType::new("ColorFlags", TypeCategory::Bitmask),
            GenericType::new("VkResult", TypeCategory::Enum),
        ] {
            types.insert(ty.registry_name().to_string(), Rc::new(ty));
        }
        types
    }

    fn read(tree: &SpecTree, name: &str, values: &mut ValueRegistry) -> Result<Feature> {
        let node = tree
            .document()
            .find_declaration("feature", name)
            .or_else(|| tree.document().find_declaration("extension", name))
            .unwrap();
        read_feature(node, &types(), values)
    }

    #[test]
    fn reads_identity_and_requirements() {
        let tree = SpecTree::parse(REGISTRY).unwrap();
        let mut values = ValueRegistry::new();
        let feature = read(&tree, "VK_VERSION_1_0", &mut values).unwrap();

        assert_eq!(feature.name(), "VK_VERSION_1_0");
        assert_eq!(feature.api_name(), "vulkan");
        assert_eq!(feature.version(), "1.0");
        assert!(feature.required_type_names().contains("VkInstance"));
        assert!(feature.required_type_names().contains("vkCreateInstance"));
        assert!(feature.required_value_names().contains("VK_MAX_NAME_SIZE"));
        assert!(values.is_empty());
    }

    #[test]
    fn dependencies_are_merged_transitively() {
        let tree = SpecTree::parse(REGISTRY).unwrap();
        let mut values = ValueRegistry::new();
        let feature = read(&tree, "VK_VERSION_1_2", &mut values).unwrap();

        let type_names = feature.required_type_names();
        assert!(type_names.contains("vkResetQueryPool"));
        assert!(type_names.contains("ColorFlags"));
        assert!(type_names.contains("VkInstance"));
        assert!(feature.required_value_names().contains("COLOR_ALPHA_BIT"));
        assert_eq!(feature.name(), "VK_VERSION_1_2");
        assert!(feature.resolved_types().is_empty());
    }

    #[test]
    fn circular_dependencies_terminate_with_union() {
        let tree = SpecTree::parse(REGISTRY).unwrap();
        let mut values = ValueRegistry::new();
        let feature = read(&tree, "FEATURE_X", &mut values).unwrap();

        let names: Vec<&str> = feature
            .required_type_names()
            .iter()
            .map(String::as_str)
            .collect();
        assert_eq!(names, vec!["XType", "YType"]);
    }

    #[test]
    fn bitpos_enum_registers_bitmask_value() {
        let tree = SpecTree::parse(REGISTRY).unwrap();
        let mut values = ValueRegistry::new();
        let mut feature = read(&tree, "VK_VERSION_1_1", &mut values).unwrap();

        let alpha = &values["COLOR_ALPHA_BIT"];
        assert_eq!(alpha.underlying_type_name(), "ColorFlags");
        assert_eq!(
            alpha.resolved_type().map(|t| t.category()),
            Some(TypeCategory::Bitmask)
        );
        assert!(feature.required_value_names().contains("COLOR_ALPHA_BIT"));

        feature.resolve(&types(), &values);
        assert!(feature
            .resolved_value("ColorFlags", "COLOR_ALPHA_BIT")
            .is_some());
    }

    #[test]
    fn offset_enum_registers_enum_value() {
        let tree = SpecTree::parse(REGISTRY).unwrap();
        let mut values = ValueRegistry::new();
        read(&tree, "VK_VERSION_1_1", &mut values).unwrap();

        let pool = &values["VK_ERROR_OUT_OF_POOL_MEMORY"];
        assert_eq!(pool.underlying_type_name(), "VkResult");
        assert!(!pool.is_core());
    }

    #[test]
    fn extension_dependency_is_found() {
        let tree = SpecTree::parse(REGISTRY).unwrap();
        let mut values = ValueRegistry::new();
        let feature = read(&tree, "FEATURE_EXT", &mut values).unwrap();

        assert!(feature.required_type_names().contains("VkSurfaceKHR"));
        assert!(values.contains_key("VK_ERROR_SURFACE_LOST_KHR"));
    }

    #[test]
    fn extension_declaration_identity() {
        let tree = SpecTree::parse(REGISTRY).unwrap();
        let mut values = ValueRegistry::new();
        let feature = read(&tree, "VK_KHR_surface", &mut values).unwrap();
        assert_eq!(feature.api_name(), "vulkan");
        assert_eq!(feature.version(), "");
    }

    #[test]
    fn dependent_definition_wins_over_dependency() {
        let tree = SpecTree::parse(
            r#"<registry>
    <feature name="V10" number="1.0">
        <require>
            <enum extends="ColorFlags" bitpos="1" name="FOO"/>
            <enum extends="VkResult" extnumber="3" offset="0" name="BAR"/>
        </require>
    </feature>
    <feature name="V11" number="1.1" depends="V10">
        <require>
            <enum extends="ColorFlags" bitpos="3" name="FOO"/>
            <enum extends="ColorFlags" bitpos="4" name="BAR"/>
        </require>
    </feature>
</registry>"#,
        )
        .unwrap();
        let mut values = ValueRegistry::new();
        read(&tree, "V11", &mut values).unwrap();

        assert!(format!("{:?}", values["FOO"]).contains("bitpos: 3"));
        assert_eq!(values["BAR"].underlying_type_name(), "ColorFlags");
    }

    #[test]
    fn dependencies_read_before_cycle_start() {
        let tree = SpecTree::parse(
            r#"<registry>
    <feature name="X" depends="Y">
        <require><enum extends="ColorFlags" bitpos="5" name="SHARED"/></require>
    </feature>
    <feature name="Y" depends="X">
        <require><enum extends="VkResult" value="7" name="SHARED"/></require>
    </feature>
</registry>"#,
        )
        .unwrap();
        let mut values = ValueRegistry::new();
        read(&tree, "X", &mut values).unwrap();
        assert_eq!(values["SHARED"].underlying_type_name(), "ColorFlags");

        let mut values = ValueRegistry::new();
        read(&tree, "Y", &mut values).unwrap();
        assert_eq!(values["SHARED"].underlying_type_name(), "VkResult");
    }

    #[test]
    fn missing_entry_name_is_an_error() {
        let tree = SpecTree::parse(
            r#"<registry>
    <feature api="vulkan" name="F" number="1.0"><require><type/></require></feature>
</registry>"#,
        )
        .unwrap();
        let mut values = ValueRegistry::new();
        let err = read(&tree, "F", &mut values).unwrap_err();
        assert!(matches!(
            err,
            FeatureError::MissingAttribute { ref feature, ref element, .. }
                if feature == "F" && element == "type"
        ));
    }

    #[test]
    fn malformed_extension_value_is_an_error() {
        let tree = SpecTree::parse(
            r#"<registry>
    <feature name="F" number="1.0">
        <require><enum extends="ColorFlags" bitpos="x" name="BAD"/></require>
    </feature>
</registry>"#,
        )
        .unwrap();
        let mut values = ValueRegistry::new();
        let err = read(&tree, "F", &mut values).unwrap_err();
        assert!(matches!(err, FeatureError::Definition(_)));
    }

    #[test]
    fn overflowing_extension_value_is_an_error() {
        let tree = SpecTree::parse(
            r#"<registry>
    <feature name="F" number="1.0">
        <require>
            <enum extends="VkResult" extnumber="9223372036854775807" offset="0" name="X"/>
        </require>
    </feature>
</registry>"#,
        )
        .unwrap();
        let mut values = ValueRegistry::new();
        let err = read(&tree, "F", &mut values).unwrap_err();
        assert!(matches!(err, FeatureError::Definition(_)));
        assert!(values.is_empty());
    }

    #[test]
    fn non_declaration_rejected() {
        let tree = SpecTree::parse(REGISTRY).unwrap();
        let require = tree.document().select("registry/feature/require")[0];
        let err = read_feature(require, &types(), &mut ValueRegistry::new()).unwrap_err();
        assert!(matches!(err, FeatureError::NotADeclaration { .. }));
    }
}
