//! Build type and value registries from a registry document.
//!
//! Reads the `<types>`, `<commands>` and `<enums>` sections. Feature and
//! extension declarations are left to the feature layer, which adds the
//! values they define while ingesting them.

use std::rc::Rc;

use tracing::debug;
use vkgen_spec::{Node, SpecTree};

use crate::category::TypeCategory;
use crate::definition::{TypeDefinition, TypeRef, TypeRegistry, ValueRef, ValueRegistry};
use crate::error::{DefError, Result};
use crate::generic::GenericType;
use crate::value::{BitmaskValue, EnumValue};

/// Load every type, command and enumerant that applies to `api`.
///
/// Elements with an `api` attribute that does not list `api` are skipped.
pub fn load_registries(tree: &SpecTree, api: &str) -> Result<(TypeRegistry, ValueRegistry)> {
    let root = tree
        .root_element()
        .ok_or_else(|| DefError::MissingSection("registry".to_string()))?;

    let mut types = TypeRegistry::new();
    let mut values = ValueRegistry::new();

    let type_section = root
        .child("types")
        .ok_or_else(|| DefError::MissingSection("types".to_string()))?;
    for node in type_section.children_named("type") {
        if !supports(node, api) {
            continue;
        }
        let ty = type_from_node(node, api)?;
        types.insert(ty.registry_name().to_string(), Rc::new(ty));
    }

    for section in root.children_named("commands") {
        for node in section.children_named("command") {
            if !supports(node, api) {
                continue;
            }
            let cmd = command_from_node(node, api)?;
            types.insert(cmd.registry_name().to_string(), Rc::new(cmd));
        }
    }

    for block in root.children_named("enums") {
        load_enums_block(block, api, &mut types, &mut values)?;
    }

    debug!(
        api,
        types = types.len(),
        values = values.len(),
        "loaded registries"
    );
    Ok((types, values))
}

fn supports(node: Node<'_>, api: &str) -> bool {
    node.attr("api")
        .map_or(true, |list| list.split(',').any(|a| a.trim() == api))
}

fn type_from_node(node: Node<'_>, api: &str) -> Result<GenericType> {
    let name = node
        .attr("name")
        .or_else(|| node.child("name").map(|n| n.text()))
        .filter(|n| !n.is_empty())
        .ok_or_else(|| DefError::MissingAttribute {
            element: "type".to_string(),
            attribute: "name".to_string(),
        })?;
    let category: TypeCategory = node.attr("category").unwrap_or("").parse()?;

    let mut ty = GenericType::new(name, category);
    for attribute in ["alias", "requires", "bitvalues"] {
        if let Some(target) = node.attr(attribute) {
            ty.add_reference(target);
        }
    }
    for inner in node.children_named("type") {
        ty.add_reference(inner.text());
    }
    for member in node.children_named("member") {
        if !supports(member, api) {
            continue;
        }
        if let Some(member_type) = member.child("type") {
            ty.add_reference(member_type.text());
        }
    }

    Ok(ty)
}

fn command_from_node(node: Node<'_>, api: &str) -> Result<GenericType> {
    let proto = node.child("proto");
    let name = proto
        .and_then(|p| p.child("name"))
        .map(|n| n.text())
        .or_else(|| node.attr("name"))
        .filter(|n| !n.is_empty())
        .ok_or_else(|| DefError::MissingAttribute {
            element: "command".to_string(),
            attribute: "name".to_string(),
        })?;

    let mut cmd = GenericType::new(name, TypeCategory::Command);
    if let Some(alias) = node.attr("alias") {
        cmd.add_reference(alias);
    }
    if let Some(return_type) = proto.and_then(|p| p.child("type")) {
        cmd.add_reference(return_type.text());
    }
    for param in node.children_named("param") {
        if !supports(param, api) {
            continue;
        }
        if let Some(param_type) = param.child("type") {
            cmd.add_reference(param_type.text());
        }
    }

    Ok(cmd)
}

/// Enum and bitmask blocks hold the core values of an existing type. Any
/// other block (API constants) gets a static type of its own and non-core
/// values that features must require by name.
fn load_enums_block(
    block: Node<'_>,
    api: &str,
    types: &mut TypeRegistry,
    values: &mut ValueRegistry,
) -> Result<()> {
    let block_name = block.attr("name").ok_or_else(|| DefError::MissingAttribute {
        element: "enums".to_string(),
        attribute: "name".to_string(),
    })?;

    let core = matches!(block.attr("type"), Some("enum") | Some("bitmask"));
    if !core && !types.contains_key(block_name) {
        let constants: TypeRef = Rc::new(GenericType::new(block_name, TypeCategory::Static));
        types.insert(block_name.to_string(), constants);
    }
    let owner = types.get(block_name).cloned();

    for node in block.children_named("enum") {
        if !supports(node, api) {
            continue;
        }
        let value: ValueRef = if node.attr("bitpos").is_some() {
            Rc::new(BitmaskValue::from_spec_node(owner.clone(), node)?.with_core(core))
        } else {
            Rc::new(EnumValue::from_spec_node(owner.clone(), node)?.with_core(core))
        };
        values.insert(value.registry_name().to_string(), value);
    }
    Ok(())
}
