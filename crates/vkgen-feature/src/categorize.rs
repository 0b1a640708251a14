//! Partition a resolved feature by type category.

use std::collections::BTreeMap;
use std::rc::Rc;

use vkgen_def::{TypeCategory, TypeDefinition, ValueDefinition};

use crate::feature::Feature;

impl Feature {
    /// Split the resolved closure into one feature per category.
    ///
    /// Types go to their own category. Values go to the category of their
    /// resolved type, or [`TypeCategory::Extension`] when they have none,
    /// keeping the underlying-type grouping. Buckets carry this feature's
    /// identity and have empty requirement sets.
    pub fn filter_by_category(&self) -> BTreeMap<TypeCategory, Feature> {
        let mut buckets: BTreeMap<TypeCategory, Feature> = BTreeMap::new();

        for ty in self.resolved_types().values() {
            buckets
                .entry(ty.category())
                .or_insert_with(|| self.empty_like())
                .insert_resolved_type(Rc::clone(ty));
        }

        for value in self.resolved_values().values().flat_map(BTreeMap::values) {
            let category = value
                .resolved_type()
                .map_or(TypeCategory::Extension, |ty| ty.category());
            buckets
                .entry(category)
                .or_insert_with(|| self.empty_like())
                .insert_resolved_value(Rc::clone(value));
        }

        buckets
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;
    use vkgen_def::{
        BitmaskValue, EnumValue, GenericType, TypeRef, TypeRegistry, ValueRegistry,
    };

    fn resolved_feature() -> Feature {
        let mut types = TypeRegistry::new();
        let format: TypeRef = Rc::new(GenericType::new("VkFormat", TypeCategory::Enum));
        let flags: TypeRef = Rc::new(GenericType::new("VkColorFlagBits", TypeCategory::Enum));
        types.insert("VkFormat".into(), Rc::clone(&format));
        types.insert("VkColorFlagBits".into(), Rc::clone(&flags));
        types.insert(
            "VkImageCreateInfo".into(),
            Rc::new(
                GenericType::new("VkImageCreateInfo", TypeCategory::Struct)
                    .with_reference("VkFormat"),
            ),
        );
        types.insert(
            "vkCreateImage".into(),
            Rc::new(
                GenericType::new("vkCreateImage", TypeCategory::Command)
                    .with_reference("VkImageCreateInfo"),
            ),
        );

        let mut values = ValueRegistry::new();
        values.insert(
            "VK_FORMAT_UNDEFINED".into(),
            Rc::new(
                EnumValue::new("VK_FORMAT_UNDEFINED", "VkFormat")
                    .with_type(Rc::clone(&format))
                    .with_core(true),
            ),
        );
        values.insert(
            "VK_COLOR_RED_BIT".into(),
            Rc::new(
                BitmaskValue::new("VK_COLOR_RED_BIT", "VkColorFlagBits", 0)
                    .unwrap()
                    .with_type(flags),
            ),
        );
        // Owning type unknown when the value was built.
        values.insert(
            "VK_LOOSE_VALUE".into(),
            Rc::new(EnumValue::new("VK_LOOSE_VALUE", "VkFormat").with_number(7)),
        );

        let mut feature = Feature::named("vulkan", "VK_VERSION_1_0", "1.0");
        feature.require_type("vkCreateImage");
        feature.require_value("VK_COLOR_RED_BIT");
        feature.require_value("VK_LOOSE_VALUE");
        feature.resolve(&types, &values);
        feature
    }

    #[test]
    fn buckets_match_categories_present() {
        let buckets = resolved_feature().filter_by_category();
        let categories: Vec<TypeCategory> = buckets.keys().copied().collect();
        assert_eq!(
            categories,
            vec![
                TypeCategory::Enum,
                TypeCategory::Struct,
                TypeCategory::Command,
                TypeCategory::Extension
            ]
        );
    }

    #[test]
    fn types_land_in_their_own_category() {
        let buckets = resolved_feature().filter_by_category();
        assert!(buckets[&TypeCategory::Command]
            .resolved_type("vkCreateImage")
            .is_some());
        assert!(buckets[&TypeCategory::Struct]
            .resolved_type("VkImageCreateInfo")
            .is_some());
        assert_eq!(buckets[&TypeCategory::Enum].resolved_types().len(), 2);
        assert!(buckets[&TypeCategory::Extension].resolved_types().is_empty());
    }

    #[test]
    fn values_follow_their_resolved_type() {
        let buckets = resolved_feature().filter_by_category();
        let enums = &buckets[&TypeCategory::Enum];
        assert!(enums
            .resolved_value("VkFormat", "VK_FORMAT_UNDEFINED")
            .is_some());
        assert!(enums
            .resolved_value("VkColorFlagBits", "VK_COLOR_RED_BIT")
            .is_some());

        let extension = &buckets[&TypeCategory::Extension];
        assert!(extension
            .resolved_value("VkFormat", "VK_LOOSE_VALUE")
            .is_some());
        assert!(enums.resolved_value("VkFormat", "VK_LOOSE_VALUE").is_none());
    }

    #[test]
    fn partition_is_disjoint_and_complete() {
        let feature = resolved_feature();
        let buckets = feature.filter_by_category();

        let mut seen_types = BTreeSet::new();
        let mut seen_values = BTreeSet::new();
        for bucket in buckets.values() {
            for name in bucket.resolved_types().keys() {
                assert!(seen_types.insert(name.clone()), "{name} in two buckets");
            }
            for (type_name, group) in bucket.resolved_values() {
                for name in group.keys() {
                    assert!(
                        seen_values.insert((type_name.clone(), name.clone())),
                        "{name} in two buckets"
                    );
                }
            }
        }
        assert_eq!(seen_types.len(), feature.resolved_types().len());
        assert_eq!(seen_values.len(), feature.resolved_value_count());
    }

    #[test]
    fn buckets_keep_identity_without_requirements() {
        let buckets = resolved_feature().filter_by_category();
        let structs = &buckets[&TypeCategory::Struct];
        assert_eq!(structs.name(), "VK_VERSION_1_0");
        assert!(structs.required_type_names().is_empty());
    }

    #[test]
    fn unresolved_feature_has_no_buckets() {
        assert!(Feature::new().filter_by_category().is_empty());
    }
}
