//! Deep merge of layered YAML configuration.
//!
//! # Merge Rules
//!
//! - Mappings are merged recursively
//! - Sequences are replaced entirely (`gap.sequence` is never concatenated)
//! - Null values in the overlay delete the key from the base
//! - Scalars in the overlay replace the base

use serde_yaml::Value;

/// Deep merge two YAML values, `overlay` taking precedence.
pub fn deep_merge(base: &Value, overlay: &Value) -> Value {
    match (base, overlay) {
        (Value::Mapping(base_map), Value::Mapping(overlay_map)) => {
            let mut result = base_map.clone();

            for (key, overlay_value) in overlay_map {
                if overlay_value.is_null() {
                    result.remove(key);
                } else if let Some(base_value) = base_map.get(key) {
                    result.insert(key.clone(), deep_merge(base_value, overlay_value));
                } else {
                    result.insert(key.clone(), overlay_value.clone());
                }
            }

            Value::Mapping(result)
        }

        (_, overlay) => overlay.clone(),
    }
}

/// Merge several layers in order, later layers overriding earlier ones.
///
/// A layer that is entirely null (an empty file) changes nothing.
pub fn merge_configs(configs: &[Value]) -> Value {
    configs
        .iter()
        .filter(|config| !config.is_null())
        .fold(Value::Mapping(Default::default()), |acc, config| {
            deep_merge(&acc, config)
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn yaml(s: &str) -> Value {
        serde_yaml::from_str(s).unwrap()
    }

    #[test]
    fn deep_merge_replaces_at_conflict_point() {
        let base = yaml("translate:\n  optimize: true\n  keep_comments: true\n");
        let overlay = yaml("translate:\n  optimize: false\n");

        let result = deep_merge(&base, &overlay);

        assert_eq!(result["translate"]["optimize"], false);
        assert_eq!(result["translate"]["keep_comments"], true);
    }

    #[test]
    fn sequences_are_replaced_not_merged() {
        let base = yaml("gap:\n  sequence: [2, 4, 6, 10]\n");
        let overlay = yaml("gap:\n  sequence: [1, 3]\n");

        let result = deep_merge(&base, &overlay);
        let sequence = result["gap"]["sequence"].as_sequence().unwrap();

        assert_eq!(sequence.len(), 2);
        assert_eq!(sequence[0], 1);
    }

    #[test]
    fn null_removes_inherited_value() {
        let base = yaml("translate:\n  indent_width: 2\n  optimize: false\n");
        let overlay = yaml("translate:\n  indent_width: null\n");

        let result = deep_merge(&base, &overlay);

        assert!(result["translate"].get("indent_width").is_none());
        assert_eq!(result["translate"]["optimize"], false);
    }

    #[test]
    fn scalar_overlay_replaces_mapping_base() {
        let base = yaml("settings:\n  default_output: verbose\n");
        let overlay = yaml("settings: off\n");

        let result = deep_merge(&base, &overlay);
        assert_eq!(result["settings"], "off");
    }

    #[test]
    fn merge_configs_merges_multiple_in_order() {
        let configs = vec![yaml("a: 1\nb: 2"), yaml("b: 3\nc: 4"), yaml("c: 5")];

        let result = merge_configs(&configs);

        assert_eq!(result["a"], 1);
        assert_eq!(result["b"], 3);
        assert_eq!(result["c"], 5);
    }

    #[test]
    fn empty_layers_change_nothing() {
        let configs = vec![yaml("gap:\n  sequence: [1, 2, 4]\n"), Value::Null];

        let result = merge_configs(&configs);
        assert_eq!(result["gap"]["sequence"][2], 4);
    }

    #[test]
    fn merge_empty_configs_returns_empty() {
        let result = merge_configs(&[]);
        assert!(result.as_mapping().unwrap().is_empty());
    }
}
