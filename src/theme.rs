//! Theme values harvested from a configuration document.
//!
//! The interpreter emits the theme as an arbitrary JSON graph. [`flatten`]
//! reduces it to [`ThemeValue`] trees so consumers match on every shape
//! explicitly instead of poking at untyped JSON.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Ordered map of theme keys, in the order the configuration declared them.
pub type ThemeMap = IndexMap<String, ThemeValue>;

/// A single theme entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ThemeValue {
    /// Plain value such as a color or a length
    Scalar(String),
    /// Array value, every element collapsed to its string form
    List(Vec<String>),
    /// Nested section (color shades, screen sizes...)
    Map(ThemeMap),
}

impl ThemeValue {
    pub fn as_scalar(&self) -> Option<&str> {
        match self {
            ThemeValue::Scalar(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            ThemeValue::List(values) => Some(values),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&ThemeMap> {
        match self {
            ThemeValue::Map(map) => Some(map),
            _ => None,
        }
    }

    /// Walk a dotted path (`"colors.brand.500"`) through nested maps
    pub fn lookup(&self, path: &str) -> Option<&ThemeValue> {
        path.split('.').try_fold(self, |node, key| node.as_map()?.get(key))
    }
}

/// Look up a dotted path starting at a top-level theme map
pub fn lookup<'a>(map: &'a ThemeMap, path: &str) -> Option<&'a ThemeValue> {
    let (head, rest) = match path.split_once('.') {
        Some((head, rest)) => (head, Some(rest)),
        None => (path, None),
    };
    let value = map.get(head)?;
    match rest {
        Some(rest) => value.lookup(rest),
        None => Some(value),
    }
}

/// Convert a JSON node into a theme map.
///
/// Returns `None` when the node is absent or `null`, so callers can tell a
/// missing section from an empty one. Non-object nodes yield an empty map.
/// `ignore_key` is skipped at the top level only.
pub fn flatten(node: Option<&Value>, ignore_key: Option<&str>) -> Option<ThemeMap> {
    let node = match node {
        None | Some(Value::Null) => return None,
        Some(node) => node,
    };

    let mut result = ThemeMap::new();

    if let Value::Object(object) = node {
        for (key, value) in object {
            if Some(key.as_str()) == ignore_key {
                continue;
            }

            match value {
                Value::Object(_) => {
                    if let Some(nested) = flatten(Some(value), None) {
                        result.insert(key.clone(), ThemeValue::Map(nested));
                    }
                }
                Value::Array(items) => {
                    result.insert(
                        key.clone(),
                        ThemeValue::List(items.iter().map(element_text).collect()),
                    );
                }
                Value::Null => {}
                scalar => {
                    result.insert(key.clone(), ThemeValue::Scalar(element_text(scalar).trim().to_string()));
                }
            }
        }
    }

    Some(result)
}

/// String form of a JSON value: strings unquoted, everything else as JSON text
fn element_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_absent_node_is_none() {
        assert!(flatten(None, None).is_none());
        assert!(flatten(Some(&Value::Null), None).is_none());
    }

    #[test]
    fn test_non_object_is_empty() {
        let map = flatten(Some(&json!("oops")), None).unwrap();
        assert!(map.is_empty());

        let map = flatten(Some(&json!([1, 2])), None).unwrap();
        assert!(map.is_empty());
    }

    #[test]
    fn test_scalars_are_trimmed() {
        let map = flatten(Some(&json!({ "spacing": "  4px ", "opacity": 0.5, "dark": true })), None).unwrap();
        assert_eq!(map["spacing"], ThemeValue::Scalar("4px".to_string()));
        assert_eq!(map["opacity"], ThemeValue::Scalar("0.5".to_string()));
        assert_eq!(map["dark"], ThemeValue::Scalar("true".to_string()));
    }

    #[test]
    fn test_nulls_are_omitted() {
        let map = flatten(Some(&json!({ "a": null, "b": { "c": null, "d": "x" } })), None).unwrap();
        assert!(!map.contains_key("a"));
        let nested = map["b"].as_map().unwrap();
        assert_eq!(nested.len(), 1);
        assert_eq!(nested["d"].as_scalar(), Some("x"));
    }

    #[test]
    fn test_arrays_collapse_to_strings() {
        let map = flatten(
            Some(&json!({ "fontFamily": { "sans": ["Inter", "sans-serif"] }, "mixed": ["a", 1, { "k": "v" }] })),
            None,
        )
        .unwrap();

        let sans = map["fontFamily"].lookup("sans").unwrap();
        assert_eq!(sans.as_list().unwrap(), ["Inter", "sans-serif"]);
        assert_eq!(map["mixed"].as_list().unwrap(), ["a", "1", r#"{"k":"v"}"#]);
    }

    #[test]
    fn test_ignore_key_only_applies_at_top_level() {
        let theme = json!({
            "colors": { "extend": "kept" },
            "extend": { "colors": { "brand": "#123456" } }
        });
        let map = flatten(Some(&theme), Some("extend")).unwrap();
        assert!(!map.contains_key("extend"));
        assert_eq!(map["colors"].lookup("extend").and_then(ThemeValue::as_scalar), Some("kept"));
    }

    #[test]
    fn test_key_order_is_preserved() {
        let map = flatten(Some(&json!({ "z": "1", "a": "2", "m": "3" })), None).unwrap();
        let keys: Vec<_> = map.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["z", "a", "m"]);
    }

    #[test]
    fn test_dotted_lookup() {
        let map = flatten(Some(&json!({ "colors": { "brand": { "500": "#f00" } } })), None).unwrap();
        assert_eq!(lookup(&map, "colors.brand.500").and_then(ThemeValue::as_scalar), Some("#f00"));
        assert!(lookup(&map, "colors.brand.600").is_none());
        assert!(lookup(&map, "spacing").is_none());
    }
}
