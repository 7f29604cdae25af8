//! Dotted-path lookup over plain JSON objects and arrays

use serde_json::Value;

/// Resolve `a.b.0.c` against `root`
///
/// Objects are walked by key, arrays by numeric index. Any missing step,
/// scalar intermediate or `null` yields `None`; this never panics.
pub fn resolve<'a>(root: &'a Value, path: &str) -> Option<&'a Value> {
    let mut current = root;
    for segment in path.split('.') {
        if segment.is_empty() {
            return None;
        }
        current = match current {
            Value::Object(map) => map.get(segment)?,
            Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    match current {
        Value::Null => None,
        value => Some(value),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_resolve_nested() {
        let data = json!({"a": {"b": {"c": "deep"}}});
        assert_eq!(resolve(&data, "a.b.c"), Some(&json!("deep")));
        assert_eq!(resolve(&data, "a.b"), Some(&json!({"c": "deep"})));
    }

    #[test]
    fn test_resolve_array_index() {
        let data = json!({"items": [{"name": "bolt"}, {"name": "nut"}]});
        assert_eq!(resolve(&data, "items.1.name"), Some(&json!("nut")));
        assert_eq!(resolve(&data, "items.7.name"), None);
        assert_eq!(resolve(&data, "items.first"), None);
    }

    #[test]
    fn test_resolve_missing_is_none() {
        let data = json!({"a": {"b": 1}});
        assert_eq!(resolve(&data, "a.x"), None);
        assert_eq!(resolve(&data, "a.b.c"), None);
        assert_eq!(resolve(&data, "z"), None);
    }

    #[test]
    fn test_resolve_null_root_and_leaf() {
        assert_eq!(resolve(&Value::Null, "a"), None);
        assert_eq!(resolve(&json!({"a": null}), "a"), None);
    }

    #[test]
    fn test_empty_segments_never_match() {
        let data = json!({"": 1, "a": {"": 2}});
        assert_eq!(resolve(&data, ""), None);
        assert_eq!(resolve(&data, "a."), None);
        assert_eq!(resolve(&data, ".a"), None);
    }

    #[test]
    fn test_falsy_values_resolve() {
        let data = json!({"zero": 0, "no": false, "empty": ""});
        assert_eq!(resolve(&data, "zero"), Some(&json!(0)));
        assert_eq!(resolve(&data, "no"), Some(&json!(false)));
        assert_eq!(resolve(&data, "empty"), Some(&json!("")));
    }
}
