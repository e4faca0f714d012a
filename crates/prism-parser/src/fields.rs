//! Dot-path projection over parsed JSON.

use serde_json::{Map, Value};

/// Project `paths` out of `data`. Each path is dot notation into nested
/// objects; missing paths are silently omitted. Non-object inputs yield an
/// empty map.
pub fn extract_fields(data: &Value, paths: &[&str]) -> Map<String, Value> {
    let mut result = Map::new();

    if !data.is_object() {
        return result;
    }

    for path in paths {
        if let Some(value) = nested_value(data, path) {
            result.insert((*path).to_string(), value.clone());
        }
    }

    result
}

fn nested_value<'a>(data: &'a Value, path: &str) -> Option<&'a Value> {
    let mut current = data;
    for part in path.split('.') {
        current = current.as_object()?.get(part)?;
    }
    Some(current)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn projects_nested_paths() {
        let data = json!({"a": {"b": {"c": 1}}, "top": true});
        let fields = extract_fields(&data, &["a.b.c", "top"]);
        assert_eq!(fields.get("a.b.c"), Some(&json!(1)));
        assert_eq!(fields.get("top"), Some(&json!(true)));
    }

    #[test]
    fn omits_missing_paths() {
        let data = json!({"a": 1});
        let fields = extract_fields(&data, &["a", "b", "a.deeper"]);
        assert_eq!(fields.len(), 1);
        assert!(fields.contains_key("a"));
    }

    #[test]
    fn non_object_input_is_empty() {
        assert!(extract_fields(&json!([1, 2]), &["0"]).is_empty());
    }
}
