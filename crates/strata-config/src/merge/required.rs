use serde_json::Value;
use strata_core::path::join_key;

/// Dotted paths of every `required` field in `schema` absent from `value`.
///
/// Follows `properties` recursively, but only into objects that are present:
/// an absent optional object does not make its own required fields missing.
#[must_use]
pub fn missing_required(schema: &Value, value: &Value) -> Vec<String> {
    let mut missing = Vec::new();
    collect(schema, value, "", &mut missing);
    missing
}

fn collect(schema: &Value, value: &Value, prefix: &str, missing: &mut Vec<String>) {
    let Some(object) = value.as_object() else {
        return;
    };

    if let Some(required) = schema.get("required").and_then(Value::as_array) {
        for field in required.iter().filter_map(Value::as_str) {
            if object.get(field).is_none_or(Value::is_null) {
                missing.push(join_key(prefix, field));
            }
        }
    }

    if let Some(properties) = schema.get("properties").and_then(Value::as_object) {
        for (key, sub_schema) in properties {
            if let Some(child) = object.get(key) {
                collect(sub_schema, child, &join_key(prefix, key), missing);
            }
        }
    }
}
