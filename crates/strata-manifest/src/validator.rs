//! Schema validation stage.
//!
//! Collects every violation before failing so one run surfaces everything
//! a manifest author has to fix. `service` and `owner` are checked
//! explicitly because every later stage depends on them.

use std::collections::BTreeMap;

use serde_json::Value;
use strata_core::ComponentRegistry;
use strata_core::path::{from_pointer, join_index, join_key};
use tracing::debug;

use crate::composer::MasterSchema;
use crate::error::{SchemaValidationError, SchemaViolation};
use crate::warning::Warning;

/// Top-level fields that must be present before anything else can run.
pub const REQUIRED_TOP_LEVEL: &[&str] = &["service", "owner"];

/// Top-level keys the manifest format defines.
const KNOWN_TOP_LEVEL: &[&str] = &[
    "service",
    "owner",
    "complianceFramework",
    "environments",
    "components",
    "governance",
];

/// Validate `tree` against `master`.
///
/// On success returns non-fatal warnings: unknown top-level keys and
/// components whose type is not registered.
///
/// # Errors
///
/// Returns a [`SchemaValidationError`] carrying one entry per violation.
pub fn validate(
    tree: &Value,
    master: &MasterSchema,
    registry: &ComponentRegistry,
) -> Result<Vec<Warning>, SchemaValidationError> {
    let mut errors = Vec::new();

    for field in REQUIRED_TOP_LEVEL {
        if tree.get(field).is_none_or(Value::is_null) {
            errors.push(SchemaViolation {
                path: (*field).to_owned(),
                message: format!("Missing required field: {field}"),
                value: None,
            });
        }
    }

    for error in master.validator().iter_errors(tree) {
        let pointer = error.instance_path.to_string();
        errors.push(SchemaViolation {
            path: from_pointer(&pointer),
            message: error.to_string(),
            value: scalar_at(tree, &pointer),
        });
    }

    errors.extend(duplicate_names(tree));

    if !errors.is_empty() {
        debug!(count = errors.len(), "schema validation failed");
        return Err(SchemaValidationError { errors });
    }

    Ok(collect_warnings(tree, registry))
}

/// The value at `pointer` if it is a scalar. Objects and arrays are omitted
/// to keep messages readable.
fn scalar_at(tree: &Value, pointer: &str) -> Option<Value> {
    tree.pointer(pointer)
        .filter(|v| !v.is_object() && !v.is_array())
        .cloned()
}

/// Component names must be unique; the schema language cannot express that.
fn duplicate_names(tree: &Value) -> Vec<SchemaViolation> {
    let Some(components) = tree.get("components").and_then(Value::as_array) else {
        return Vec::new();
    };

    let mut first_seen: BTreeMap<&str, usize> = BTreeMap::new();
    let mut violations = Vec::new();
    for (index, component) in components.iter().enumerate() {
        let Some(name) = component.get("name").and_then(Value::as_str) else {
            continue;
        };
        if let Some(first) = first_seen.get(name) {
            violations.push(SchemaViolation {
                path: join_key(&join_index("components", index), "name"),
                message: format!(
                    "duplicate component name '{name}' (first declared at components[{first}])"
                ),
                value: Some(Value::String(name.to_owned())),
            });
        } else {
            first_seen.insert(name, index);
        }
    }
    violations
}

fn collect_warnings(tree: &Value, registry: &ComponentRegistry) -> Vec<Warning> {
    let mut warnings = Vec::new();

    if let Some(root) = tree.as_object() {
        for key in root.keys() {
            if !KNOWN_TOP_LEVEL.contains(&key.as_str()) {
                warnings.push(Warning::new(key.clone(), "unknown top-level key is ignored"));
            }
        }
    }

    if let Some(components) = tree.get("components").and_then(Value::as_array) {
        for (index, component) in components.iter().enumerate() {
            if let Some(type_name) = component.get("type").and_then(Value::as_str)
                && !registry.contains(type_name)
            {
                warnings.push(Warning::new(
                    join_key(&join_index("components", index), "type"),
                    format!("component type '{type_name}' is not registered; config is not checked"),
                ));
            }
        }
    }

    warnings
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::composer::compose_master_schema;
    use serde_json::json;
    use std::sync::Arc;
    use strata_core::ComponentType;

    struct Queue;

    impl ComponentType for Queue {
        fn type_name(&self) -> &'static str {
            "test-queue"
        }

        fn config_schema(&self) -> Value {
            json!({
                "type": "object",
                "properties": {
                    "fifo": { "type": "boolean" },
                    "retentionDays": { "type": "integer", "minimum": 1 }
                },
                "additionalProperties": false
            })
        }

        fn hardcoded_fallback(&self) -> Value {
            json!({ "fifo": false })
        }
    }

    fn setup() -> (MasterSchema, ComponentRegistry) {
        let registry = ComponentRegistry::new().with(Arc::new(Queue)).unwrap();
        (compose_master_schema(&registry).unwrap(), registry)
    }

    #[test]
    fn test_missing_owner() {
        let (master, registry) = setup();
        let err = validate(&json!({ "service": "orders" }), &master, &registry).unwrap_err();
        assert_eq!(err.errors.len(), 1);
        assert_eq!(err.errors[0].message, "Missing required field: owner");
        assert!(err.to_string().contains("Missing required field: owner"));
    }

    #[test]
    fn test_collects_all_violations() {
        let (master, registry) = setup();
        let tree = json!({
            "components": [
                { "name": "Bad_Name", "type": "test-queue", "config": { "retentionDays": 0 } },
                { "name": "q2", "type": "test-queue", "config": { "fifo": "yes" } }
            ]
        });

        let err = validate(&tree, &master, &registry).unwrap_err();
        let paths: Vec<&str> = err.errors.iter().map(|e| e.path.as_str()).collect();
        assert!(paths.contains(&"service"));
        assert!(paths.contains(&"owner"));
        assert!(paths.contains(&"components[0].name"));
        assert!(paths.contains(&"components[0].config.retentionDays"));
        assert!(paths.contains(&"components[1].config.fifo"));
    }

    #[test]
    fn test_offending_value_reported() {
        let (master, registry) = setup();
        let tree = json!({
            "service": "orders",
            "owner": "team-a",
            "complianceFramework": "fedramp-extreme"
        });
        let err = validate(&tree, &master, &registry).unwrap_err();
        assert_eq!(err.errors[0].path, "complianceFramework");
        assert_eq!(err.errors[0].value, Some(json!("fedramp-extreme")));
    }

    #[test]
    fn test_duplicate_component_names() {
        let (master, registry) = setup();
        let tree = json!({
            "service": "orders",
            "owner": "team-a",
            "components": [
                { "name": "q", "type": "test-queue" },
                { "name": "q", "type": "test-queue" }
            ]
        });
        let err = validate(&tree, &master, &registry).unwrap_err();
        assert_eq!(err.errors.len(), 1);
        assert_eq!(err.errors[0].path, "components[1].name");
        assert!(err.errors[0].message.contains("duplicate component name 'q'"));
    }

    #[test]
    fn test_binding_access_enum() {
        let (master, registry) = setup();
        let tree = json!({
            "service": "orders",
            "owner": "team-a",
            "components": [
                { "name": "q", "type": "test-queue", "binds": [{ "to": "x", "access": "root" }] }
            ]
        });
        let err = validate(&tree, &master, &registry).unwrap_err();
        assert_eq!(err.errors[0].path, "components[0].binds[0].access");
    }

    #[test]
    fn test_valid_manifest_with_warnings() {
        let (master, registry) = setup();
        let tree = json!({
            "service": "orders",
            "owner": "team-a",
            "extra": true,
            "components": [
                { "name": "q", "type": "test-queue", "config": { "fifo": true } },
                { "name": "api", "type": "x", "binds": [{ "to": "db" }] }
            ]
        });
        let warnings = validate(&tree, &master, &registry).unwrap();
        assert_eq!(warnings.len(), 2);
        assert_eq!(warnings[0].path, "extra");
        assert_eq!(warnings[1].path, "components[1].type");
    }
}
