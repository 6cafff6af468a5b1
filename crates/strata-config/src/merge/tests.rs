use serde_json::json;

use super::*;

#[test]
fn test_deep_merge_scalars() {
    let mut base = json!({ "memorySize": 256, "timeout": 30 });
    deep_merge(&mut base, &json!({ "memorySize": 512 }));

    assert_eq!(base["memorySize"], 512);
    assert_eq!(base["timeout"], 30);
}

#[test]
fn test_deep_merge_new_keys() {
    let mut base = json!({ "encryption": { "enabled": true } });
    deep_merge(
        &mut base,
        &json!({ "encryption": { "kmsKeyId": "alias/app" }, "versioned": true }),
    );

    assert_eq!(base["encryption"]["enabled"], true);
    assert_eq!(base["encryption"]["kmsKeyId"], "alias/app");
    assert_eq!(base["versioned"], true);
}

#[test]
fn test_deep_merge_arrays_replace() {
    let mut base = json!({ "rules": ["a", "b"] });
    deep_merge(&mut base, &json!({ "rules": ["c"] }));
    assert_eq!(base["rules"], json!(["c"]));
}

#[test]
fn test_deep_merge_tracking() {
    let mut base = json!({});
    let mut sources = FieldSources::new();

    deep_merge_tracking(
        &mut base,
        &json!({ "memorySize": 128, "logging": { "level": "info", "retentionDays": 7 } }),
        "",
        ConfigLayer::HardcodedFallback,
        &mut sources,
    );
    deep_merge_tracking(
        &mut base,
        &json!({ "logging": { "retentionDays": 365 } }),
        "",
        ConfigLayer::EnvironmentDefault,
        &mut sources,
    );

    assert_eq!(sources["memorySize"], ConfigLayer::HardcodedFallback);
    assert_eq!(sources["logging.level"], ConfigLayer::HardcodedFallback);
    assert_eq!(sources["logging.retentionDays"], ConfigLayer::EnvironmentDefault);
    assert_eq!(base["logging"]["retentionDays"], 365);
}

#[test]
fn test_tracking_scalar_replaces_object() {
    let mut base = json!({});
    let mut sources = FieldSources::new();
    deep_merge_tracking(
        &mut base,
        &json!({ "vpc": { "id": "a", "subnets": ["x"] } }),
        "",
        ConfigLayer::PlatformDefault,
        &mut sources,
    );
    deep_merge_tracking(
        &mut base,
        &json!({ "vpc": null }),
        "",
        ConfigLayer::ComponentOverride,
        &mut sources,
    );

    assert_eq!(base["vpc"], serde_json::Value::Null);
    assert_eq!(sources.get("vpc"), Some(&ConfigLayer::ComponentOverride));
    assert!(!sources.contains_key("vpc.id"));
    assert!(!sources.contains_key("vpc.subnets"));
}

#[test]
fn test_tracking_object_replaces_scalar() {
    let mut base = json!({ "retention": 7 });
    let mut sources = FieldSources::new();
    sources.insert("retention".to_owned(), ConfigLayer::HardcodedFallback);

    deep_merge_tracking(
        &mut base,
        &json!({ "retention": { "days": 30 } }),
        "",
        ConfigLayer::PolicyOverride,
        &mut sources,
    );

    assert!(!sources.contains_key("retention"));
    assert_eq!(sources["retention.days"], ConfigLayer::PolicyOverride);
}

#[test]
fn test_layer_ordering() {
    let mut sorted = ConfigLayer::ALL.to_vec();
    sorted.sort();
    assert_eq!(sorted, ConfigLayer::ALL.to_vec());
    assert_eq!(ConfigLayer::HardcodedFallback.precedence(), 1);
    assert_eq!(ConfigLayer::PolicyOverride.precedence(), 5);
}

#[test]
fn test_find_reserved_key_in_tags() {
    assert!(find_reserved_key(&json!({ "tags": { "team": "a" } })).is_none());

    let hit = find_reserved_key(&json!({ "tags": { "platform:cost-center": "1" } })).unwrap();
    assert_eq!(hit.path, "tags.platform:cost-center");
    assert_eq!(hit.prefix, "platform:");

    let hit = find_reserved_key(&json!({
        "queues": [{ "dlq": { "tags": { "compliance:level": "high" } } }]
    }))
    .unwrap();
    assert_eq!(hit.path, "queues[0].dlq.tags.compliance:level");
    assert_eq!(hit.key, "compliance:level");
}

#[test]
fn test_find_reserved_key_outside_tags() {
    let hit = find_reserved_key(&json!({ "platform:owner": "me" })).unwrap();
    assert_eq!(hit.path, "platform:owner");

    let hit = find_reserved_key(&json!({
        "memorySize": 512,
        "nested": { "governance:level": "low" }
    }))
    .unwrap();
    assert_eq!(hit.path, "nested.governance:level");
    assert_eq!(hit.prefix, "governance:");

    // Values are not keys.
    assert!(find_reserved_key(&json!({ "owner": "platform:team" })).is_none());
}

#[test]
fn test_missing_required_recursive() {
    let schema = json!({
        "type": "object",
        "required": ["runtime"],
        "properties": {
            "encryption": {
                "type": "object",
                "required": ["kmsKeyId"]
            },
            "vpc": {
                "type": "object",
                "required": ["id"]
            }
        }
    });

    let value = json!({ "encryption": { "enabled": true } });
    assert_eq!(
        missing_required(&schema, &value),
        vec!["runtime".to_owned(), "encryption.kmsKeyId".to_owned()]
    );

    let complete = json!({ "runtime": "nodejs20.x", "encryption": { "kmsKeyId": "k" } });
    assert!(missing_required(&schema, &complete).is_empty());
}
