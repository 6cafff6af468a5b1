use serde_json::{Map, Value, json};
use strata_core::{ComplianceFramework, ComponentType};

use super::{at_least, compliance_tags, platform_tags, tags_schema};

const RUNTIMES: &[&str] = &["nodejs20.x", "nodejs22.x", "python3.12", "java21", "provided.al2023"];

/// HTTP API handler function behind an API gateway.
#[derive(Debug, Clone, Copy, Default)]
pub struct LambdaApi;

/// Background function consuming queues or schedules.
#[derive(Debug, Clone, Copy, Default)]
pub struct LambdaWorker;

impl ComponentType for LambdaApi {
    fn type_name(&self) -> &'static str {
        "lambda-api"
    }

    fn config_schema(&self) -> Value {
        function_schema(
            29,
            json!({
                "type": "object",
                "additionalProperties": false,
                "properties": {
                    "path": { "type": "string", "pattern": "^/" },
                    "cors": { "type": "boolean" },
                    "authorizer": { "enum": ["none", "iam", "jwt"] }
                }
            }),
            "api",
        )
    }

    fn hardcoded_fallback(&self) -> Value {
        let mut fallback = function_fallback(10);
        fallback["api"] = json!({ "path": "/", "cors": false, "authorizer": "iam" });
        fallback
    }

    fn platform_defaults(&self) -> Value {
        function_platform_defaults(self.type_name())
    }

    fn framework_defaults(&self, framework: ComplianceFramework, _prior: &Value) -> Value {
        function_framework_defaults(framework)
    }

    fn policy_overrides(&self, framework: ComplianceFramework, merged: &Value) -> Value {
        let mut policy = function_policy(framework, merged);
        if framework.is_fedramp()
            && merged.pointer("/api/authorizer").and_then(Value::as_str) == Some("none")
        {
            policy["api"] = json!({ "authorizer": "iam" });
        }
        policy
    }
}

impl ComponentType for LambdaWorker {
    fn type_name(&self) -> &'static str {
        "lambda-worker"
    }

    fn config_schema(&self) -> Value {
        function_schema(
            900,
            json!({
                "type": "object",
                "additionalProperties": false,
                "properties": {
                    "batchSize": { "type": "integer", "minimum": 1, "maximum": 10000 },
                    "maximumConcurrency": { "type": "integer", "minimum": 2, "maximum": 1000 }
                }
            }),
            "events",
        )
    }

    fn hardcoded_fallback(&self) -> Value {
        let mut fallback = function_fallback(60);
        fallback["events"] = json!({ "batchSize": 10 });
        fallback
    }

    fn platform_defaults(&self) -> Value {
        function_platform_defaults(self.type_name())
    }

    fn framework_defaults(&self, framework: ComplianceFramework, _prior: &Value) -> Value {
        function_framework_defaults(framework)
    }

    fn policy_overrides(&self, framework: ComplianceFramework, merged: &Value) -> Value {
        function_policy(framework, merged)
    }
}

/// Config schema shared by both function types. `extra` is the schema of
/// the type-specific block stored under `extra_key`.
fn function_schema(max_timeout: u32, extra: Value, extra_key: &str) -> Value {
    let mut properties = Map::new();
    properties.insert("runtime".to_owned(), json!({ "enum": RUNTIMES }));
    properties.insert("handler".to_owned(), json!({ "type": "string", "minLength": 1 }));
    properties.insert(
        "memorySize".to_owned(),
        json!({ "type": "integer", "minimum": 128, "maximum": 10240 }),
    );
    properties.insert(
        "timeout".to_owned(),
        json!({ "type": "integer", "minimum": 1, "maximum": max_timeout }),
    );
    properties.insert("architecture".to_owned(), json!({ "enum": ["arm64", "x86_64"] }));
    properties.insert("tracing".to_owned(), json!({ "enum": ["Active", "PassThrough"] }));
    properties.insert("reservedConcurrency".to_owned(), json!({ "type": "integer", "minimum": 0 }));
    properties.insert(
        "logging".to_owned(),
        json!({
            "type": "object",
            "additionalProperties": false,
            "properties": {
                "level": { "enum": ["DEBUG", "INFO", "WARN", "ERROR"] },
                "retentionDays": { "type": "integer", "minimum": 1 }
            }
        }),
    );
    properties.insert(
        "vpc".to_owned(),
        json!({
            "type": "object",
            "additionalProperties": false,
            "properties": {
                "enabled": { "type": "boolean" },
                "subnetIds": { "type": "array", "items": { "type": "string" } }
            }
        }),
    );
    properties.insert("environment".to_owned(), json!({ "type": "object", "additionalProperties": { "type": "string" } }));
    properties.insert("tags".to_owned(), tags_schema());
    properties.insert(extra_key.to_owned(), extra);

    json!({
        "type": "object",
        "additionalProperties": false,
        "required": ["runtime", "handler", "memorySize", "timeout"],
        "properties": properties
    })
}

fn function_fallback(timeout: u32) -> Value {
    json!({
        "runtime": "nodejs20.x",
        "handler": "index.handler",
        "memorySize": 256,
        "timeout": timeout,
        "architecture": "x86_64",
        "tracing": "PassThrough",
        "logging": { "level": "INFO", "retentionDays": 14 },
        "vpc": { "enabled": false }
    })
}

fn function_platform_defaults(type_name: &str) -> Value {
    json!({
        "architecture": "arm64",
        "logging": { "retentionDays": 30 },
        "tags": platform_tags(type_name)
    })
}

fn function_framework_defaults(framework: ComplianceFramework) -> Value {
    match framework {
        ComplianceFramework::Commercial => json!({}),
        ComplianceFramework::FedrampLow => json!({
            "tracing": "Active",
            "logging": { "retentionDays": 90 },
            "tags": compliance_tags(framework)
        }),
        ComplianceFramework::FedrampModerate | ComplianceFramework::FedrampHigh => json!({
            "tracing": "Active",
            "logging": { "retentionDays": 365 },
            "vpc": { "enabled": true },
            "tags": compliance_tags(framework)
        }),
    }
}

/// Minimum log retention the framework mandates, if any.
fn retention_floor(framework: ComplianceFramework) -> Option<i64> {
    match framework {
        ComplianceFramework::Commercial => None,
        ComplianceFramework::FedrampLow => Some(90),
        ComplianceFramework::FedrampModerate | ComplianceFramework::FedrampHigh => Some(365),
    }
}

fn function_policy(framework: ComplianceFramework, merged: &Value) -> Value {
    let Some(floor) = retention_floor(framework) else {
        return json!({});
    };

    let logging = merged.get("logging").cloned().unwrap_or_else(|| json!({}));
    let mut policy = json!({
        "tracing": "Active",
        "logging": { "retentionDays": at_least(&logging, "retentionDays", floor) }
    });
    if framework == ComplianceFramework::FedrampHigh {
        policy["vpc"] = json!({ "enabled": true });
    }
    policy
}
