use serde_json::{Value, json};
use strata_core::{ComplianceFramework, ComponentType};

use super::{QUEUE_SQS, compliance_tags, platform_tags, reference, tags_schema};

/// Message queue.
#[derive(Debug, Clone, Copy, Default)]
pub struct SqsQueue;

impl ComponentType for SqsQueue {
    fn type_name(&self) -> &'static str {
        "sqs-queue"
    }

    fn config_schema(&self) -> Value {
        json!({
            "type": "object",
            "additionalProperties": false,
            "required": ["visibilityTimeout"],
            "properties": {
                "fifo": { "type": "boolean" },
                "visibilityTimeout": { "type": "integer", "minimum": 0, "maximum": 43200 },
                "messageRetentionSeconds": { "type": "integer", "minimum": 60, "maximum": 1_209_600 },
                "deadLetter": {
                    "type": "object",
                    "additionalProperties": false,
                    "properties": {
                        "enabled": { "type": "boolean" },
                        "maxReceiveCount": { "type": "integer", "minimum": 1, "maximum": 1000 }
                    }
                },
                "encryption": { "enum": ["sqs-managed", "kms"] },
                "tags": tags_schema()
            }
        })
    }

    fn hardcoded_fallback(&self) -> Value {
        json!({
            "fifo": false,
            "visibilityTimeout": 30,
            "messageRetentionSeconds": 345_600,
            "deadLetter": { "enabled": false, "maxReceiveCount": 5 },
            "encryption": "sqs-managed"
        })
    }

    fn platform_defaults(&self) -> Value {
        json!({
            "deadLetter": { "enabled": true },
            "tags": platform_tags(self.type_name())
        })
    }

    fn framework_defaults(&self, framework: ComplianceFramework, _prior: &Value) -> Value {
        if !framework.is_fedramp() {
            return json!({});
        }
        json!({
            "encryption": "kms",
            "tags": compliance_tags(framework)
        })
    }

    fn policy_overrides(&self, framework: ComplianceFramework, _merged: &Value) -> Value {
        if framework >= ComplianceFramework::FedrampModerate {
            json!({ "encryption": "kms" })
        } else {
            json!({})
        }
    }

    fn provided_capabilities(&self) -> &'static [&'static str] {
        &[QUEUE_SQS]
    }

    fn capability_data(
        &self,
        capability: &str,
        component_name: &str,
        config: &Value,
    ) -> Option<Value> {
        if capability != QUEUE_SQS {
            return None;
        }
        Some(json!({
            "queueUrl": reference(component_name, "queueUrl"),
            "queueArn": reference(component_name, "arn"),
            "fifo": config.get("fifo").and_then(Value::as_bool).unwrap_or(false),
            "kms": config.get("encryption").and_then(Value::as_str) == Some("kms")
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kms_policy_from_moderate() {
        assert_eq!(
            SqsQueue.policy_overrides(ComplianceFramework::FedrampLow, &json!({})),
            json!({})
        );
        assert_eq!(
            SqsQueue.policy_overrides(ComplianceFramework::FedrampModerate, &json!({}))["encryption"],
            "kms"
        );
    }

    #[test]
    fn test_capability_data() {
        let data = SqsQueue
            .capability_data(QUEUE_SQS, "jobs", &json!({ "fifo": true, "encryption": "kms" }))
            .unwrap();
        assert_eq!(data["queueUrl"], "${ref:jobs.queueUrl}");
        assert_eq!(data["fifo"], true);
        assert_eq!(data["kms"], true);
    }
}
