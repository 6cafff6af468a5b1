use serde_json::{Value, json};
use strata_core::{ComplianceFramework, ComponentType};

use super::{STORAGE_S3, compliance_tags, platform_tags, reference, tags_schema};

/// Object storage bucket.
#[derive(Debug, Clone, Copy, Default)]
pub struct S3Bucket;

impl ComponentType for S3Bucket {
    fn type_name(&self) -> &'static str {
        "s3-bucket"
    }

    fn config_schema(&self) -> Value {
        json!({
            "type": "object",
            "additionalProperties": false,
            "required": ["versioned", "encryption"],
            "properties": {
                "bucketName": { "type": "string", "pattern": r"^[a-z0-9$][a-z0-9.${}:-]{2,62}$" },
                "versioned": { "type": "boolean" },
                "encryption": {
                    "type": "object",
                    "additionalProperties": false,
                    "required": ["algorithm"],
                    "properties": {
                        "algorithm": { "enum": ["AES256", "aws:kms"] },
                        "kmsKeyId": { "type": "string" }
                    }
                },
                "blockPublicAccess": { "type": "boolean" },
                "enforceTls": { "type": "boolean" },
                "accessLogging": { "type": "boolean" },
                "lifecycleDays": { "type": "integer", "minimum": 1 },
                "tags": tags_schema()
            }
        })
    }

    fn hardcoded_fallback(&self) -> Value {
        json!({
            "versioned": false,
            "encryption": { "algorithm": "AES256" },
            "blockPublicAccess": true,
            "enforceTls": false,
            "accessLogging": false
        })
    }

    fn platform_defaults(&self) -> Value {
        json!({
            "enforceTls": true,
            "tags": platform_tags(self.type_name())
        })
    }

    fn framework_defaults(&self, framework: ComplianceFramework, _prior: &Value) -> Value {
        if !framework.is_fedramp() {
            return json!({});
        }
        json!({
            "versioned": true,
            "encryption": { "algorithm": "aws:kms" },
            "accessLogging": true,
            "tags": compliance_tags(framework)
        })
    }

    fn policy_overrides(&self, framework: ComplianceFramework, _merged: &Value) -> Value {
        if !framework.is_fedramp() {
            return json!({});
        }
        json!({
            "blockPublicAccess": true,
            "enforceTls": true,
            "encryption": { "algorithm": "aws:kms" }
        })
    }

    fn provided_capabilities(&self) -> &'static [&'static str] {
        &[STORAGE_S3]
    }

    fn capability_data(
        &self,
        capability: &str,
        component_name: &str,
        config: &Value,
    ) -> Option<Value> {
        if capability != STORAGE_S3 {
            return None;
        }
        let bucket_name = config
            .get("bucketName")
            .and_then(Value::as_str)
            .map_or_else(|| reference(component_name, "bucketName"), str::to_owned);
        let kms = config.pointer("/encryption/algorithm").and_then(Value::as_str) == Some("aws:kms");
        Some(json!({
            "bucketName": bucket_name,
            "bucketArn": reference(component_name, "arn"),
            "kms": kms
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fedramp_forces_kms() {
        let policy = S3Bucket.policy_overrides(ComplianceFramework::FedrampLow, &json!({}));
        assert_eq!(policy["encryption"]["algorithm"], "aws:kms");
        assert_eq!(
            S3Bucket.policy_overrides(ComplianceFramework::Commercial, &json!({})),
            json!({})
        );
    }

    #[test]
    fn test_capability_data_uses_explicit_name() {
        let named = S3Bucket
            .capability_data(STORAGE_S3, "assets", &json!({ "bucketName": "orders-assets" }))
            .unwrap();
        assert_eq!(named["bucketName"], "orders-assets");
        assert_eq!(named["kms"], false);

        let unnamed = S3Bucket
            .capability_data(STORAGE_S3, "assets", &json!({ "encryption": { "algorithm": "aws:kms" } }))
            .unwrap();
        assert_eq!(unnamed["bucketName"], "${ref:assets.bucketName}");
        assert_eq!(unnamed["kms"], true);
    }
}
