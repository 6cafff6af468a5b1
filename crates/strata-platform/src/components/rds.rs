use serde_json::{Value, json};
use strata_core::{ComplianceFramework, ComponentType};

use super::{DB_POSTGRES, at_least, compliance_tags, platform_tags, reference, tags_schema};

/// Managed `PostgreSQL` instance.
#[derive(Debug, Clone, Copy, Default)]
pub struct RdsPostgres;

impl RdsPostgres {
    fn backup_floor(framework: ComplianceFramework) -> Option<i64> {
        match framework {
            ComplianceFramework::Commercial => None,
            ComplianceFramework::FedrampLow => Some(14),
            ComplianceFramework::FedrampModerate => Some(30),
            ComplianceFramework::FedrampHigh => Some(35),
        }
    }
}

impl ComponentType for RdsPostgres {
    fn type_name(&self) -> &'static str {
        "rds-postgres"
    }

    fn config_schema(&self) -> Value {
        json!({
            "type": "object",
            "additionalProperties": false,
            "required": ["engineVersion", "instanceClass", "allocatedStorage", "databaseName"],
            "properties": {
                "engineVersion": { "enum": ["14", "15", "16", "17"] },
                "instanceClass": { "type": "string", "pattern": r"^db\.[a-z0-9]+\.[a-z0-9]+$" },
                "allocatedStorage": { "type": "integer", "minimum": 20, "maximum": 65536 },
                "databaseName": { "type": "string", "pattern": "^[a-z][a-z0-9_]{0,62}$" },
                "port": { "type": "integer", "minimum": 1150, "maximum": 65535 },
                "multiAz": { "type": "boolean" },
                "storageEncrypted": { "type": "boolean" },
                "backupRetentionDays": { "type": "integer", "minimum": 0, "maximum": 35 },
                "deletionProtection": { "type": "boolean" },
                "iamAuthentication": { "type": "boolean" },
                "performanceInsights": { "type": "boolean" },
                "tags": tags_schema()
            }
        })
    }

    fn hardcoded_fallback(&self) -> Value {
        json!({
            "engineVersion": "16",
            "instanceClass": "db.t4g.micro",
            "allocatedStorage": 20,
            "databaseName": "app",
            "port": 5432,
            "multiAz": false,
            "storageEncrypted": true,
            "backupRetentionDays": 1,
            "deletionProtection": false,
            "iamAuthentication": false,
            "performanceInsights": false
        })
    }

    fn platform_defaults(&self) -> Value {
        json!({
            "backupRetentionDays": 7,
            "performanceInsights": true,
            "tags": platform_tags(self.type_name())
        })
    }

    fn framework_defaults(&self, framework: ComplianceFramework, _prior: &Value) -> Value {
        let Some(backups) = Self::backup_floor(framework) else {
            return json!({});
        };
        json!({
            "multiAz": true,
            "backupRetentionDays": backups,
            "deletionProtection": true,
            "iamAuthentication": framework >= ComplianceFramework::FedrampModerate,
            "tags": compliance_tags(framework)
        })
    }

    fn policy_overrides(&self, framework: ComplianceFramework, merged: &Value) -> Value {
        let mut policy = json!({ "storageEncrypted": true });
        if let Some(floor) = Self::backup_floor(framework) {
            policy["deletionProtection"] = json!(true);
            policy["backupRetentionDays"] = json!(at_least(merged, "backupRetentionDays", floor));
        }
        if framework == ComplianceFramework::FedrampHigh {
            policy["iamAuthentication"] = json!(true);
        }
        policy
    }

    fn provided_capabilities(&self) -> &'static [&'static str] {
        &[DB_POSTGRES]
    }

    fn capability_data(
        &self,
        capability: &str,
        component_name: &str,
        config: &Value,
    ) -> Option<Value> {
        if capability != DB_POSTGRES {
            return None;
        }
        Some(json!({
            "resourceArn": reference(component_name, "arn"),
            "host": reference(component_name, "endpoint"),
            "port": config.get("port").and_then(Value::as_u64).unwrap_or(5432).to_string(),
            "databaseName": config.get("databaseName").and_then(Value::as_str).unwrap_or("app"),
            "secretArn": reference(component_name, "secretArn"),
            "iamAuthentication": config.get("iamAuthentication").and_then(Value::as_bool).unwrap_or(false)
        }))
    }
}
