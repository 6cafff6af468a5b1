use serde_json::{Value, json};
use strata_core::{ComplianceFramework, ComponentType};

use super::{compliance_tags, platform_tags, tags_schema};

const BASELINE_RULE_GROUP: &str = "AWSManagedRulesCommonRuleSet";

/// Web application firewall in front of an API.
///
/// Stricter frameworks extend the managed rule groups rather than replace
/// them: the framework layer reads the prior list and appends its own.
#[derive(Debug, Clone, Copy, Default)]
pub struct WafWebAcl;

impl WafWebAcl {
    /// Rule groups a framework adds on top of whatever is already enabled.
    fn framework_rule_groups(framework: ComplianceFramework) -> &'static [&'static str] {
        match framework {
            ComplianceFramework::Commercial => &[],
            ComplianceFramework::FedrampLow => &["AWSManagedRulesKnownBadInputsRuleSet"],
            ComplianceFramework::FedrampModerate => &[
                "AWSManagedRulesKnownBadInputsRuleSet",
                "AWSManagedRulesSQLiRuleSet",
                "AWSManagedRulesAmazonIpReputationList",
            ],
            ComplianceFramework::FedrampHigh => &[
                "AWSManagedRulesKnownBadInputsRuleSet",
                "AWSManagedRulesSQLiRuleSet",
                "AWSManagedRulesAmazonIpReputationList",
                "AWSManagedRulesAnonymousIpList",
            ],
        }
    }
}

impl ComponentType for WafWebAcl {
    fn type_name(&self) -> &'static str {
        "waf-web-acl"
    }

    fn config_schema(&self) -> Value {
        json!({
            "type": "object",
            "additionalProperties": false,
            "required": ["scope", "defaultAction", "managedRuleGroups"],
            "properties": {
                "scope": { "enum": ["REGIONAL", "CLOUDFRONT"] },
                "defaultAction": { "enum": ["allow", "block"] },
                "managedRuleGroups": {
                    "type": "array",
                    "items": { "type": "string", "minLength": 1 },
                    "uniqueItems": true
                },
                "rateLimit": { "type": "integer", "minimum": 100 },
                "logging": { "type": "boolean" },
                "tags": tags_schema()
            }
        })
    }

    fn hardcoded_fallback(&self) -> Value {
        json!({
            "scope": "REGIONAL",
            "defaultAction": "allow",
            "managedRuleGroups": [BASELINE_RULE_GROUP],
            "rateLimit": 2000,
            "logging": false
        })
    }

    fn platform_defaults(&self) -> Value {
        json!({
            "rateLimit": 1000,
            "tags": platform_tags(self.type_name())
        })
    }

    fn framework_defaults(&self, framework: ComplianceFramework, prior: &Value) -> Value {
        let additions = Self::framework_rule_groups(framework);
        if additions.is_empty() {
            return json!({});
        }

        let mut groups: Vec<Value> = prior
            .get("managedRuleGroups")
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default();
        for group in additions {
            let group = Value::String((*group).to_owned());
            if !groups.contains(&group) {
                groups.push(group);
            }
        }

        json!({
            "managedRuleGroups": groups,
            "logging": true,
            "tags": compliance_tags(framework)
        })
    }

    fn policy_overrides(&self, framework: ComplianceFramework, _merged: &Value) -> Value {
        if !framework.is_fedramp() {
            return json!({});
        }
        json!({ "defaultAction": "block", "logging": true })
    }
}
