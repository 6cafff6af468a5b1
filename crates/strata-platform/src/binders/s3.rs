use strata_capabilities::{
    BindingContext, BindingResult, BindingStrategy, CapabilityBindingResult,
};
use strata_core::ComplianceFramework;

use super::{actions_for, data_flag};
use crate::components::STORAGE_S3;

const READ: &[&str] = &["s3:GetObject", "s3:ListBucket"];
const WRITE: &[&str] = &["s3:PutObject", "s3:AbortMultipartUpload"];
const ADMIN: &[&str] = &["s3:*"];

/// Grants a function access to an object storage bucket.
#[derive(Debug, Clone, Copy)]
pub struct S3Binder {
    source_type: &'static str,
}

impl S3Binder {
    /// Strategy for `source_type` components.
    #[must_use]
    pub fn new(source_type: &'static str) -> Self {
        Self { source_type }
    }
}

impl BindingStrategy for S3Binder {
    fn source_type(&self) -> &'static str {
        self.source_type
    }

    fn capability(&self) -> &'static str {
        STORAGE_S3
    }

    fn bind(&self, ctx: &BindingContext<'_>) -> BindingResult<CapabilityBindingResult> {
        let access = ctx.access();
        let mut actions = actions_for(access, READ, WRITE, ADMIN);
        if access.can_write() && ctx.option_bool("allowDelete", access.can_read()) {
            actions.push("s3:DeleteObject");
        }
        if data_flag(ctx, "kms") {
            if access.can_read() {
                actions.push("kms:Decrypt");
            }
            if access.can_write() {
                actions.push("kms:GenerateDataKey");
            }
        }

        let mut result =
            CapabilityBindingResult::grant(access, &actions, ctx.data_str("bucketArn")?)
                .env(ctx, "BUCKET_NAME", ctx.data_str("bucketName")?)?;

        if ctx.framework.is_fedramp() {
            result = result.harden("s3:deny-insecure-transport");
        }
        if ctx.framework >= ComplianceFramework::FedrampModerate {
            result = result.harden("s3:object-level-audit-logging");
        }
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value, json};
    use strata_core::{AccessLevel, BindingDeclaration};

    fn bind(decl: &Value, kms: bool, framework: ComplianceFramework) -> CapabilityBindingResult {
        let decl: BindingDeclaration = serde_json::from_value(decl.clone()).unwrap();
        let data = json!({
            "bucketName": "orders-assets",
            "bucketArn": "${ref:assets.arn}",
            "kms": kms
        });
        let ctx = BindingContext {
            declaration: &decl,
            framework,
            source_name: "worker",
            source_type: "lambda-worker",
            target_name: "assets",
            capability: STORAGE_S3,
            capability_data: &data,
        };
        S3Binder::new("lambda-worker").bind(&ctx).unwrap()
    }

    #[test]
    fn test_read_only() {
        let result = bind(&json!({ "to": "assets" }), false, ComplianceFramework::Commercial);
        assert_eq!(result.granted_access.level, AccessLevel::Read);
        assert_eq!(result.granted_access.actions, vec!["s3:GetObject", "s3:ListBucket"]);
        assert_eq!(result.environment_variables["BUCKET_NAME"], "orders-assets");
        assert!(result.hardening_applied.is_empty());
    }

    #[test]
    fn test_write_only_cannot_delete_by_default() {
        let result = bind(
            &json!({ "to": "assets", "access": "write" }),
            true,
            ComplianceFramework::FedrampLow,
        );
        let actions = &result.granted_access.actions;
        assert!(actions.contains(&"s3:PutObject".to_owned()));
        assert!(actions.contains(&"kms:GenerateDataKey".to_owned()));
        assert!(!actions.contains(&"s3:DeleteObject".to_owned()));
        assert!(!actions.contains(&"kms:Decrypt".to_owned()));
        assert_eq!(result.hardening_applied, vec!["s3:deny-insecure-transport"]);
    }

    #[test]
    fn test_readwrite_deletes_unless_disabled() {
        let result = bind(
            &json!({ "to": "assets", "access": "readwrite" }),
            false,
            ComplianceFramework::FedrampModerate,
        );
        assert!(result.granted_access.actions.contains(&"s3:DeleteObject".to_owned()));
        assert_eq!(result.hardening_applied.len(), 2);

        let result = bind(
            &json!({ "to": "assets", "access": "readwrite", "options": { "allowDelete": false } }),
            false,
            ComplianceFramework::Commercial,
        );
        assert!(!result.granted_access.actions.contains(&"s3:DeleteObject".to_owned()));
    }
}
