use strata_capabilities::{
    BindingContext, BindingResult, BindingStrategy, CapabilityBindingResult,
};
use strata_core::{AccessLevel, ComplianceFramework};

use super::{actions_for, data_flag};
use crate::components::DB_POSTGRES;

const READ: &[&str] = &["db:SELECT"];
const WRITE: &[&str] = &["db:INSERT", "db:UPDATE", "db:DELETE"];
const ADMIN: &[&str] = &["db:ALL_PRIVILEGES"];

/// Grants a function access to a `PostgreSQL` database.
///
/// Credentials come from IAM database authentication when the target enables
/// it, otherwise from the instance's managed secret.
#[derive(Debug, Clone, Copy)]
pub struct PostgresBinder {
    source_type: &'static str,
}

impl PostgresBinder {
    /// Strategy for `source_type` components.
    #[must_use]
    pub fn new(source_type: &'static str) -> Self {
        Self { source_type }
    }
}

impl BindingStrategy for PostgresBinder {
    fn source_type(&self) -> &'static str {
        self.source_type
    }

    fn capability(&self) -> &'static str {
        DB_POSTGRES
    }

    fn supported_access(&self) -> &'static [AccessLevel] {
        &[AccessLevel::Read, AccessLevel::ReadWrite, AccessLevel::Admin]
    }

    fn bind(&self, ctx: &BindingContext<'_>) -> BindingResult<CapabilityBindingResult> {
        let iam_auth = data_flag(ctx, "iamAuthentication");

        let mut actions = actions_for(ctx.access(), READ, WRITE, ADMIN);
        actions.push(if iam_auth {
            "rds-db:connect"
        } else {
            "secretsmanager:GetSecretValue"
        });

        let mut result =
            CapabilityBindingResult::grant(ctx.access(), &actions, ctx.data_str("resourceArn")?)
                .env(ctx, "DB_HOST", ctx.data_str("host")?)?
                .env(ctx, "DB_PORT", ctx.data_str("port")?)?
                .env(ctx, "DB_NAME", ctx.data_str("databaseName")?)?
                .env(ctx, "DB_USER", ctx.source_name.replace('-', "_"))?;

        result = if iam_auth {
            result.env(ctx, "DB_IAM_AUTH", "true")?
        } else {
            result.env(ctx, "DB_SECRET_ARN", ctx.data_str("secretArn")?)?
        };

        if ctx.framework.is_fedramp() {
            result = result.harden("tls:verify-full");
        }
        if ctx.framework == ComplianceFramework::FedrampHigh {
            result = result.harden("audit:pgaudit-all");
        }
        Ok(result)
    }
}
