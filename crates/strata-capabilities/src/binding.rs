//! Binding inputs and outputs.

use std::collections::BTreeMap;
use std::collections::btree_map::Entry;

use serde::Serialize;
use serde_json::Value;
use strata_core::{AccessLevel, BindingDeclaration, ComplianceFramework};

use crate::error::{BindingError, BindingResult};

/// Everything a strategy needs to bind one declaration.
#[derive(Debug, Clone, Copy)]
pub struct BindingContext<'a> {
    /// The declaration being bound.
    pub declaration: &'a BindingDeclaration,
    /// Active compliance framework.
    pub framework: ComplianceFramework,
    /// Name of the component declaring the binding.
    pub source_name: &'a str,
    /// Type of the component declaring the binding.
    pub source_type: &'a str,
    /// Name of the target component.
    pub target_name: &'a str,
    /// Capability being bound.
    pub capability: &'a str,
    /// Data the target exposes for this capability.
    pub capability_data: &'a Value,
}

impl BindingContext<'_> {
    /// The requested access level.
    #[must_use]
    pub fn access(&self) -> AccessLevel {
        self.declaration.access
    }

    /// Injected variable name for `default_name`, honoring `env` renames.
    #[must_use]
    pub fn env_name<'n>(&'n self, default_name: &'n str) -> &'n str {
        self.declaration.env_name(default_name)
    }

    /// A required string field of the target's capability data.
    ///
    /// # Errors
    ///
    /// Returns [`BindingError::MissingCapabilityData`] if the field is absent
    /// or not a string.
    pub fn data_str(&self, field: &str) -> BindingResult<&str> {
        self.capability_data
            .get(field)
            .and_then(Value::as_str)
            .ok_or_else(|| BindingError::MissingCapabilityData {
                target: self.target_name.to_owned(),
                capability: self.capability.to_owned(),
                field: field.to_owned(),
            })
    }

    /// A boolean strategy option, falling back to `default`.
    #[must_use]
    pub fn option_bool(&self, name: &str, default: bool) -> bool {
        self.declaration
            .options
            .get(name)
            .and_then(Value::as_bool)
            .unwrap_or(default)
    }
}

/// Access granted by a binding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GrantedAccess {
    /// Level requested by the declaration.
    pub level: AccessLevel,
    /// Least-privilege actions for that level, sorted.
    pub actions: Vec<String>,
    /// Resource the actions apply to.
    pub resource: String,
}

/// Outcome of binding one declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CapabilityBindingResult {
    /// Access granted to the source component.
    pub granted_access: GrantedAccess,
    /// Variables injected into the source component (name → reference).
    pub environment_variables: BTreeMap<String, String>,
    /// Hardening applied because of the compliance framework.
    pub hardening_applied: Vec<String>,
}

impl CapabilityBindingResult {
    /// Start a result granting `actions` on `resource` at `level`.
    #[must_use]
    pub fn grant(level: AccessLevel, actions: &[&str], resource: impl Into<String>) -> Self {
        let mut actions: Vec<String> = actions.iter().map(|a| (*a).to_owned()).collect();
        actions.sort();
        actions.dedup();
        Self {
            granted_access: GrantedAccess {
                level,
                actions,
                resource: resource.into(),
            },
            environment_variables: BTreeMap::new(),
            hardening_applied: Vec::new(),
        }
    }

    /// Inject a variable under the declaration's name for `default_name`.
    ///
    /// # Errors
    ///
    /// Returns [`BindingError::EnvNameCollision`] if a variable of that name
    /// was already injected, e.g. because `env` renamed one default name onto
    /// another.
    pub fn env(
        mut self,
        ctx: &BindingContext<'_>,
        default_name: &str,
        value: impl Into<String>,
    ) -> BindingResult<Self> {
        let name = ctx.env_name(default_name);
        let Entry::Vacant(slot) = self.environment_variables.entry(name.to_owned()) else {
            return Err(BindingError::EnvNameCollision {
                target: ctx.target_name.to_owned(),
                name: name.to_owned(),
            });
        };
        slot.insert(value.into());
        Ok(self)
    }

    /// Record a hardening action.
    #[must_use]
    pub fn harden(mut self, action: impl Into<String>) -> Self {
        self.hardening_applied.push(action.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn declaration() -> BindingDeclaration {
        serde_json::from_value(json!({
            "to": "db",
            "capability": "db:postgres",
            "access": "readwrite",
            "env": { "DB_HOST": "ORDERS_DB_HOST" },
            "options": { "iamAuth": true }
        }))
        .unwrap()
    }

    #[test]
    fn test_context_helpers() {
        let decl = declaration();
        let data = json!({ "host": "orders-db.internal", "port": 5432 });
        let ctx = BindingContext {
            declaration: &decl,
            framework: ComplianceFramework::Commercial,
            source_name: "api",
            source_type: "lambda-api",
            target_name: "db",
            capability: "db:postgres",
            capability_data: &data,
        };

        assert_eq!(ctx.access(), AccessLevel::ReadWrite);
        assert_eq!(ctx.data_str("host").unwrap(), "orders-db.internal");
        assert!(matches!(
            ctx.data_str("port"),
            Err(BindingError::MissingCapabilityData { .. })
        ));
        assert!(ctx.option_bool("iamAuth", false));
        assert!(!ctx.option_bool("other", false));

        let result = CapabilityBindingResult::grant(
            AccessLevel::ReadWrite,
            &["b:Write", "a:Read", "a:Read"],
            "arn:db",
        )
        .env(&ctx, "DB_HOST", "orders-db.internal")
        .unwrap()
        .env(&ctx, "DB_PORT", "5432")
        .unwrap()
        .harden("tls-required");

        assert_eq!(result.granted_access.actions, vec!["a:Read", "b:Write"]);
        assert_eq!(
            result.environment_variables.get("ORDERS_DB_HOST").map(String::as_str),
            Some("orders-db.internal")
        );
        assert!(result.environment_variables.contains_key("DB_PORT"));
        assert_eq!(result.hardening_applied, vec!["tls-required"]);
    }

    #[test]
    fn test_renamed_variable_cannot_shadow_another() {
        let decl: BindingDeclaration = serde_json::from_value(json!({
            "to": "db",
            "env": { "DB_HOST": "DB_PORT" }
        }))
        .unwrap();
        let data = json!({});
        let ctx = BindingContext {
            declaration: &decl,
            framework: ComplianceFramework::Commercial,
            source_name: "api",
            source_type: "lambda-api",
            target_name: "db",
            capability: "db:postgres",
            capability_data: &data,
        };

        let err = CapabilityBindingResult::grant(AccessLevel::Read, &[], "arn:db")
            .env(&ctx, "DB_HOST", "host")
            .unwrap()
            .env(&ctx, "DB_PORT", "5432")
            .unwrap_err();
        match err {
            BindingError::EnvNameCollision { target, name } => {
                assert_eq!(target, "db");
                assert_eq!(name, "DB_PORT");
            },
            other => panic!("unexpected error: {other}"),
        }
    }
}
