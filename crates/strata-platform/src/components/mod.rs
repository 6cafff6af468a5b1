//! Built-in component types.
//!
//! | Type            | Provides      |
//! |-----------------|---------------|
//! | `lambda-api`    |               |
//! | `lambda-worker` |               |
//! | `rds-postgres`  | `db:postgres` |
//! | `s3-bucket`     | `storage:s3`  |
//! | `sqs-queue`     | `queue:sqs`   |
//! | `waf-web-acl`   |               |

use std::sync::Arc;

use serde_json::{Value, json};
use strata_core::{ComplianceFramework, ComponentRegistry, RegistryResult};

mod lambda;
mod rds;
mod s3;
mod sqs;
mod waf;

pub use lambda::{LambdaApi, LambdaWorker};
pub use rds::RdsPostgres;
pub use s3::S3Bucket;
pub use sqs::SqsQueue;
pub use waf::WafWebAcl;

/// Capability key provided by `rds-postgres`.
pub const DB_POSTGRES: &str = "db:postgres";
/// Capability key provided by `s3-bucket`.
pub const STORAGE_S3: &str = "storage:s3";
/// Capability key provided by `sqs-queue`.
pub const QUEUE_SQS: &str = "queue:sqs";

/// Registry holding every built-in component type.
///
/// # Errors
///
/// Returns a registry error if two built-in types share a name.
pub fn builtin_registry() -> RegistryResult<ComponentRegistry> {
    ComponentRegistry::new()
        .with(Arc::new(LambdaApi))?
        .with(Arc::new(LambdaWorker))?
        .with(Arc::new(RdsPostgres))?
        .with(Arc::new(S3Bucket))?
        .with(Arc::new(SqsQueue))?
        .with(Arc::new(WafWebAcl))
}

/// Schema for a free-form string tag map.
pub(crate) fn tags_schema() -> Value {
    json!({
        "type": "object",
        "additionalProperties": { "type": "string" }
    })
}

/// Deploy-time reference to an attribute of a component's resource.
pub(crate) fn reference(component: &str, attribute: &str) -> String {
    format!("${{ref:{component}.{attribute}}}")
}

/// Tags every platform layer stamps on its resources.
pub(crate) fn platform_tags(type_name: &str) -> Value {
    json!({
        "platform:managed-by": "strata",
        "platform:component-type": type_name
    })
}

/// Tags the framework layer stamps on its resources.
pub(crate) fn compliance_tags(framework: ComplianceFramework) -> Value {
    json!({ "compliance:framework": framework.as_str() })
}

/// `max(current, floor)` for an integer field, so policy can raise but never
/// lower an author's stricter value.
pub(crate) fn at_least(merged: &Value, field: &str, floor: i64) -> i64 {
    merged
        .get(field)
        .and_then(Value::as_i64)
        .map_or(floor, |current| current.max(floor))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_registry() {
        let registry = builtin_registry().unwrap();
        assert_eq!(
            registry.type_names(),
            vec![
                "lambda-api",
                "lambda-worker",
                "rds-postgres",
                "s3-bucket",
                "sqs-queue",
                "waf-web-acl"
            ]
        );
        assert_eq!(registry.providers_of(DB_POSTGRES), vec!["rds-postgres"]);
    }

    #[test]
    fn test_reference() {
        assert_eq!(reference("db", "endpoint"), "${ref:db.endpoint}");
    }

    #[test]
    fn test_at_least() {
        let merged = json!({ "days": 400, "low": 3 });
        assert_eq!(at_least(&merged, "days", 365), 400);
        assert_eq!(at_least(&merged, "low", 30), 30);
        assert_eq!(at_least(&merged, "missing", 7), 7);
    }

    #[test]
    fn test_every_fallback_satisfies_its_schema() {
        let registry = builtin_registry().unwrap();
        for (name, ty) in registry.iter() {
            let validator = jsonschema::validator_for(&ty.config_schema()).unwrap();
            assert!(
                validator.is_valid(&ty.hardcoded_fallback()),
                "fallback of {name} does not satisfy its schema"
            );
        }
    }
}
