//! Built-in binder strategies.
//!
//! Every function type can bind to every built-in capability:
//!
//! | Source                          | Capability    | Access                        |
//! |---------------------------------|---------------|-------------------------------|
//! | `lambda-api`, `lambda-worker`   | `db:postgres` | read, readwrite, admin        |
//! | `lambda-api`, `lambda-worker`   | `storage:s3`  | read, write, readwrite, admin |
//! | `lambda-api`, `lambda-worker`   | `queue:sqs`   | read, write, readwrite        |

use std::sync::Arc;

use serde_json::Value;
use strata_capabilities::{BinderRegistry, BindingContext, BindingResult};
use strata_core::AccessLevel;

mod postgres;
mod s3;
mod sqs;

pub use postgres::PostgresBinder;
pub use s3::S3Binder;
pub use sqs::SqsBinder;

/// Component types that can act as binding sources.
pub const FUNCTION_TYPES: &[&str] = &["lambda-api", "lambda-worker"];

/// Registry holding every built-in strategy.
///
/// # Errors
///
/// Returns an error if two built-in strategies share a key.
pub fn builtin_binders() -> BindingResult<BinderRegistry> {
    let mut registry = BinderRegistry::new();
    for &source_type in FUNCTION_TYPES {
        registry.register(Arc::new(PostgresBinder::new(source_type)))?;
        registry.register(Arc::new(S3Binder::new(source_type)))?;
        registry.register(Arc::new(SqsBinder::new(source_type)))?;
    }
    Ok(registry)
}

/// Least-privilege action set for `level`. `Admin` gets `admin` alone; the
/// other levels combine the read and write sets they grant.
pub(crate) fn actions_for(
    level: AccessLevel,
    read: &[&'static str],
    write: &[&'static str],
    admin: &[&'static str],
) -> Vec<&'static str> {
    if level == AccessLevel::Admin {
        return admin.to_vec();
    }
    let mut actions = Vec::new();
    if level.can_read() {
        actions.extend_from_slice(read);
    }
    if level.can_write() {
        actions.extend_from_slice(write);
    }
    actions
}

/// A boolean field of the target's capability data; absent means `false`.
pub(crate) fn data_flag(ctx: &BindingContext<'_>, field: &str) -> bool {
    ctx.capability_data
        .get(field)
        .and_then(Value::as_bool)
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::{DB_POSTGRES, QUEUE_SQS, STORAGE_S3};

    #[test]
    fn test_builtin_matrix() {
        let registry = builtin_binders().unwrap();
        assert_eq!(registry.len(), 6);
        for source in FUNCTION_TYPES {
            assert_eq!(
                registry.capabilities_for(source),
                vec![DB_POSTGRES, QUEUE_SQS, STORAGE_S3]
            );
        }
        assert!(registry.capabilities_for("rds-postgres").is_empty());
    }

    #[test]
    fn test_actions_for() {
        let read = ["r"];
        let write = ["w"];
        let admin = ["*"];
        assert_eq!(actions_for(AccessLevel::Read, &read, &write, &admin), vec!["r"]);
        assert_eq!(actions_for(AccessLevel::Write, &read, &write, &admin), vec!["w"]);
        assert_eq!(
            actions_for(AccessLevel::ReadWrite, &read, &write, &admin),
            vec!["r", "w"]
        );
        assert_eq!(actions_for(AccessLevel::Admin, &read, &write, &admin), vec!["*"]);
    }
}
