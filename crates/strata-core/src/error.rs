//! Component registry error types.

use thiserror::Error;

/// Errors raised while building a [`ComponentRegistry`](crate::ComponentRegistry).
#[derive(Debug, Error)]
pub enum RegistryError {
    /// A component type with the same name is already registered.
    #[error("component type already registered: {type_name}")]
    AlreadyRegistered {
        /// The duplicated type name.
        type_name: String,
    },

    /// The type name is not a valid identifier.
    #[error("invalid component type name '{type_name}': {reason}")]
    InvalidTypeName {
        /// The rejected type name.
        type_name: String,
        /// Why it was rejected.
        reason: String,
    },
}

/// Result type for registry operations.
pub type RegistryResult<T> = Result<T, RegistryError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = RegistryError::AlreadyRegistered {
            type_name: "lambda-api".to_string(),
        };
        assert_eq!(err.to_string(), "component type already registered: lambda-api");
    }
}
