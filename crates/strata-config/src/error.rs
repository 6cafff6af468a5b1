//! Configuration resolution error types.

use std::io;
use thiserror::Error;

use crate::merge::ConfigLayer;

/// Configuration resolution error type.
#[derive(Debug, Error)]
pub enum ConfigMergeError {
    /// The component's type is not registered.
    #[error("Component '{component}' has unknown type '{type_name}'")]
    UnknownComponentType {
        /// Component name.
        component: String,
        /// The unregistered type.
        type_name: String,
    },

    /// A layer produced something other than an object.
    #[error("Component '{component}': {layer} layer must be an object, found {found}")]
    InvalidLayer {
        /// Component name.
        component: String,
        /// Offending layer.
        layer: ConfigLayer,
        /// Kind of value found.
        found: &'static str,
    },

    /// A component override used a key in a reserved namespace.
    #[error(
        "Component '{component}' sets reserved key '{key}' at config.{path}: \
         keys starting with '{prefix}' are managed by the platform"
    )]
    ReservedKey {
        /// Component name.
        component: String,
        /// Dotted path of the key inside `config`.
        path: String,
        /// The offending key.
        key: String,
        /// The reserved prefix it starts with.
        prefix: &'static str,
    },

    /// Required fields are absent after all layers were merged.
    #[error("Component '{component}' is missing required field(s): {}", .fields.join(", "))]
    MissingRequired {
        /// Component name.
        component: String,
        /// Dotted paths of every missing field.
        fields: Vec<String>,
    },

    /// A component type's config schema does not compile.
    #[error("Component '{component}': config schema of type '{type_name}' is invalid: {reason}")]
    InvalidSchema {
        /// Component name.
        component: String,
        /// Component type.
        type_name: String,
        /// Compilation failure.
        reason: String,
    },

    /// The merged configuration does not satisfy its type's config schema.
    #[error(
        "Component '{component}' resolved to an invalid configuration: {}",
        .violations.join("; ")
    )]
    SchemaViolation {
        /// Component name.
        component: String,
        /// `path: message` for every violation, paths dotted from `config`.
        violations: Vec<String>,
    },

    /// Failed to read a platform-defaults file.
    #[error("Failed to read platform defaults at {path}: {source}")]
    ReadError {
        /// Path to the file.
        path: String,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// Failed to parse a platform-defaults file.
    #[error("Failed to parse platform defaults at {path}: {source}")]
    ParseError {
        /// Path to the file.
        path: String,
        /// Underlying YAML error.
        #[source]
        source: serde_yaml::Error,
    },

    /// Platform-defaults file is well-formed YAML but has the wrong shape.
    #[error("Validation error in field '{field}': {message}")]
    ValidationError {
        /// Field that failed validation.
        field: String,
        /// Validation failure description.
        message: String,
    },
}

/// Result type for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigMergeError>;
