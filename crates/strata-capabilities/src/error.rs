//! Capability binding error types.

use strata_core::AccessLevel;
use thiserror::Error;

/// Errors that can occur while binding a component to a capability.
#[derive(Debug, Error)]
pub enum BindingError {
    /// No strategy handles this (source type, capability) pair.
    #[error(
        "no binder strategy for '{source_type}' -> '{capability}'{}",
        .suggestion.as_ref().map(|s| format!(" (did you mean '{s}'?)")).unwrap_or_default()
    )]
    NoStrategy {
        /// Type of the binding component.
        source_type: String,
        /// Requested capability.
        capability: String,
        /// Nearest capability the source type can bind to.
        suggestion: Option<String>,
    },

    /// A strategy exists but does not support the requested access level.
    #[error(
        "'{source_type}' -> '{capability}' does not support {access} access (supported: {})",
        .supported.iter().map(|a| a.as_str()).collect::<Vec<_>>().join(", ")
    )]
    UnsupportedAccess {
        /// Type of the binding component.
        source_type: String,
        /// Requested capability.
        capability: String,
        /// Requested access level.
        access: AccessLevel,
        /// Access levels the strategy accepts.
        supported: Vec<AccessLevel>,
    },

    /// The binding names no capability and the target offers several.
    #[error("binding to '{target}' must name a capability; it provides: {}", .available.join(", "))]
    AmbiguousCapability {
        /// Target component name.
        target: String,
        /// Capabilities the target provides.
        available: Vec<String>,
    },

    /// The target does not provide the requested capability.
    #[error("component '{target}' does not provide capability '{capability}'")]
    CapabilityNotProvided {
        /// Target component name.
        target: String,
        /// Requested capability.
        capability: String,
    },

    /// The target's capability data lacks a field the strategy needs.
    #[error("capability data of '{target}' for '{capability}' is missing '{field}'")]
    MissingCapabilityData {
        /// Target component name.
        target: String,
        /// Capability key.
        capability: String,
        /// Missing field.
        field: String,
    },

    /// Two injected variables end up with the same name after `env` renames.
    #[error("binding to '{target}' injects '{name}' more than once; rename one of them under env")]
    EnvNameCollision {
        /// Target component name.
        target: String,
        /// The colliding variable name.
        name: String,
    },

    /// A strategy for this pair is already registered.
    #[error("binder strategy already registered for '{source_type}' -> '{capability}'")]
    AlreadyRegistered {
        /// Type of the binding component.
        source_type: String,
        /// Capability key.
        capability: String,
    },
}

/// Result type for binding operations.
pub type BindingResult<T> = Result<T, BindingError>;
