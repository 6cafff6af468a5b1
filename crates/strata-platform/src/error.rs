//! Platform error types.

use strata_capabilities::BindingError;
use strata_config::ConfigMergeError;
use strata_core::RegistryError;
use strata_manifest::ManifestError;
use thiserror::Error;

/// Errors surfaced by the [`Platform`](crate::Platform) bundle.
#[derive(Debug, Error)]
pub enum PlatformError {
    /// A component type could not be registered.
    #[error(transparent)]
    Registry(#[from] RegistryError),

    /// The manifest pipeline failed.
    #[error(transparent)]
    Manifest(#[from] ManifestError),

    /// Configuration precedence resolution failed.
    #[error(transparent)]
    Config(#[from] ConfigMergeError),

    /// A binder strategy could not be registered.
    #[error(transparent)]
    Strategy(#[from] BindingError),

    /// A declared binding could not be bound.
    #[error("Binding {path} failed: {source}")]
    Binding {
        /// `components[i].binds[j]`.
        path: String,
        /// Underlying binding error.
        #[source]
        source: BindingError,
    },

    /// A binding targets a component with no resolved configuration.
    #[error("Binding {path} targets '{component}', which has no resolved configuration")]
    Unresolved {
        /// `components[i].binds[j]`.
        path: String,
        /// Target component name.
        component: String,
    },
}

/// Result type for platform operations.
pub type PlatformResult<T> = Result<T, PlatformError>;
