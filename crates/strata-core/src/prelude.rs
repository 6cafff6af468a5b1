//! Prelude module - commonly used types for convenient import.
//!
//! Use `use strata_core::prelude::*;` to import all essential types.

// Errors
pub use crate::{RegistryError, RegistryResult};

// Enums
pub use crate::{AccessLevel, ComplianceFramework};

// Manifest model
pub use crate::{
    BindingDeclaration, ComponentSpec, EnvironmentSpec, GovernanceSpec, ServiceManifest,
    SuppressionRecord,
};

// Component registry
pub use crate::{ComponentRegistry, ComponentType};
