//! Strata Core - Foundation types shared by every Strata crate.
//!
//! This crate provides:
//! - Compliance framework and access level enums
//! - The typed service manifest model
//! - The [`ComponentType`] trait and the [`ComponentRegistry`] that maps a
//!   component type name to its schema and configuration layer producers
//! - Reserved tag namespaces
//! - Field path helpers used in error messages
//!
//! # Example
//!
//! ```
//! use strata_core::{ComplianceFramework, ComponentRegistry};
//!
//! let registry = ComponentRegistry::new();
//! assert!(registry.is_empty());
//! assert!(ComplianceFramework::FedrampHigh > ComplianceFramework::Commercial);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod prelude;

pub mod component;
pub mod error;
pub mod manifest;
pub mod path;
pub mod tags;
pub mod types;

pub use component::{ComponentRegistry, ComponentType, empty_layer};
pub use error::{RegistryError, RegistryResult};
pub use manifest::{
    BindingDeclaration, ComponentSpec, EnvironmentSpec, GovernanceSpec, ServiceManifest,
    SuppressionRecord,
};
pub use tags::{RESERVED_TAG_PREFIXES, reserved_prefix};
pub use types::{AccessLevel, ComplianceFramework, UnknownVariant};
