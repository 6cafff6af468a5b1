//! Strata Capabilities - binding components to each other's capabilities.
//!
//! A binding declares that one component uses a capability (such as
//! `db:postgres`) of another. A [`BindingStrategy`] registered for the
//! `(source type, capability)` pair turns the declaration into:
//!
//! - a least-privilege access grant for the requested level
//! - injected environment variables (renamable through `env`)
//! - hardening required by the compliance framework
//!
//! [`BinderRegistry::validate_binding`] performs a dry run and suggests the
//! nearest valid capability when no strategy matches.

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod prelude;

pub mod binding;
pub mod error;
pub mod registry;
pub mod strategy;

pub use binding::{BindingContext, CapabilityBindingResult, GrantedAccess};
pub use error::{BindingError, BindingResult};
pub use registry::{BinderRegistry, BindingCompatibility};
pub use strategy::BindingStrategy;
