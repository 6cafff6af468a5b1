//! Prelude module - commonly used types for convenient import.
//!
//! Use `use strata_capabilities::prelude::*;` to import all essential types.

pub use crate::{
    BinderRegistry, BindingCompatibility, BindingContext, BindingError, BindingResult,
    BindingStrategy, CapabilityBindingResult, GrantedAccess,
};
