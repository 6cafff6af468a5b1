//! Prelude module - commonly used types for convenient import.
//!
//! Use `use strata_platform::prelude::*;` to import all essential types.

pub use crate::{
    Platform, PlatformError, PlatformResult, Resolution, ResolvedBinding, builtin_binders,
    builtin_registry,
};
