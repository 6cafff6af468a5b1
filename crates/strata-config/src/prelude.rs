//! Prelude module - commonly used types for convenient import.
//!
//! Use `use strata_config::prelude::*;` to import all essential types.

pub use crate::{
    ConfigLayer, ConfigMergeError, ConfigPrecedenceResolver, ConfigResult, FieldSources,
    PlatformDefaults, ResolutionContext, ResolvedComponentConfig, ShowFormat,
};
