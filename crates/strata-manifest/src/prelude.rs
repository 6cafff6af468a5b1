//! Prelude module - commonly used types for convenient import.
//!
//! Use `use strata_manifest::prelude::*;` to import all essential types.

// Errors
pub use crate::{ManifestError, ManifestResult, ParseError, SchemaValidationError, Stage};

// Pipeline
pub use crate::{ManifestPipeline, PlannedManifest, ValidatedManifest, Warning};

// Schema
pub use crate::{MasterSchema, SchemaComposer};
