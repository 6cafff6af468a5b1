//! Strata Manifest - from manifest text to a validated, environment-bound tree.
//!
//! The pipeline runs four strictly ordered stages:
//!
//! 1. **Parse** - YAML text to a JSON tree ([`parser`])
//! 2. **Schema** - validate against the master schema composed from every
//!    registered component type ([`composer`], [`validator`])
//! 3. **Hydrate** - apply environment defaults and interpolation ([`hydrator`])
//! 4. **References** - check bindings and suppression records ([`references`])
//!
//! [`ManifestPipeline::validate`] runs stages 1-2 and
//! [`ManifestPipeline::plan`] runs all four.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use strata_core::ComponentRegistry;
//! use strata_manifest::ManifestPipeline;
//!
//! let pipeline = ManifestPipeline::new(Arc::new(ComponentRegistry::new()));
//! let planned = pipeline
//!     .plan_str("<inline>", "service: orders\nowner: team-a\n", "dev")
//!     .unwrap();
//! assert_eq!(planned.resolved_manifest["complianceFramework"], "commercial");
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod prelude;

pub mod composer;
pub mod error;
pub mod hydrator;
pub mod parser;
pub mod pipeline;
pub mod references;
pub mod validator;
pub mod warning;

pub use composer::{MasterSchema, SchemaComposer, compose_master_schema};
pub use error::{
    ManifestError, ManifestResult, ParseError, SchemaValidationError, SchemaViolation, Stage,
    Violation,
};
pub use hydrator::{HydratedTree, hydrate};
pub use parser::{MAX_MANIFEST_SIZE, parse, parse_str};
pub use pipeline::{ManifestPipeline, PlannedManifest, ValidatedManifest};
pub use references::{ReferenceValidator, validate_references};
pub use warning::Warning;
