//! Prelude module - commonly used types for convenient import.
//!
//! Use `use strata_telemetry::prelude::*;` to import all essential types.

pub use crate::{LogConfig, LogFormat, LogTarget, RunContext, TelemetryError, TelemetryResult};

pub use crate::setup_logging;
