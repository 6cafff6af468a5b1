//! Strata Telemetry - logging and run correlation for the Strata engine.
//!
//! This crate provides:
//! - Log subscriber setup that scopes verbosity to the engine crates
//! - A run context whose span correlates every event of one invocation
//!
//! # Example
//!
//! ```rust,no_run
//! use strata_telemetry::{LogConfig, LogFormat, RunContext, setup_logging};
//!
//! # fn main() -> Result<(), strata_telemetry::TelemetryError> {
//! let config = LogConfig::from_verbosity(2)
//!     .with_format(LogFormat::Json)
//!     .with_directive("strata_manifest=trace");
//!
//! setup_logging(&config)?;
//!
//! let run = RunContext::new("plan").with_environment("prod");
//! let span = run.span();
//! let _guard = span.enter();
//! tracing::info!("planning manifest");
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod prelude;

mod context;
mod error;
mod logging;

pub use context::RunContext;
pub use error::{TelemetryError, TelemetryResult};
pub use logging::{ENGINE_TARGETS, LogConfig, LogFormat, LogTarget, setup_logging};
