//! Strata Platform - the built-in component catalogue wired to the engine.
//!
//! [`Platform`] bundles a component registry, the binder strategies, the
//! manifest pipeline and the precedence resolver:
//!
//! ```text
//! manifest ─► validate ─► plan(env) ─► resolve_components ─► resolve_bindings
//! ```
//!
//! The built-in catalogue ([`components`]) covers API and worker functions,
//! a `PostgreSQL` database, a bucket, a queue and a web ACL. Both function
//! types can bind to every capability the catalogue provides ([`binders`]).
//!
//! # Example
//!
//! ```
//! use strata_config::PlatformDefaults;
//! use strata_platform::Platform;
//!
//! let manifest = r#"
//! service: orders
//! owner: team-a
//! components:
//!   - name: jobs
//!     type: sqs-queue
//!   - name: worker
//!     type: lambda-worker
//!     config:
//!       handler: worker.handler
//!     binds:
//!       - to: jobs
//! "#;
//!
//! let platform = Platform::builtin().unwrap();
//! let resolution = platform
//!     .resolve_str("<inline>", manifest, "dev", &PlatformDefaults::empty())
//!     .unwrap();
//! assert_eq!(resolution.bindings[0].capability, "queue:sqs");
//! assert!(resolution.bindings[0]
//!     .result
//!     .environment_variables
//!     .contains_key("QUEUE_URL"));
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod prelude;

pub mod binders;
pub mod components;
pub mod error;
pub mod platform;

pub use binders::builtin_binders;
pub use components::builtin_registry;
pub use error::{PlatformError, PlatformResult};
pub use platform::{Platform, Resolution, ResolvedBinding};
