//! Strata Config - layered configuration precedence resolution.
//!
//! Resolves the final configuration of each component from five layers:
//!
//! 1. **Hardcoded fallback** - baseline compiled into the component type
//! 2. **Platform default** - built-in organization defaults, then the
//!    optional platform-defaults file ([`PlatformDefaults::load`])
//! 3. **Environment default** - compliance framework defaults
//! 4. **Component override** - the manifest `config` block
//! 5. **Policy override** - governance-mandated values
//!
//! Objects merge key by key; scalars and arrays replace. Tag keys under the
//! reserved `platform:`, `compliance:` and `governance:` namespaces are
//! rejected in layer 4, and every `required` field of the component type's
//! schema must be present after merging.
//!
//! Every leaf is annotated with the layer that set it, see
//! [`ResolvedComponentConfig::show`].

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod prelude;

pub mod defaults;
pub mod error;
pub mod merge;
pub mod resolver;
pub mod show;

pub use defaults::{MAX_DEFAULTS_FILE_SIZE, PlatformDefaults};
pub use error::{ConfigMergeError, ConfigResult};
pub use merge::{ConfigLayer, FieldSources};
pub use resolver::{ConfigPrecedenceResolver, ResolutionContext, ResolvedComponentConfig};
pub use show::ShowFormat;
