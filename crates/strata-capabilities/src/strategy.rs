//! The binder strategy trait.

use strata_core::AccessLevel;

use crate::binding::{BindingContext, CapabilityBindingResult};
use crate::error::BindingResult;

/// Binds components of one source type to one capability.
///
/// Strategies are registered once in a [`BinderRegistry`](crate::BinderRegistry)
/// under their `(source_type, capability)` key and never change afterwards.
pub trait BindingStrategy: Send + Sync {
    /// Component type of the binding (source) component.
    fn source_type(&self) -> &'static str;

    /// Capability key this strategy binds to.
    fn capability(&self) -> &'static str;

    /// Access levels this strategy accepts. All of them by default.
    fn supported_access(&self) -> &'static [AccessLevel] {
        &AccessLevel::ALL
    }

    /// Compute the access grant, injected variables and hardening.
    ///
    /// Called only with an access level from
    /// [`supported_access`](Self::supported_access).
    ///
    /// # Errors
    ///
    /// Returns an error if the target's capability data is incomplete.
    fn bind(&self, ctx: &BindingContext<'_>) -> BindingResult<CapabilityBindingResult>;
}
