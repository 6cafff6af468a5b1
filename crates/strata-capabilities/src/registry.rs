//! Binder strategy registry.
//!
//! Maps `(source type, capability)` to the strategy that binds it. Lookups
//! that miss return an explicit [`BindingError::NoStrategy`] carrying the
//! nearest capability the source type can bind to.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use tracing::{debug, info};

use crate::binding::{BindingContext, CapabilityBindingResult};
use crate::error::{BindingError, BindingResult};
use crate::strategy::BindingStrategy;

/// Minimum normalized similarity for a capability suggestion.
const SUGGESTION_THRESHOLD: f64 = 0.5;

/// Result of a dry-run compatibility check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BindingCompatibility {
    /// A strategy exists for the pair.
    Compatible,
    /// No strategy exists.
    Incompatible {
        /// Nearest capability the source type can bind to, if any is close.
        suggestion: Option<String>,
    },
}

impl BindingCompatibility {
    /// Whether the pair can be bound.
    #[must_use]
    pub fn is_compatible(&self) -> bool {
        matches!(self, Self::Compatible)
    }
}

/// Registry of binder strategies keyed by `(source type, capability)`.
#[derive(Clone, Default)]
pub struct BinderRegistry {
    strategies: BTreeMap<(String, String), Arc<dyn BindingStrategy>>,
}

impl fmt::Debug for BinderRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BinderRegistry")
            .field("strategies", &self.strategies.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl BinderRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a strategy under its own `(source_type, capability)` key.
    ///
    /// # Errors
    ///
    /// Returns [`BindingError::AlreadyRegistered`] if the key is taken.
    pub fn register(&mut self, strategy: Arc<dyn BindingStrategy>) -> BindingResult<()> {
        let key = (
            strategy.source_type().to_owned(),
            strategy.capability().to_owned(),
        );
        if self.strategies.contains_key(&key) {
            return Err(BindingError::AlreadyRegistered {
                source_type: key.0,
                capability: key.1,
            });
        }

        info!(
            source_type = %key.0,
            capability = %key.1,
            "Registered binder strategy"
        );
        self.strategies.insert(key, strategy);
        Ok(())
    }

    /// Builder-style [`register`](Self::register).
    ///
    /// # Errors
    ///
    /// See [`register`](Self::register).
    pub fn with(mut self, strategy: Arc<dyn BindingStrategy>) -> BindingResult<Self> {
        self.register(strategy)?;
        Ok(self)
    }

    /// The strategy for `(source_type, capability)`.
    ///
    /// # Errors
    ///
    /// Returns [`BindingError::NoStrategy`] with the nearest valid capability.
    pub fn resolve(
        &self,
        source_type: &str,
        capability: &str,
    ) -> BindingResult<&dyn BindingStrategy> {
        self.strategies
            .get(&(source_type.to_owned(), capability.to_owned()))
            .map(|s| &**s)
            .ok_or_else(|| BindingError::NoStrategy {
                source_type: source_type.to_owned(),
                capability: capability.to_owned(),
                suggestion: self.suggest(source_type, capability),
            })
    }

    /// Dry-run check whether `(source_type, capability)` can be bound.
    #[must_use]
    pub fn validate_binding(&self, source_type: &str, capability: &str) -> BindingCompatibility {
        match self.resolve(source_type, capability) {
            Ok(_) => BindingCompatibility::Compatible,
            Err(_) => BindingCompatibility::Incompatible {
                suggestion: self.suggest(source_type, capability),
            },
        }
    }

    /// Resolve the strategy for `ctx`, check the access level and bind.
    ///
    /// # Errors
    ///
    /// Returns [`BindingError::NoStrategy`], [`BindingError::UnsupportedAccess`],
    /// or whatever the strategy reports.
    pub fn bind(&self, ctx: &BindingContext<'_>) -> BindingResult<CapabilityBindingResult> {
        let strategy = self.resolve(ctx.source_type, ctx.capability)?;

        let supported = strategy.supported_access();
        if !supported.contains(&ctx.access()) {
            return Err(BindingError::UnsupportedAccess {
                source_type: ctx.source_type.to_owned(),
                capability: ctx.capability.to_owned(),
                access: ctx.access(),
                supported: supported.to_vec(),
            });
        }

        let result = strategy.bind(ctx)?;
        debug!(
            source = ctx.source_name,
            target = ctx.target_name,
            capability = ctx.capability,
            access = %ctx.access(),
            actions = result.granted_access.actions.len(),
            "bound capability"
        );
        Ok(result)
    }

    /// Capabilities `source_type` can bind to, sorted.
    #[must_use]
    pub fn capabilities_for(&self, source_type: &str) -> Vec<&str> {
        self.strategies
            .keys()
            .filter(|(source, _)| source == source_type)
            .map(|(_, capability)| capability.as_str())
            .collect()
    }

    /// Every registered `(source type, capability)` pair, sorted.
    pub fn keys(&self) -> impl Iterator<Item = (&str, &str)> {
        self.strategies
            .keys()
            .map(|(source, capability)| (source.as_str(), capability.as_str()))
    }

    /// Number of registered strategies.
    #[must_use]
    pub fn len(&self) -> usize {
        self.strategies.len()
    }

    /// Whether no strategies are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.strategies.is_empty()
    }

    /// Nearest capability the source type can bind to. Falls back to every
    /// registered capability when the source type has none.
    fn suggest(&self, source_type: &str, capability: &str) -> Option<String> {
        let mut candidates = self.capabilities_for(source_type);
        if candidates.is_empty() {
            candidates = self.strategies.keys().map(|(_, c)| c.as_str()).collect();
        }

        candidates
            .into_iter()
            .map(|c| (c, strsim::normalized_levenshtein(c, capability)))
            .filter(|(_, score)| *score >= SUGGESTION_THRESHOLD)
            .max_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(c, _)| c.to_owned())
    }
}
