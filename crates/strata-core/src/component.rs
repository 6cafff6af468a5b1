//! Component type registry.
//!
//! A component type bundles everything the engine needs to know about one
//! kind of infrastructure component: its configuration schema, the layer
//! producers used by precedence resolution, and the capabilities it exposes
//! to bindings. The schema composer and the precedence resolver both consume
//! the registry, so adding a type never requires engine changes.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde_json::{Map, Value};
use tracing::debug;

use crate::error::{RegistryError, RegistryResult};
use crate::types::ComplianceFramework;

/// An empty configuration layer (`{}`).
#[must_use]
pub fn empty_layer() -> Value {
    Value::Object(Map::new())
}

/// One pluggable kind of component.
///
/// Only [`type_name`](Self::type_name), [`config_schema`](Self::config_schema)
/// and [`hardcoded_fallback`](Self::hardcoded_fallback) are mandatory; every
/// other layer defaults to empty.
pub trait ComponentType: Send + Sync {
    /// Discriminator used in the manifest `type` field.
    fn type_name(&self) -> &'static str;

    /// JSON-Schema document describing this type's `config` block.
    fn config_schema(&self) -> Value;

    /// Layer 1: a safe, self-contained baseline. Must not read external state.
    fn hardcoded_fallback(&self) -> Value;

    /// Layer 2: organization-wide defaults, independent of compliance framework.
    fn platform_defaults(&self) -> Value {
        empty_layer()
    }

    /// Layer 3: defaults for the active compliance framework.
    ///
    /// `prior` is the merge of layers 1–2. A producer that wants to extend an
    /// array rather than replace it must copy the prior contents into its own
    /// output; the resolver never concatenates.
    fn framework_defaults(&self, framework: ComplianceFramework, prior: &Value) -> Value {
        let _ = (framework, prior);
        empty_layer()
    }

    /// Layer 5: governance-mandated values the author cannot weaken.
    ///
    /// `merged` is the merge of layers 1–4.
    fn policy_overrides(&self, framework: ComplianceFramework, merged: &Value) -> Value {
        let _ = (framework, merged);
        empty_layer()
    }

    /// Capability keys this type exposes as a binding target.
    fn provided_capabilities(&self) -> &'static [&'static str] {
        &[]
    }

    /// Capability data a binding to `capability` may reference, derived from
    /// this component's resolved configuration. `None` when the type does not
    /// provide the capability.
    fn capability_data(
        &self,
        capability: &str,
        component_name: &str,
        config: &Value,
    ) -> Option<Value> {
        let _ = (capability, component_name, config);
        None
    }
}

/// Registry mapping a type name to its [`ComponentType`].
///
/// Built once at process start, then shared read-only.
#[derive(Clone, Default)]
pub struct ComponentRegistry {
    types: BTreeMap<String, Arc<dyn ComponentType>>,
}

impl ComponentRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a component type.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::AlreadyRegistered`] if the name is taken, or
    /// [`RegistryError::InvalidTypeName`] if it is not a lowercase identifier.
    pub fn register(&mut self, component_type: Arc<dyn ComponentType>) -> RegistryResult<()> {
        let name = component_type.type_name();
        validate_type_name(name)?;
        if self.types.contains_key(name) {
            return Err(RegistryError::AlreadyRegistered {
                type_name: name.to_owned(),
            });
        }

        debug!(component_type = name, "registered component type");
        self.types.insert(name.to_owned(), component_type);
        Ok(())
    }

    /// Builder-style [`register`](Self::register).
    ///
    /// # Errors
    ///
    /// See [`register`](Self::register).
    pub fn with(mut self, component_type: Arc<dyn ComponentType>) -> RegistryResult<Self> {
        self.register(component_type)?;
        Ok(self)
    }

    /// Look up a type by name.
    #[must_use]
    pub fn get(&self, type_name: &str) -> Option<&Arc<dyn ComponentType>> {
        self.types.get(type_name)
    }

    /// Whether `type_name` is registered.
    #[must_use]
    pub fn contains(&self, type_name: &str) -> bool {
        self.types.contains_key(type_name)
    }

    /// Registered types in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Arc<dyn ComponentType>)> {
        self.types.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Registered type names in name order.
    #[must_use]
    pub fn type_names(&self) -> Vec<&str> {
        self.types.keys().map(String::as_str).collect()
    }

    /// Types that expose `capability`.
    #[must_use]
    pub fn providers_of(&self, capability: &str) -> Vec<&str> {
        self.types
            .iter()
            .filter(|(_, t)| t.provided_capabilities().contains(&capability))
            .map(|(k, _)| k.as_str())
            .collect()
    }

    /// Number of registered types.
    #[must_use]
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Whether no types are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

impl std::fmt::Debug for ComponentRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ComponentRegistry")
            .field("types", &self.type_names())
            .finish()
    }
}

fn validate_type_name(name: &str) -> RegistryResult<()> {
    let valid_start = name.chars().next().is_some_and(|c| c.is_ascii_lowercase());
    let valid_rest = name
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-');
    if valid_start && valid_rest {
        Ok(())
    } else {
        Err(RegistryError::InvalidTypeName {
            type_name: name.to_owned(),
            reason: "must start with a lowercase letter and contain only [a-z0-9-]".to_owned(),
        })
    }
}
