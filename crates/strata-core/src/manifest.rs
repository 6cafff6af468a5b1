//! Typed view of a service manifest.
//!
//! The validation pipeline works on untyped [`serde_json::Value`] trees so it
//! can report every violation with a field path. Once a manifest has passed
//! the pipeline, [`ServiceManifest::from_tree`] gives downstream consumers
//! (precedence resolution, capability binding) a typed model.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::types::{AccessLevel, ComplianceFramework};

/// Date format accepted for `expiresOn`.
pub const EXPIRY_DATE_FORMAT: &str = "%Y-%m-%d";

/// Root of a service manifest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceManifest {
    /// Service name.
    pub service: String,
    /// Owning team.
    pub owner: String,
    /// Active compliance framework.
    #[serde(default)]
    pub compliance_framework: ComplianceFramework,
    /// Per-environment defaults used during hydration.
    #[serde(default)]
    pub environments: BTreeMap<String, EnvironmentSpec>,
    /// Declared components, in manifest order.
    #[serde(default)]
    pub components: Vec<ComponentSpec>,
    /// Governance metadata.
    #[serde(default)]
    pub governance: GovernanceSpec,
}

impl ServiceManifest {
    /// Deserialize a typed manifest from a (validated) tree.
    ///
    /// # Errors
    ///
    /// Returns a [`serde_json::Error`] if the tree does not have the manifest
    /// shape.
    pub fn from_tree(tree: &Value) -> Result<Self, serde_json::Error> {
        Self::deserialize(tree)
    }

    /// Look up a component by name.
    #[must_use]
    pub fn component(&self, name: &str) -> Option<&ComponentSpec> {
        self.components.iter().find(|c| c.name == name)
    }
}

/// Environment block: `environments.<name>`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EnvironmentSpec {
    /// Values available to `${env:KEY}` interpolation.
    #[serde(default)]
    pub defaults: Map<String, Value>,
}

/// A single declared component.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentSpec {
    /// Unique component name.
    pub name: String,
    /// Component type; selects schema, fallbacks and binder strategies.
    #[serde(rename = "type")]
    pub component_type: String,
    /// Author-supplied configuration (the component override layer).
    #[serde(default = "empty_object")]
    pub config: Value,
    /// Outgoing bindings.
    #[serde(default)]
    pub binds: Vec<BindingDeclaration>,
}

/// A declared connection to another component's capability.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BindingDeclaration {
    /// Target component name.
    pub to: String,
    /// Capability key, e.g. `db:postgres`.
    #[serde(default)]
    pub capability: Option<String>,
    /// Requested access level.
    #[serde(default)]
    pub access: AccessLevel,
    /// Renames for injected environment variables (default name → new name).
    #[serde(default)]
    pub env: BTreeMap<String, String>,
    /// Strategy-specific options.
    #[serde(default)]
    pub options: Map<String, Value>,
}

impl BindingDeclaration {
    /// The injected variable name for `default_name`, honoring `env` renames.
    #[must_use]
    pub fn env_name<'a>(&'a self, default_name: &'a str) -> &'a str {
        self.env.get(default_name).map_or(default_name, String::as_str)
    }
}

/// `governance` block.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GovernanceSpec {
    /// Posture-rule suppressions.
    #[serde(default, rename = "cdkNag")]
    pub cdk_nag: CdkNagSpec,
}

/// `governance.cdkNag` block.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CdkNagSpec {
    /// Suppression records.
    #[serde(default)]
    pub suppress: Vec<SuppressionRecord>,
}

/// A time-bounded exception to a posture rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuppressionRecord {
    /// Rule identifier being suppressed.
    pub id: String,
    /// Why the exception exists.
    pub justification: String,
    /// Who is accountable for the exception.
    pub owner: String,
    /// Expiry date, `YYYY-MM-DD`.
    pub expires_on: String,
}

impl SuppressionRecord {
    /// Parse `expires_on` as a calendar date.
    #[must_use]
    pub fn expiry(&self) -> Option<NaiveDate> {
        parse_expiry(&self.expires_on)
    }
}

/// Parse an `expiresOn` value. Rejects impossible dates such as `2024-02-30`.
#[must_use]
pub fn parse_expiry(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), EXPIRY_DATE_FORMAT).ok()
}

fn empty_object() -> Value {
    Value::Object(Map::new())
}
