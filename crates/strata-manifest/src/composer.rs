//! Master schema composition.
//!
//! Each registered component type contributes its `config` schema under
//! `$defs["component.<type>.config"]`. The base manifest schema dispatches
//! on every component's `type` field with `if`/`then` branches, so the
//! `config` block is checked against the schema of its own type. Types that
//! are not registered pass schema validation with an unconstrained `config`.
//!
//! The manifest `config` block is only one of five precedence layers, so
//! fragments are registered without their `required` lists. Required fields
//! are enforced after every layer has been merged.
//!
//! Validation runs before hydration, so every property in a registered
//! fragment also accepts an environment-keyed map of that property
//! (`{ dev: 512, prod: 2048 }`), and boolean properties accept an
//! `${envIs:NAME}` token. Type schemas themselves describe the hydrated
//! shape only; the resolver checks merged configs against them unchanged.
//!
//! The compiled validator is built once per composed schema and reused for
//! every manifest.

use std::sync::{Arc, OnceLock};

use jsonschema::{Draft, Validator};
use serde_json::{Map, Value, json};
use strata_core::{AccessLevel, ComplianceFramework, ComponentRegistry};
use tracing::debug;

use crate::error::{ManifestError, ManifestResult};

/// Pattern every component name must match.
pub const COMPONENT_NAME_PATTERN: &str = "^[a-z][a-z0-9-]*$";

/// Pattern every capability key must match (`family:kind`).
pub const CAPABILITY_PATTERN: &str = "^[a-z0-9-]+:[a-z0-9-]+$";

/// Namespace key for a component type's config schema.
#[must_use]
pub fn config_definition_key(type_name: &str) -> String {
    format!("component.{type_name}.config")
}

/// The composed master schema and its compiled validator.
pub struct MasterSchema {
    document: Value,
    validator: Validator,
}

impl MasterSchema {
    /// The composed JSON-Schema document.
    #[must_use]
    pub fn document(&self) -> &Value {
        &self.document
    }

    /// The compiled validator.
    #[must_use]
    pub fn validator(&self) -> &Validator {
        &self.validator
    }
}

impl std::fmt::Debug for MasterSchema {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MasterSchema")
            .field("document", &self.document)
            .finish_non_exhaustive()
    }
}

/// Compose the master schema from every registered component type.
///
/// Pure and idempotent: the same registry always yields the same document.
///
/// # Errors
///
/// Returns [`ManifestError::SchemaComposition`] naming the first type whose
/// fragment is not an object or does not compile, and
/// [`ManifestError::MasterSchema`] if the composed document fails to compile.
pub fn compose_master_schema(registry: &ComponentRegistry) -> ManifestResult<MasterSchema> {
    let mut defs = Map::new();
    defs.insert("component".to_owned(), component_schema());
    defs.insert("binding".to_owned(), binding_schema());

    let mut dispatch = Vec::with_capacity(registry.len());
    for (type_name, component_type) in registry.iter() {
        let fragment = component_type.config_schema();
        check_fragment(type_name, &fragment)?;

        let key = config_definition_key(type_name);
        let mut fragment = fragment;
        prepare_fragment(&mut fragment);
        dispatch.push(json!({
            "if": {
                "properties": { "type": { "const": type_name } },
                "required": ["type"]
            },
            "then": {
                "properties": { "config": { "$ref": format!("#/$defs/{key}") } }
            }
        }));
        defs.insert(key, fragment);
        debug!(component_type = type_name, "added config schema to master schema");
    }

    if let Some(Value::Object(component)) = defs.get_mut("component")
        && !dispatch.is_empty()
    {
        component.insert("allOf".to_owned(), Value::Array(dispatch));
    }

    let mut document = base_schema();
    if let Value::Object(root) = &mut document {
        root.insert("$defs".to_owned(), Value::Object(defs));
    }

    let validator = jsonschema::options()
        .with_draft(Draft::Draft202012)
        .build(&document)
        .map_err(|e| ManifestError::MasterSchema {
            reason: e.to_string(),
        })?;

    Ok(MasterSchema {
        document,
        validator,
    })
}

/// Reject a fragment that is not an object schema or does not compile.
fn check_fragment(type_name: &str, fragment: &Value) -> ManifestResult<()> {
    if !fragment.is_object() {
        return Err(ManifestError::SchemaComposition {
            type_name: type_name.to_owned(),
            reason: "schema must be a JSON object".to_owned(),
        });
    }

    jsonschema::options()
        .with_draft(Draft::Draft202012)
        .build(fragment)
        .map(|_| ())
        .map_err(|e| ManifestError::SchemaComposition {
            type_name: type_name.to_owned(),
            reason: e.to_string(),
        })
}

/// Pattern of a `${envIs:NAME}` token.
const ENV_IS_TOKEN_PATTERN: &str = r"^\$\{envIs:[^}]+\}$";

/// Relax a type's config schema for pre-hydration manifest input: drop
/// `required` lists and let every property be given per environment.
fn prepare_fragment(schema: &mut Value) {
    let Value::Object(map) = schema else {
        return;
    };
    if map.get("required").is_some_and(Value::is_array) {
        map.remove("required");
    }

    if let Some(Value::Object(properties)) = map.get_mut("properties") {
        for property in properties.values_mut() {
            prepare_fragment(property);
            let plain = std::mem::take(property);
            *property = per_environment(plain);
        }
    }
    for key in ["items", "additionalProperties"] {
        if let Some(child) = map.get_mut(key) {
            prepare_fragment(child);
        }
    }
    for key in ["anyOf", "oneOf", "allOf"] {
        if let Some(Value::Array(branches)) = map.get_mut(key) {
            branches.iter_mut().for_each(prepare_fragment);
        }
    }
}

/// `schema`, or a non-empty map of environment name to `schema`. Boolean
/// schemas also accept an `${envIs:NAME}` token.
fn per_environment(schema: Value) -> Value {
    let is_flag = schema.get("type").and_then(Value::as_str) == Some("boolean");
    let by_environment = json!({
        "type": "object",
        "minProperties": 1,
        "additionalProperties": schema.clone()
    });
    let mut variants = vec![schema, by_environment];
    if is_flag {
        variants.push(json!({ "type": "string", "pattern": ENV_IS_TOKEN_PATTERN }));
    }
    json!({ "anyOf": variants })
}

/// Manifest-level fields. `service` and `owner` are deliberately not listed
/// as `required` here; the validator reports them explicitly.
fn base_schema() -> Value {
    let frameworks: Vec<&str> = ComplianceFramework::ALL.iter().map(|f| f.as_str()).collect();
    json!({
        "$schema": "https://json-schema.org/draft/2020-12/schema",
        "title": "Strata service manifest",
        "type": "object",
        "properties": {
            "service": { "type": "string", "minLength": 1 },
            "owner": { "type": "string", "minLength": 1 },
            "complianceFramework": { "enum": frameworks },
            "environments": {
                "type": "object",
                "additionalProperties": {
                    "type": "object",
                    "properties": {
                        "defaults": { "type": "object" }
                    }
                }
            },
            "components": {
                "type": "array",
                "items": { "$ref": "#/$defs/component" }
            },
            "governance": {
                "type": "object",
                "properties": {
                    "cdkNag": {
                        "type": "object",
                        "properties": {
                            "suppress": {
                                "type": "array",
                                "items": { "type": "object" }
                            }
                        }
                    }
                }
            }
        }
    })
}

fn component_schema() -> Value {
    json!({
        "type": "object",
        "required": ["name", "type"],
        "properties": {
            "name": { "type": "string", "pattern": COMPONENT_NAME_PATTERN },
            "type": { "type": "string", "minLength": 1 },
            "config": { "type": "object" },
            "binds": {
                "type": "array",
                "items": { "$ref": "#/$defs/binding" }
            }
        }
    })
}

fn binding_schema() -> Value {
    let levels: Vec<&str> = AccessLevel::ALL.iter().map(|a| a.as_str()).collect();
    json!({
        "type": "object",
        "required": ["to"],
        "properties": {
            "to": { "type": "string", "minLength": 1 },
            "capability": { "type": "string", "pattern": CAPABILITY_PATTERN },
            "access": { "enum": levels },
            "env": {
                "type": "object",
                "additionalProperties": { "type": "string" }
            },
            "options": { "type": "object" }
        }
    })
}

/// Lazily composes the master schema once and hands out shared references.
///
/// Component type registration does not change at runtime, so the first
/// successful composition is kept for the lifetime of the composer.
#[derive(Debug)]
pub struct SchemaComposer {
    registry: Arc<ComponentRegistry>,
    cache: OnceLock<Arc<MasterSchema>>,
}

impl SchemaComposer {
    /// Create a composer over `registry`.
    #[must_use]
    pub fn new(registry: Arc<ComponentRegistry>) -> Self {
        Self {
            registry,
            cache: OnceLock::new(),
        }
    }

    /// The registry this composer reads.
    #[must_use]
    pub fn registry(&self) -> &Arc<ComponentRegistry> {
        &self.registry
    }

    /// Return the cached master schema, composing it on first use.
    ///
    /// # Errors
    ///
    /// See [`compose_master_schema`]. A failed composition is not cached.
    pub fn master_schema(&self) -> ManifestResult<Arc<MasterSchema>> {
        if let Some(master) = self.cache.get() {
            return Ok(Arc::clone(master));
        }

        let composed = Arc::new(compose_master_schema(&self.registry)?);
        debug!(types = self.registry.len(), "composed master schema");
        Ok(Arc::clone(self.cache.get_or_init(|| composed)))
    }
}
