//! Five-layer configuration precedence resolution.
//!
//! For one component the layers are applied lowest first:
//!
//! 1. hardcoded fallback of the component type
//! 2. platform defaults (built in, then the organization file)
//! 3. compliance framework defaults
//! 4. the manifest `config` block
//! 5. governance policy overrides
//!
//! Objects merge key by key; scalars and arrays are replaced wholesale. A
//! field set by a higher layer can never be changed by a lower one.
//!
//! The merged result is checked against the type's config schema, compiled
//! once per type when the resolver is built. Manifest input is validated
//! before hydration with per-environment leniency, so this is where an
//! unresolved environment map or a mistyped `${envIs:NAME}` is caught.

use std::collections::BTreeMap;
use std::sync::Arc;

use jsonschema::{Draft, Validator};
use serde::Serialize;
use serde_json::Value;
use strata_core::path::from_pointer;
use strata_core::{ComplianceFramework, ComponentRegistry, ServiceManifest, empty_layer};
use tracing::debug;

use crate::defaults::PlatformDefaults;
use crate::error::{ConfigMergeError, ConfigResult};
use crate::merge::{
    ConfigLayer, FieldSources, deep_merge, deep_merge_tracking, find_reserved_key,
    missing_required,
};

/// Inputs for resolving one component.
#[derive(Debug, Clone, Copy)]
pub struct ResolutionContext<'a> {
    /// Component name, for error messages.
    pub component_name: &'a str,
    /// Active compliance framework.
    pub framework: ComplianceFramework,
    /// The manifest `config` block (layer 4).
    pub component_config: &'a Value,
    /// Organization platform defaults.
    pub platform_defaults: &'a PlatformDefaults,
}

/// Final configuration of one component.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedComponentConfig {
    /// Component name.
    pub component_name: String,
    /// Component type.
    pub component_type: String,
    /// Framework the configuration was resolved under.
    pub framework: ComplianceFramework,
    /// Merged configuration.
    pub config: Value,
    /// Dotted leaf path to the layer that set it.
    pub field_sources: FieldSources,
}

impl ResolvedComponentConfig {
    /// Layer that set the leaf at `path`.
    #[must_use]
    pub fn source_of(&self, path: &str) -> Option<ConfigLayer> {
        self.field_sources.get(path).copied()
    }
}

/// Compiled config schema of one type, or why it failed to compile.
type CompiledSchema = Result<Validator, String>;

/// Resolves component configuration against the registered component types.
#[derive(Clone)]
pub struct ConfigPrecedenceResolver {
    registry: Arc<ComponentRegistry>,
    schemas: Arc<BTreeMap<String, CompiledSchema>>,
}

impl std::fmt::Debug for ConfigPrecedenceResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfigPrecedenceResolver")
            .field("registry", &self.registry)
            .field("schemas", &self.schemas.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl ConfigPrecedenceResolver {
    /// Create a resolver over `registry`, compiling every type's config
    /// schema. A schema that fails to compile is reported when a component
    /// of that type is resolved.
    #[must_use]
    pub fn new(registry: Arc<ComponentRegistry>) -> Self {
        let schemas = registry
            .iter()
            .map(|(type_name, ty)| (type_name.to_owned(), compile(&ty.config_schema())))
            .collect();
        Self {
            registry,
            schemas: Arc::new(schemas),
        }
    }

    /// Resolve the configuration of one component of `component_type`.
    ///
    /// # Errors
    ///
    /// - [`ConfigMergeError::UnknownComponentType`] if the type is not registered
    /// - [`ConfigMergeError::InvalidLayer`] if a layer is not an object
    /// - [`ConfigMergeError::ReservedKey`] if the component override uses a
    ///   key, tag or otherwise, under a reserved prefix
    /// - [`ConfigMergeError::MissingRequired`] if required fields are absent
    ///   after merging
    /// - [`ConfigMergeError::InvalidSchema`] if the type's schema does not
    ///   compile
    /// - [`ConfigMergeError::SchemaViolation`] if the merged configuration
    ///   does not satisfy the type's schema
    pub fn resolve(
        &self,
        component_type: &str,
        ctx: &ResolutionContext<'_>,
    ) -> ConfigResult<ResolvedComponentConfig> {
        let ty = self.registry.get(component_type).ok_or_else(|| {
            ConfigMergeError::UnknownComponentType {
                component: ctx.component_name.to_owned(),
                type_name: component_type.to_owned(),
            }
        })?;

        let mut merger = LayerMerger::new(ctx.component_name);

        merger.apply(&ty.hardcoded_fallback(), ConfigLayer::HardcodedFallback)?;

        let mut platform = ty.platform_defaults();
        if let Some(org) = ctx.platform_defaults.get(component_type) {
            deep_merge(&mut platform, org);
        }
        merger.apply(&platform, ConfigLayer::PlatformDefault)?;

        let framework_layer = ty.framework_defaults(ctx.framework, &merger.merged);
        merger.apply(&framework_layer, ConfigLayer::EnvironmentDefault)?;

        if let Some(hit) = find_reserved_key(ctx.component_config) {
            return Err(ConfigMergeError::ReservedKey {
                component: ctx.component_name.to_owned(),
                path: hit.path,
                key: hit.key,
                prefix: hit.prefix,
            });
        }
        merger.apply(ctx.component_config, ConfigLayer::ComponentOverride)?;

        let policy = ty.policy_overrides(ctx.framework, &merger.merged);
        merger.apply(&policy, ConfigLayer::PolicyOverride)?;

        let missing = missing_required(&ty.config_schema(), &merger.merged);
        if !missing.is_empty() {
            return Err(ConfigMergeError::MissingRequired {
                component: ctx.component_name.to_owned(),
                fields: missing,
            });
        }
        self.check_schema(component_type, ctx.component_name, &merger.merged)?;

        debug!(
            component = ctx.component_name,
            component_type,
            framework = %ctx.framework,
            fields = merger.sources.len(),
            "resolved component configuration"
        );

        Ok(ResolvedComponentConfig {
            component_name: ctx.component_name.to_owned(),
            component_type: component_type.to_owned(),
            framework: ctx.framework,
            config: merger.merged,
            field_sources: merger.sources,
        })
    }

    /// Resolve every component of a planned manifest, keyed by name.
    ///
    /// # Errors
    ///
    /// Returns the first component's error; see [`resolve`](Self::resolve).
    pub fn resolve_manifest(
        &self,
        manifest: &ServiceManifest,
        platform_defaults: &PlatformDefaults,
    ) -> ConfigResult<BTreeMap<String, ResolvedComponentConfig>> {
        let mut resolved = BTreeMap::new();
        for component in &manifest.components {
            let ctx = ResolutionContext {
                component_name: &component.name,
                framework: manifest.compliance_framework,
                component_config: &component.config,
                platform_defaults,
            };
            let config = self.resolve(&component.component_type, &ctx)?;
            resolved.insert(component.name.clone(), config);
        }
        Ok(resolved)
    }

    fn check_schema(
        &self,
        component_type: &str,
        component: &str,
        merged: &Value,
    ) -> ConfigResult<()> {
        let Some(compiled) = self.schemas.get(component_type) else {
            return Ok(());
        };
        let validator = compiled.as_ref().map_err(|reason| ConfigMergeError::InvalidSchema {
            component: component.to_owned(),
            type_name: component_type.to_owned(),
            reason: reason.clone(),
        })?;

        let violations: Vec<String> = validator
            .iter_errors(merged)
            .map(|error| {
                let path = from_pointer(&error.instance_path.to_string());
                format!("{path}: {error}")
            })
            .collect();
        if violations.is_empty() {
            return Ok(());
        }

        debug!(component, count = violations.len(), "merged configuration violates schema");
        Err(ConfigMergeError::SchemaViolation {
            component: component.to_owned(),
            violations,
        })
    }
}

fn compile(schema: &Value) -> CompiledSchema {
    jsonschema::options()
        .with_draft(Draft::Draft202012)
        .build(schema)
        .map_err(|e| e.to_string())
}

struct LayerMerger<'a> {
    component: &'a str,
    merged: Value,
    sources: FieldSources,
}

impl<'a> LayerMerger<'a> {
    fn new(component: &'a str) -> Self {
        Self {
            component,
            merged: empty_layer(),
            sources: FieldSources::new(),
        }
    }

    fn apply(&mut self, layer_value: &Value, layer: ConfigLayer) -> ConfigResult<()> {
        if !layer_value.is_object() {
            return Err(ConfigMergeError::InvalidLayer {
                component: self.component.to_owned(),
                layer,
                found: kind_of(layer_value),
            });
        }
        deep_merge_tracking(&mut self.merged, layer_value, "", layer, &mut self.sources);
        Ok(())
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
