//! The validation pipeline.
//!
//! `validate` runs parse and schema validation. `plan` additionally hydrates
//! the tree for one environment and checks references. Stages run strictly
//! in order and the first failing stage ends the run.

use std::path::Path;
use std::sync::Arc;

use chrono::NaiveDate;
use serde::Serialize;
use serde_json::Value;
use strata_core::{ComponentRegistry, ServiceManifest};
use tracing::{debug, info, warn};

use crate::composer::{MasterSchema, SchemaComposer};
use crate::error::{ManifestError, ManifestResult};
use crate::hydrator::hydrate;
use crate::parser;
use crate::references::ReferenceValidator;
use crate::validator;
use crate::warning::Warning;

/// A manifest that passed parse and schema validation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidatedManifest {
    /// The validated, not yet hydrated, tree.
    pub manifest: Value,
    /// Non-fatal findings.
    pub warnings: Vec<Warning>,
}

/// A manifest bound to one environment that passed every stage.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlannedManifest {
    /// The hydrated, reference-checked tree.
    pub resolved_manifest: Value,
    /// Environment the manifest was planned for.
    pub environment: String,
    /// Non-fatal findings from every stage, in stage order.
    pub warnings: Vec<Warning>,
}

impl PlannedManifest {
    /// The typed view of the resolved manifest.
    ///
    /// # Errors
    ///
    /// Returns [`ManifestError::Model`] if the tree does not deserialize into
    /// [`ServiceManifest`].
    pub fn typed(&self) -> ManifestResult<ServiceManifest> {
        ServiceManifest::from_tree(&self.resolved_manifest)
            .map_err(|source| ManifestError::Model { source })
    }
}

/// Runs manifests through the pipeline against one component registry.
#[derive(Debug)]
pub struct ManifestPipeline {
    composer: SchemaComposer,
    references: ReferenceValidator,
}

impl ManifestPipeline {
    /// Create a pipeline over `registry`.
    #[must_use]
    pub fn new(registry: Arc<ComponentRegistry>) -> Self {
        Self {
            composer: SchemaComposer::new(registry),
            references: ReferenceValidator::new(),
        }
    }

    /// Use a fixed date when deciding whether a suppression has expired.
    #[must_use]
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.references = self.references.with_today(today);
        self
    }

    /// The component registry this pipeline validates against.
    #[must_use]
    pub fn registry(&self) -> &Arc<ComponentRegistry> {
        self.composer.registry()
    }

    /// The composed master schema, built on first use.
    ///
    /// # Errors
    ///
    /// Returns a composition error if a registered type has a malformed schema.
    pub fn master_schema(&self) -> ManifestResult<Arc<MasterSchema>> {
        self.composer.master_schema()
    }

    /// Parse and schema-validate the manifest at `path`.
    ///
    /// # Errors
    ///
    /// Returns the error of the first stage that fails.
    pub fn validate(&self, path: &Path) -> ManifestResult<ValidatedManifest> {
        let master = self.composer.master_schema()?;
        let tree = parser::parse(path)?;
        self.validate_tree(tree, &master)
    }

    /// [`validate`](Self::validate) for text already in memory.
    ///
    /// # Errors
    ///
    /// Returns the error of the first stage that fails.
    pub fn validate_str(&self, source: &str, content: &str) -> ManifestResult<ValidatedManifest> {
        let master = self.composer.master_schema()?;
        let tree = parser::parse_str(source, content)?;
        self.validate_tree(tree, &master)
    }

    /// Run every stage for the manifest at `path` and `environment`.
    ///
    /// # Errors
    ///
    /// Returns the error of the first stage that fails.
    pub fn plan(&self, path: &Path, environment: &str) -> ManifestResult<PlannedManifest> {
        let validated = self.validate(path)?;
        self.plan_validated(validated, environment)
    }

    /// [`plan`](Self::plan) for text already in memory.
    ///
    /// # Errors
    ///
    /// Returns the error of the first stage that fails.
    pub fn plan_str(
        &self,
        source: &str,
        content: &str,
        environment: &str,
    ) -> ManifestResult<PlannedManifest> {
        let validated = self.validate_str(source, content)?;
        self.plan_validated(validated, environment)
    }

    fn validate_tree(&self, tree: Value, master: &MasterSchema) -> ManifestResult<ValidatedManifest> {
        let warnings = validator::validate(&tree, master, self.composer.registry())?;
        debug!(warnings = warnings.len(), "schema validation passed");
        log_warnings(&warnings);

        Ok(ValidatedManifest {
            manifest: tree,
            warnings,
        })
    }

    fn plan_validated(
        &self,
        validated: ValidatedManifest,
        environment: &str,
    ) -> ManifestResult<PlannedManifest> {
        let ValidatedManifest {
            manifest,
            mut warnings,
        } = validated;

        let hydrated = hydrate(&manifest, environment)?;
        log_warnings(&hydrated.warnings);
        warnings.extend(hydrated.warnings);

        let reference_warnings = self.references.validate(&hydrated.tree)?;
        debug!("reference validation passed");
        log_warnings(&reference_warnings);
        warnings.extend(reference_warnings);

        let service = hydrated
            .tree
            .get("service")
            .and_then(serde_json::Value::as_str)
            .unwrap_or_default();
        info!(
            environment,
            service,
            warnings = warnings.len(),
            "manifest planned"
        );

        Ok(PlannedManifest {
            resolved_manifest: hydrated.tree,
            environment: environment.to_owned(),
            warnings,
        })
    }
}

fn log_warnings(warnings: &[Warning]) {
    for w in warnings {
        warn!(path = %w.path, "{}", w.message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Stage;
    use serde_json::json;
    use strata_core::ComponentType;

    struct Bucket;

    impl ComponentType for Bucket {
        fn type_name(&self) -> &'static str {
            "test-bucket"
        }

        fn config_schema(&self) -> Value {
            json!({
                "type": "object",
                "properties": {
                    "bucketName": { "type": "string" },
                    "versioned": { "type": "boolean" }
                }
            })
        }

        fn hardcoded_fallback(&self) -> Value {
            json!({ "versioned": true })
        }
    }

    fn pipeline() -> ManifestPipeline {
        let registry = ComponentRegistry::new().with(Arc::new(Bucket)).unwrap();
        ManifestPipeline::new(Arc::new(registry))
            .with_today(NaiveDate::from_ymd_opt(2026, 1, 1).unwrap())
    }

    const MANIFEST: &str = r#"
service: orders
owner: team-a
environments:
  dev:
    defaults:
      region: us-east-1
components:
  - name: assets
    type: test-bucket
    config:
      bucketName: "${env:region}-primary"
      versioned:
        dev: false
        prod: true
"#;

    #[test]
    fn test_validate_does_not_hydrate() {
        let validated = pipeline().validate_str("<test>", MANIFEST).unwrap();
        assert_eq!(
            validated.manifest["components"][0]["config"]["bucketName"],
            "${env:region}-primary"
        );
        assert!(validated.warnings.is_empty());
    }

    #[test]
    fn test_plan_hydrates() {
        let planned = pipeline().plan_str("<test>", MANIFEST, "dev").unwrap();
        let config = &planned.resolved_manifest["components"][0]["config"];
        assert_eq!(config["bucketName"], "us-east-1-primary");
        assert_eq!(config["versioned"], json!(false));
        assert_eq!(planned.resolved_manifest["complianceFramework"], "commercial");
        assert_eq!(planned.environment, "dev");

        let typed = planned.typed().unwrap();
        assert_eq!(typed.components[0].component_type, "test-bucket");
    }

    #[test]
    fn test_missing_owner_fails_schema_stage() {
        let err = pipeline()
            .plan_str("<test>", "service: orders\n", "dev")
            .unwrap_err();
        assert_eq!(err.stage(), Stage::Schema);
        assert!(err.to_string().contains("Missing required field: owner"));
    }

    #[test]
    fn test_dangling_binding_fails_reference_stage() {
        let manifest = "service: s\nowner: o\ncomponents:\n  - name: api\n    type: x\n    binds:\n      - to: db\n";
        let pipeline = pipeline();

        let validated = pipeline.validate_str("<test>", manifest).unwrap();
        assert_eq!(validated.warnings.len(), 1);

        let err = pipeline.plan_str("<test>", manifest, "dev").unwrap_err();
        assert_eq!(err.stage(), Stage::References);
        assert!(err.to_string().contains("components[0].binds[0]"));
    }

    #[test]
    fn test_parse_error_stage() {
        let err = pipeline().validate_str("<test>", "a: [").unwrap_err();
        assert_eq!(err.stage(), Stage::Parse);
    }

    #[test]
    fn test_plan_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("service.yml");
        std::fs::write(&path, MANIFEST).unwrap();

        let planned = pipeline().plan(&path, "dev").unwrap();
        assert_eq!(
            planned.resolved_manifest["components"][0]["config"]["bucketName"],
            "us-east-1-primary"
        );
    }

    #[test]
    fn test_plan_is_deterministic() {
        let p = pipeline();
        let a = p.plan_str("<test>", MANIFEST, "dev").unwrap();
        let b = p.plan_str("<test>", MANIFEST, "dev").unwrap();
        assert_eq!(
            serde_json::to_string(&a.resolved_manifest).unwrap(),
            serde_json::to_string(&b.resolved_manifest).unwrap()
        );
    }
}
