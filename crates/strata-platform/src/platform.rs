//! The platform bundle: component catalogue, binder strategies, manifest
//! pipeline and precedence resolver wired together.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::{Arc, OnceLock};

use chrono::NaiveDate;
use serde::Serialize;
use strata_capabilities::{
    BinderRegistry, BindingCompatibility, BindingContext, BindingError, CapabilityBindingResult,
};
use strata_config::{ConfigPrecedenceResolver, PlatformDefaults, ResolvedComponentConfig};
use strata_core::{BindingDeclaration, ComponentRegistry, ComponentSpec, ServiceManifest};
use strata_manifest::{ManifestPipeline, PlannedManifest, ValidatedManifest};
use tracing::{debug, info};

use crate::binders::builtin_binders;
use crate::components::builtin_registry;
use crate::error::{PlatformError, PlatformResult};

static SHARED: OnceLock<Platform> = OnceLock::new();

/// One bound declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedBinding {
    /// Component declaring the binding.
    pub source: String,
    /// Target component.
    pub target: String,
    /// Capability that was bound, explicit or inferred.
    pub capability: String,
    /// `components[i].binds[j]`.
    pub path: String,
    /// Access grant, injected variables and hardening.
    #[serde(flatten)]
    pub result: CapabilityBindingResult,
}

/// Everything `plan` plus resolution produces for one manifest.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Resolution {
    /// The planned manifest.
    pub plan: PlannedManifest,
    /// Resolved configuration per component name.
    pub components: BTreeMap<String, ResolvedComponentConfig>,
    /// Every binding, in manifest order.
    pub bindings: Vec<ResolvedBinding>,
}

/// Component types, binder strategies and the engines that consume them.
#[derive(Debug)]
pub struct Platform {
    components: Arc<ComponentRegistry>,
    binders: Arc<BinderRegistry>,
    pipeline: ManifestPipeline,
    resolver: ConfigPrecedenceResolver,
}

impl Platform {
    /// Bundle `components` and `binders`.
    #[must_use]
    pub fn new(components: ComponentRegistry, binders: BinderRegistry) -> Self {
        let components = Arc::new(components);
        Self {
            pipeline: ManifestPipeline::new(Arc::clone(&components)),
            resolver: ConfigPrecedenceResolver::new(Arc::clone(&components)),
            binders: Arc::new(binders),
            components,
        }
    }

    /// The built-in catalogue.
    ///
    /// # Errors
    ///
    /// Returns an error if a built-in type or strategy fails to register.
    pub fn builtin() -> PlatformResult<Self> {
        Ok(Self::new(builtin_registry()?, builtin_binders()?))
    }

    /// A process-wide built-in platform with its master schema composed.
    ///
    /// # Errors
    ///
    /// Returns an error if the built-in catalogue fails to build or its
    /// master schema fails to compose. A failure is not cached.
    pub fn shared() -> PlatformResult<&'static Self> {
        if let Some(platform) = SHARED.get() {
            return Ok(platform);
        }

        let platform = Self::builtin()?;
        platform.pipeline.master_schema()?;
        info!(
            component_types = platform.components.len(),
            strategies = platform.binders.len(),
            "Initialized platform"
        );
        Ok(SHARED.get_or_init(|| platform))
    }

    /// Use a fixed date when deciding whether a suppression has expired.
    #[must_use]
    pub fn with_today(self, today: NaiveDate) -> Self {
        Self {
            pipeline: self.pipeline.with_today(today),
            ..self
        }
    }

    /// Registered component types.
    #[must_use]
    pub fn components(&self) -> &ComponentRegistry {
        &self.components
    }

    /// Registered binder strategies.
    #[must_use]
    pub fn binders(&self) -> &BinderRegistry {
        &self.binders
    }

    /// The manifest pipeline.
    #[must_use]
    pub fn pipeline(&self) -> &ManifestPipeline {
        &self.pipeline
    }

    /// Parse and schema-validate the manifest at `path`.
    ///
    /// # Errors
    ///
    /// Returns the error of the first pipeline stage that fails.
    pub fn validate(&self, path: &Path) -> PlatformResult<ValidatedManifest> {
        Ok(self.pipeline.validate(path)?)
    }

    /// [`validate`](Self::validate) for text already in memory.
    ///
    /// # Errors
    ///
    /// Returns the error of the first pipeline stage that fails.
    pub fn validate_str(&self, source: &str, content: &str) -> PlatformResult<ValidatedManifest> {
        Ok(self.pipeline.validate_str(source, content)?)
    }

    /// Run every pipeline stage for `path` and `environment`.
    ///
    /// # Errors
    ///
    /// Returns the error of the first pipeline stage that fails.
    pub fn plan(&self, path: &Path, environment: &str) -> PlatformResult<PlannedManifest> {
        Ok(self.pipeline.plan(path, environment)?)
    }

    /// [`plan`](Self::plan) for text already in memory.
    ///
    /// # Errors
    ///
    /// Returns the error of the first pipeline stage that fails.
    pub fn plan_str(
        &self,
        source: &str,
        content: &str,
        environment: &str,
    ) -> PlatformResult<PlannedManifest> {
        Ok(self.pipeline.plan_str(source, content, environment)?)
    }

    /// Plan the manifest at `path`, then resolve configuration and bindings.
    ///
    /// # Errors
    ///
    /// Returns the first pipeline, resolution or binding error.
    pub fn resolve(
        &self,
        path: &Path,
        environment: &str,
        platform_defaults: &PlatformDefaults,
    ) -> PlatformResult<Resolution> {
        let plan = self.plan(path, environment)?;
        self.resolve_plan(plan, platform_defaults)
    }

    /// [`resolve`](Self::resolve) for text already in memory.
    ///
    /// # Errors
    ///
    /// Returns the first pipeline, resolution or binding error.
    pub fn resolve_str(
        &self,
        source: &str,
        content: &str,
        environment: &str,
        platform_defaults: &PlatformDefaults,
    ) -> PlatformResult<Resolution> {
        let plan = self.plan_str(source, content, environment)?;
        self.resolve_plan(plan, platform_defaults)
    }

    fn resolve_plan(
        &self,
        plan: PlannedManifest,
        platform_defaults: &PlatformDefaults,
    ) -> PlatformResult<Resolution> {
        let components = self.resolve_components(&plan, platform_defaults)?;
        let bindings = self.resolve_bindings(&plan, &components)?;
        Ok(Resolution {
            plan,
            components,
            bindings,
        })
    }

    /// Resolve the five-layer configuration of every component.
    ///
    /// # Errors
    ///
    /// Returns the first component's [`ConfigMergeError`](strata_config::ConfigMergeError).
    pub fn resolve_components(
        &self,
        plan: &PlannedManifest,
        platform_defaults: &PlatformDefaults,
    ) -> PlatformResult<BTreeMap<String, ResolvedComponentConfig>> {
        let manifest = plan.typed()?;
        Ok(self.resolver.resolve_manifest(&manifest, platform_defaults)?)
    }

    /// Bind every declaration of the plan, in manifest order.
    ///
    /// A binding without `capability` binds to the target's only capability.
    ///
    /// # Errors
    ///
    /// Returns [`PlatformError::Binding`] for the first declaration that
    /// cannot be bound and [`PlatformError::Unresolved`] if `resolved` lacks
    /// the target.
    pub fn resolve_bindings(
        &self,
        plan: &PlannedManifest,
        resolved: &BTreeMap<String, ResolvedComponentConfig>,
    ) -> PlatformResult<Vec<ResolvedBinding>> {
        let manifest = plan.typed()?;
        let mut bindings = Vec::new();

        for (i, component) in manifest.components.iter().enumerate() {
            for (j, declaration) in component.binds.iter().enumerate() {
                let path = format!("components[{i}].binds[{j}]");
                let binding = self.bind_one(&manifest, component, declaration, resolved, &path)?;
                bindings.push(binding);
            }
        }

        debug!(bindings = bindings.len(), "resolved bindings");
        Ok(bindings)
    }

    /// Dry-run check whether `source_type` can bind to `capability`.
    #[must_use]
    pub fn check_binding(&self, source_type: &str, capability: &str) -> BindingCompatibility {
        self.binders.validate_binding(source_type, capability)
    }

    fn bind_one(
        &self,
        manifest: &ServiceManifest,
        source: &ComponentSpec,
        declaration: &BindingDeclaration,
        resolved: &BTreeMap<String, ResolvedComponentConfig>,
        path: &str,
    ) -> PlatformResult<ResolvedBinding> {
        let wrap = |source: BindingError| PlatformError::Binding {
            path: path.to_owned(),
            source,
        };
        let unresolved = || PlatformError::Unresolved {
            path: path.to_owned(),
            component: declaration.to.clone(),
        };

        let target = resolved.get(&declaration.to).ok_or_else(unresolved)?;
        let target_type = self
            .components
            .get(&target.component_type)
            .ok_or_else(unresolved)?;
        let provided = target_type.provided_capabilities();

        let capability = match (declaration.capability.as_deref(), provided) {
            (Some(capability), _) => capability,
            (None, [only]) => *only,
            (None, []) => {
                return Err(wrap(BindingError::CapabilityNotProvided {
                    target: declaration.to.clone(),
                    capability: "any".to_owned(),
                }));
            },
            (None, many) => {
                return Err(wrap(BindingError::AmbiguousCapability {
                    target: declaration.to.clone(),
                    available: many.iter().map(|c| (*c).to_owned()).collect(),
                }));
            },
        };

        self.binders
            .resolve(&source.component_type, capability)
            .map_err(wrap)?;

        let data = target_type
            .capability_data(capability, &declaration.to, &target.config)
            .ok_or_else(|| {
                wrap(BindingError::CapabilityNotProvided {
                    target: declaration.to.clone(),
                    capability: capability.to_owned(),
                })
            })?;

        let ctx = BindingContext {
            declaration,
            framework: manifest.compliance_framework,
            source_name: &source.name,
            source_type: &source.component_type,
            target_name: &declaration.to,
            capability,
            capability_data: &data,
        };
        let result = self.binders.bind(&ctx).map_err(wrap)?;

        Ok(ResolvedBinding {
            source: source.name.clone(),
            target: declaration.to.clone(),
            capability: capability.to_owned(),
            path: path.to_owned(),
            result,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strata_config::ConfigLayer;
    use strata_core::{AccessLevel, ComplianceFramework};

    const MANIFEST: &str = r#"
service: orders
owner: team-a
complianceFramework: fedramp-moderate
environments:
  dev:
    defaults:
      region: us-east-1
  prod:
    defaults:
      region: us-west-2
components:
  - name: api
    type: lambda-api
    config:
      handler: src/api.handler
      memorySize:
        dev: 512
        prod: 2048
      api:
        cors: "${envIs:dev}"
      logging:
        retentionDays: 7
      tags:
        team: payments
    binds:
      - to: db
        access: readwrite
      - to: assets
        capability: storage:s3
        access: write
        env:
          BUCKET_NAME: ASSETS_BUCKET
  - name: db
    type: rds-postgres
    config:
      databaseName: orders
      multiAz:
        dev: false
        prod: true
  - name: assets
    type: s3-bucket
    config:
      bucketName: "orders-${env:region}"
"#;

    fn platform() -> Platform {
        Platform::builtin()
            .unwrap()
            .with_today(NaiveDate::from_ymd_opt(2026, 1, 1).unwrap())
    }

    #[test]
    fn test_end_to_end() {
        let resolution = platform()
            .resolve_str("<test>", MANIFEST, "dev", &PlatformDefaults::empty())
            .unwrap();

        let api = &resolution.components["api"];
        assert_eq!(api.config["memorySize"], 512);
        assert_eq!(api.source_of("memorySize"), Some(ConfigLayer::ComponentOverride));
        // Policy raises the author's short retention to the framework floor.
        assert_eq!(api.config["logging"]["retentionDays"], 365);
        assert_eq!(api.source_of("logging.retentionDays"), Some(ConfigLayer::PolicyOverride));
        assert_eq!(api.config["api"]["cors"], true);
        assert_eq!(api.config["api"]["path"], "/");
        assert_eq!(api.config["tags"]["team"], "payments");
        assert_eq!(api.config["tags"]["compliance:framework"], "fedramp-moderate");

        let db = &resolution.components["db"];
        // The framework layer asks for multi-AZ, but the author's value wins.
        assert_eq!(db.config["multiAz"], false);
        assert_eq!(db.config["iamAuthentication"], true);
        assert_eq!(db.config["storageEncrypted"], true);

        assert_eq!(resolution.bindings.len(), 2);
        let db_binding = &resolution.bindings[0];
        assert_eq!(db_binding.capability, "db:postgres");
        assert_eq!(db_binding.path, "components[0].binds[0]");
        assert_eq!(db_binding.result.granted_access.level, AccessLevel::ReadWrite);
        assert_eq!(db_binding.result.environment_variables["DB_IAM_AUTH"], "true");
        assert!(db_binding
            .result
            .hardening_applied
            .contains(&"tls:verify-full".to_owned()));

        let s3_binding = &resolution.bindings[1];
        assert_eq!(
            s3_binding.result.environment_variables["ASSETS_BUCKET"],
            "orders-us-east-1"
        );
    }

    #[test]
    fn test_prod_environment() {
        let resolution = platform()
            .resolve_str("<test>", MANIFEST, "prod", &PlatformDefaults::empty())
            .unwrap();
        assert_eq!(resolution.components["api"].config["memorySize"], 2048);
        assert_eq!(resolution.components["db"].config["multiAz"], true);
        assert_eq!(resolution.components["api"].config["api"]["cors"], false);
        assert_eq!(resolution.components["assets"].config["bucketName"], "orders-us-west-2");
    }

    #[test]
    fn test_unsupported_access() {
        let manifest = MANIFEST.replace("access: readwrite", "access: write");
        let err = platform()
            .resolve_str("<test>", &manifest, "dev", &PlatformDefaults::empty())
            .unwrap_err();
        match err {
            PlatformError::Binding { path, source } => {
                assert_eq!(path, "components[0].binds[0]");
                assert!(matches!(source, BindingError::UnsupportedAccess { .. }));
            },
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_capability_typo_suggests() {
        let manifest = MANIFEST.replace("capability: storage:s3", "capability: storage:s4");
        let err = platform()
            .resolve_str("<test>", &manifest, "dev", &PlatformDefaults::empty())
            .unwrap_err();
        assert!(err.to_string().contains("did you mean 'storage:s3'?"));
    }

    #[test]
    fn test_wrong_capability_for_target() {
        let manifest = MANIFEST.replace("capability: storage:s3", "capability: queue:sqs");
        let err = platform()
            .resolve_str("<test>", &manifest, "dev", &PlatformDefaults::empty())
            .unwrap_err();
        assert!(matches!(
            err,
            PlatformError::Binding {
                source: BindingError::CapabilityNotProvided { .. },
                ..
            }
        ));
    }

    #[test]
    fn test_target_without_capabilities() {
        let manifest = r"
service: s
owner: o
components:
  - name: api
    type: lambda-api
    config:
      handler: index.handler
    binds:
      - to: firewall
  - name: firewall
    type: waf-web-acl
";
        let err = platform()
            .resolve_str("<test>", manifest, "dev", &PlatformDefaults::empty())
            .unwrap_err();
        assert!(err.to_string().contains("components[0].binds[0]"));
    }

    #[test]
    fn test_org_defaults_apply() {
        let defaults = PlatformDefaults::empty()
            .with_type("rds-postgres", serde_json::json!({ "instanceClass": "db.r6g.large" }));
        let resolution = platform()
            .resolve_str("<test>", MANIFEST, "dev", &defaults)
            .unwrap();
        let db = &resolution.components["db"];
        assert_eq!(db.config["instanceClass"], "db.r6g.large");
        assert_eq!(db.source_of("instanceClass"), Some(ConfigLayer::PlatformDefault));
    }

    #[test]
    fn test_resolve_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("service.yml");
        std::fs::write(&path, MANIFEST).unwrap();

        let platform = platform();
        let validated = platform.validate(&path).unwrap();
        assert_eq!(
            validated.manifest["components"][2]["config"]["bucketName"],
            "orders-${env:region}"
        );

        let resolution = platform
            .resolve(&path, "dev", &PlatformDefaults::empty())
            .unwrap();
        assert_eq!(resolution.plan.environment, "dev");
        assert_eq!(resolution.components.len(), 3);
    }

    #[test]
    fn test_check_binding() {
        let platform = platform();
        assert!(platform.check_binding("lambda-worker", "queue:sqs").is_compatible());
        assert_eq!(
            platform.check_binding("lambda-worker", "queue:sq"),
            BindingCompatibility::Incompatible {
                suggestion: Some("queue:sqs".to_owned())
            }
        );
    }

    #[test]
    fn test_shared_is_reused() {
        let a = Platform::shared().unwrap();
        let b = Platform::shared().unwrap();
        assert!(std::ptr::eq(a, b));
        assert_eq!(a.components().len(), 6);
    }

    #[test]
    fn test_framework_variants() {
        for framework in ComplianceFramework::ALL {
            let manifest = MANIFEST.replace("fedramp-moderate", framework.as_str());
            let resolution = platform()
                .resolve_str("<test>", &manifest, "dev", &PlatformDefaults::empty())
                .unwrap();
            assert_eq!(resolution.components["db"].framework, framework);
        }
    }
}
