//! Context hydration: binds a validated manifest to one environment.
//!
//! Hydration is a pure transform. The input tree is never mutated; every
//! level of the output is freshly built.
//!
//! Steps:
//! 1. Default `complianceFramework` to `commercial`.
//! 2. Look up `environments.<env>.defaults`. Without it nothing else runs.
//! 3. Resolve `${env:KEY}` tokens in every string, then turn any string
//!    holding an `${envIs:NAME}` token into the boolean `env == NAME`.
//! 4. Replace any object field that has a key equal to the environment
//!    name with that key's value.
//!
//! Arrays are walked element-wise and are never per-environment maps. The
//! `environments` block itself is passed through unchanged.

use std::sync::LazyLock;

use regex::{Captures, Regex};
use serde_json::{Map, Value};
use strata_core::ComplianceFramework;
use strata_core::path::{join_index, join_key};
use tracing::debug;

use crate::error::{ManifestError, ManifestResult};
use crate::warning::Warning;

static ENV_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{env:([^}]+)\}").expect("invalid regex"));
static ENV_IS_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{envIs:([^}]+)\}").expect("invalid regex"));

/// A manifest bound to one environment.
#[derive(Debug, Clone, PartialEq)]
pub struct HydratedTree {
    /// The hydrated manifest tree.
    pub tree: Value,
    /// Findings that did not stop hydration.
    pub warnings: Vec<Warning>,
}

/// Hydrate `tree` for `environment`.
///
/// # Errors
///
/// Returns [`ManifestError::Hydration`] if the environment name is empty or
/// the root is not a mapping.
pub fn hydrate(tree: &Value, environment: &str) -> ManifestResult<HydratedTree> {
    if environment.trim().is_empty() {
        return Err(ManifestError::Hydration {
            path: "<environment>".to_owned(),
            message: "environment name must not be empty".to_owned(),
        });
    }
    let Some(root) = tree.as_object() else {
        return Err(ManifestError::Hydration {
            path: "<root>".to_owned(),
            message: "manifest root must be a mapping".to_owned(),
        });
    };

    let mut warnings = Vec::new();
    let mut out = root.clone();
    if !out.contains_key("complianceFramework") {
        out.insert(
            "complianceFramework".to_owned(),
            Value::String(ComplianceFramework::default().as_str().to_owned()),
        );
    }

    let defaults = root
        .get("environments")
        .and_then(|envs| envs.get(environment))
        .and_then(|env| env.get("defaults"))
        .and_then(Value::as_object);

    let Some(defaults) = defaults else {
        warnings.push(Warning::new(
            join_key("environments", environment),
            format!("environment '{environment}' declares no defaults; interpolation skipped"),
        ));
        return Ok(HydratedTree {
            tree: Value::Object(out),
            warnings,
        });
    };

    let ctx = Context {
        environment,
        defaults,
    };
    let mut hydrated = Map::new();
    for (key, value) in &out {
        let value = if key == "environments" {
            value.clone()
        } else {
            ctx.field(value, key, &mut warnings)
        };
        hydrated.insert(key.clone(), value);
    }

    debug!(environment, warnings = warnings.len(), "hydrated manifest");
    Ok(HydratedTree {
        tree: Value::Object(hydrated),
        warnings,
    })
}

struct Context<'a> {
    environment: &'a str,
    defaults: &'a Map<String, Value>,
}

impl Context<'_> {
    /// Hydrate a field value, applying the per-environment map shorthand.
    fn field(&self, value: &Value, path: &str, warnings: &mut Vec<Warning>) -> Value {
        match value {
            Value::Object(map) => {
                if let Some(selected) = map.get(self.environment) {
                    return self.field(selected, path, warnings);
                }
                let mut out = Map::new();
                for (key, child) in map {
                    out.insert(key.clone(), self.field(child, &join_key(path, key), warnings));
                }
                Value::Object(out)
            },
            Value::Array(items) => Value::Array(
                items
                    .iter()
                    .enumerate()
                    .map(|(i, item)| self.field(item, &join_index(path, i), warnings))
                    .collect(),
            ),
            Value::String(s) => self.string(s, path, warnings),
            other => other.clone(),
        }
    }

    fn string(&self, input: &str, path: &str, warnings: &mut Vec<Warning>) -> Value {
        let resolved = ENV_TOKEN.replace_all(input, |caps: &Captures<'_>| {
            match self.defaults.get(&caps[1]) {
                Some(value) => stringify(value),
                None => {
                    debug!(key = &caps[1], path, "unresolved ${{env:..}} token left as-is");
                    caps[0].to_owned()
                },
            }
        });

        let Some(caps) = ENV_IS_TOKEN.captures(&resolved) else {
            return Value::String(resolved.into_owned());
        };

        if caps[0].len() != resolved.len() {
            warnings.push(Warning::new(
                path,
                format!(
                    "'{}' replaces the whole value; surrounding text in \"{resolved}\" is discarded",
                    &caps[0]
                ),
            ));
        }
        Value::Bool(caps[1].trim() == self.environment)
    }
}

/// String form of a defaults value: strings verbatim, other scalars in
/// their literal spelling, containers as compact JSON.
fn stringify(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => "null".to_owned(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::Array(_) | Value::Object(_) => value.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn manifest(body: Value) -> Value {
        let mut tree = json!({
            "service": "orders",
            "owner": "team-a",
            "environments": {
                "dev": { "defaults": { "region": "us-east-1", "replicas": 2, "debug": true } },
                "prod": { "defaults": { "region": "us-gov-west-1" } }
            }
        });
        if let (Value::Object(base), Value::Object(extra)) = (&mut tree, body) {
            base.extend(extra);
        }
        tree
    }

    #[test]
    fn test_env_interpolation() {
        let tree = manifest(json!({
            "components": [{ "name": "api", "type": "x", "config": {
                "bucketName": "${env:region}-primary",
                "missing": "${env:missing}",
                "mixed": "${env:region}/${env:missing}/${env:replicas}"
            }}]
        }));

        let out = hydrate(&tree, "dev").unwrap().tree;
        let config = &out["components"][0]["config"];
        assert_eq!(config["bucketName"], "us-east-1-primary");
        assert_eq!(config["missing"], "${env:missing}");
        assert_eq!(config["mixed"], "us-east-1/${env:missing}/2");
    }

    #[test]
    fn test_env_is_token() {
        let tree = manifest(json!({
            "components": [{ "name": "api", "type": "x", "config": { "isProd": "${envIs:prod}" } }]
        }));

        let dev = hydrate(&tree, "dev").unwrap().tree;
        assert_eq!(dev["components"][0]["config"]["isProd"], json!(false));

        let prod = hydrate(&tree, "prod").unwrap().tree;
        assert_eq!(prod["components"][0]["config"]["isProd"], json!(true));
    }

    #[test]
    fn test_env_is_with_surrounding_text_warns() {
        let tree = manifest(json!({ "flag": "prefix-${envIs:dev}" }));
        let out = hydrate(&tree, "dev").unwrap();
        assert_eq!(out.tree["flag"], json!(true));
        assert_eq!(out.warnings.len(), 1);
        assert_eq!(out.warnings[0].path, "flag");
    }

    #[test]
    fn test_per_environment_map() {
        let tree = manifest(json!({
            "components": [{ "name": "api", "type": "x", "config": {
                "memory": { "dev": 512, "prod": 2048 },
                "nested": { "inner": { "dev": "${env:region}", "prod": "gov" } },
                "other": { "staging": 1 }
            }}]
        }));

        let out = hydrate(&tree, "dev").unwrap().tree;
        let config = &out["components"][0]["config"];
        assert_eq!(config["memory"], json!(512));
        assert_eq!(config["nested"]["inner"], json!("us-east-1"));
        assert_eq!(config["other"], json!({ "staging": 1 }));
    }

    #[test]
    fn test_arrays_are_not_environment_maps() {
        let tree = manifest(json!({
            "list": ["dev", { "dev": 1, "prod": 2 }, "${env:region}"]
        }));
        let out = hydrate(&tree, "dev").unwrap().tree;
        assert_eq!(out["list"], json!(["dev", 1, "us-east-1"]));
    }

    #[test]
    fn test_compliance_default_and_missing_environment() {
        let tree = manifest(json!({ "value": "${env:region}" }));
        let out = hydrate(&tree, "staging").unwrap();
        assert_eq!(out.tree["complianceFramework"], "commercial");
        // No defaults for staging: tree passes through.
        assert_eq!(out.tree["value"], "${env:region}");
        assert_eq!(out.warnings[0].path, "environments.staging");
    }

    #[test]
    fn test_existing_framework_kept() {
        let tree = manifest(json!({ "complianceFramework": "fedramp-high" }));
        let out = hydrate(&tree, "dev").unwrap().tree;
        assert_eq!(out["complianceFramework"], "fedramp-high");
    }

    #[test]
    fn test_environments_block_untouched() {
        let tree = manifest(json!({}));
        let out = hydrate(&tree, "dev").unwrap().tree;
        assert_eq!(out["environments"], tree["environments"]);
    }

    #[test]
    fn test_input_not_mutated_and_deterministic() {
        let tree = manifest(json!({ "a": "${env:region}" }));
        let before = tree.clone();
        let first = hydrate(&tree, "dev").unwrap();
        let second = hydrate(&tree, "dev").unwrap();
        assert_eq!(tree, before);
        assert_eq!(
            serde_json::to_string(&first.tree).unwrap(),
            serde_json::to_string(&second.tree).unwrap()
        );
    }

    #[test]
    fn test_empty_environment_rejected() {
        let err = hydrate(&manifest(json!({})), " ").unwrap_err();
        assert!(matches!(err, ManifestError::Hydration { .. }));
    }
}
