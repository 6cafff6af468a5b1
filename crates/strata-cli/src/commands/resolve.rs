//! `strata resolve`.

use std::path::Path;

use anyhow::{Context, Result, bail};
use serde_json::json;
use strata_config::PlatformDefaults;
use strata_platform::{Platform, ResolvedBinding};

use crate::output::OutputFormat;
use crate::theme::{Theme, print_warnings};

/// Arguments of `strata resolve`.
pub(crate) struct ResolveArgs<'a> {
    pub(crate) manifest: &'a Path,
    pub(crate) environment: &'a str,
    pub(crate) platform_defaults: Option<&'a Path>,
    pub(crate) component: Option<&'a str>,
    pub(crate) format: OutputFormat,
}

/// Resolve configuration and bindings and print them with source layers.
pub(crate) fn run(platform: &Platform, args: &ResolveArgs<'_>) -> Result<String> {
    let defaults = match args.platform_defaults {
        Some(path) => PlatformDefaults::load(path)
            .with_context(|| format!("failed to load platform defaults {}", path.display()))?,
        None => PlatformDefaults::empty(),
    };

    let resolution = platform
        .resolve(args.manifest, args.environment, &defaults)
        .with_context(|| {
            format!(
                "failed to resolve {} for environment '{}'",
                args.manifest.display(),
                args.environment
            )
        })?;
    print_warnings(&resolution.plan.warnings);

    if let Some(name) = args.component
        && !resolution.components.contains_key(name)
    {
        let declared: Vec<&str> = resolution.components.keys().map(String::as_str).collect();
        bail!(
            "component '{name}' is not declared in {} (declared: {})",
            args.manifest.display(),
            declared.join(", ")
        );
    }

    let selected = |name: &str| args.component.is_none_or(|wanted| wanted == name);
    let bindings: Vec<&ResolvedBinding> = resolution
        .bindings
        .iter()
        .filter(|b| selected(&b.source))
        .collect();

    match args.format {
        OutputFormat::Json => {
            let components: serde_json::Map<String, serde_json::Value> = resolution
                .components
                .iter()
                .filter(|(name, _)| selected(name))
                .map(|(name, config)| serde_json::to_value(config).map(|value| (name.clone(), value)))
                .collect::<Result<_, _>>()?;
            args.format.render(&json!({
                "service": resolution.plan.resolved_manifest.get("service"),
                "environment": resolution.plan.environment,
                "components": components,
                "bindings": bindings,
            }))
        },
        OutputFormat::Yaml => {
            let mut out = String::new();
            for (name, config) in &resolution.components {
                if selected(name) {
                    out.push_str(&config.show(args.format.show_format())?);
                    out.push('\n');
                }
            }
            if !bindings.is_empty() {
                out.push_str(&Theme::header("# bindings"));
                out.push('\n');
                out.push_str(&args.format.render(&bindings)?);
            }
            Ok(out)
        },
    }
}
