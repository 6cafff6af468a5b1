//! `strata validate`.

use std::fmt::Write as _;
use std::path::Path;

use anyhow::{Context, Result};
use serde_json::Value;
use strata_platform::Platform;

use crate::theme::{Theme, print_warnings};

/// Parse and schema-validate a manifest.
pub(crate) fn run(platform: &Platform, manifest: &Path) -> Result<String> {
    let validated = platform
        .validate(manifest)
        .with_context(|| format!("{} is not a valid manifest", manifest.display()))?;
    print_warnings(&validated.warnings);

    let components = validated
        .manifest
        .get("components")
        .and_then(Value::as_array)
        .map_or(0, Vec::len);

    let mut out = String::new();
    writeln!(
        out,
        "{}",
        Theme::success(&format!(
            "{} is valid ({components} component(s), {} warning(s))",
            manifest.display(),
            validated.warnings.len()
        ))
    )?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::fixtures::{MANIFEST, manifest_file};

    #[test]
    fn test_valid_manifest() {
        let (_dir, path) = manifest_file(MANIFEST);
        let out = run(Platform::shared().unwrap(), &path).unwrap();
        assert!(out.contains("is valid (3 component(s), 0 warning(s))"));
    }

    #[test]
    fn test_missing_owner() {
        let (_dir, path) = manifest_file("service: orders\n");
        let err = run(Platform::shared().unwrap(), &path).unwrap_err();
        let text = format!("{err:#}");
        assert!(text.contains("is not a valid manifest"));
        assert!(text.contains("Missing required field: owner"));
    }
}
