//! `strata plan`.

use std::path::Path;

use anyhow::{Context, Result};
use strata_platform::Platform;

use crate::output::OutputFormat;
use crate::theme::print_warnings;

/// Hydrate a manifest for `environment` and print the resolved tree.
pub(crate) fn run(
    platform: &Platform,
    manifest: &Path,
    environment: &str,
    format: OutputFormat,
) -> Result<String> {
    let planned = platform.plan(manifest, environment).with_context(|| {
        format!(
            "failed to plan {} for environment '{environment}'",
            manifest.display()
        )
    })?;
    print_warnings(&planned.warnings);
    format.render(&planned)
}
