//! `strata check-binding`.

use std::fmt::Write as _;

use anyhow::{Result, bail};
use strata_capabilities::BindingCompatibility;
use strata_platform::Platform;

use crate::theme::Theme;

/// Dry-run whether `source_type` components can bind to `capability`.
pub(crate) fn run(platform: &Platform, source_type: &str, capability: &str) -> Result<String> {
    match platform.check_binding(source_type, capability) {
        BindingCompatibility::Compatible => {
            let strategy = platform.binders().resolve(source_type, capability)?;
            let access: Vec<&str> = strategy.supported_access().iter().map(|a| a.as_str()).collect();

            let mut out = String::new();
            writeln!(
                out,
                "{}",
                Theme::success(&format!("{source_type} can bind to {capability}"))
            )?;
            writeln!(out, "  access: {}", access.join(", "))?;
            Ok(out)
        },
        BindingCompatibility::Incompatible { suggestion } => {
            let available = platform.binders().capabilities_for(source_type);
            let mut message = format!("{source_type} cannot bind to {capability}");
            if let Some(suggestion) = suggestion {
                write!(message, " (did you mean '{suggestion}'?)")?;
            }
            if available.is_empty() {
                write!(message, "; {source_type} has no binder strategies")?;
            } else {
                write!(message, "; it can bind to: {}", available.join(", "))?;
            }
            bail!(message)
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compatible() {
        let out = run(Platform::shared().unwrap(), "lambda-api", "queue:sqs").unwrap();
        assert!(out.contains("lambda-api can bind to queue:sqs"));
        assert!(out.contains("access: read, write, readwrite"));
    }

    #[test]
    fn test_incompatible_with_suggestion() {
        let err = run(Platform::shared().unwrap(), "lambda-worker", "db:postgre").unwrap_err();
        let text = err.to_string();
        assert!(text.contains("did you mean 'db:postgres'?"));
        assert!(text.contains("it can bind to: db:postgres, queue:sqs, storage:s3"));
    }

    #[test]
    fn test_source_without_strategies() {
        let err = run(Platform::shared().unwrap(), "s3-bucket", "queue:sqs").unwrap_err();
        assert!(err.to_string().contains("s3-bucket has no binder strategies"));
    }
}
