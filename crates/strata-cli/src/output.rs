//! Output formats for machine-readable command output.

use anyhow::{Context, Result};
use clap::ValueEnum;
use serde::Serialize;
use strata_config::ShowFormat;

/// How `plan` and `resolve` print their result.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    /// YAML (resolved configuration is annotated with source layers).
    #[default]
    Yaml,
    /// Pretty-printed JSON.
    Json,
}

impl OutputFormat {
    /// Serialize `value` in this format, newline-terminated.
    pub(crate) fn render<T: Serialize>(self, value: &T) -> Result<String> {
        match self {
            Self::Yaml => serde_yaml::to_string(value).context("failed to render YAML"),
            Self::Json => serde_json::to_string_pretty(value)
                .map(|mut text| {
                    text.push('\n');
                    text
                })
                .context("failed to render JSON"),
        }
    }

    /// The matching annotated display format.
    pub(crate) fn show_format(self) -> ShowFormat {
        match self {
            Self::Yaml => ShowFormat::Yaml,
            Self::Json => ShowFormat::Json,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_render() {
        let value = json!({ "service": "orders" });
        assert_eq!(OutputFormat::Yaml.render(&value).unwrap(), "service: orders\n");
        assert_eq!(
            OutputFormat::Json.render(&value).unwrap(),
            "{\n  \"service\": \"orders\"\n}\n"
        );
    }
}
