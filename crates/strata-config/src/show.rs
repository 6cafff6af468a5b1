//! Source-annotated display for `strata resolve`.
//!
//! Prints a resolved component configuration with annotations showing which
//! precedence layer set each value.

use std::fmt::{self, Write as _};

use serde_json::{Value, json};

use crate::resolver::ResolvedComponentConfig;

/// Output format for resolved configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ShowFormat {
    /// YAML with inline comments showing the source layer.
    #[default]
    Yaml,
    /// JSON with a `fieldSources` map (for programmatic consumption).
    Json,
}

impl ResolvedComponentConfig {
    /// Format the resolved config with source annotations.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn show(&self, format: ShowFormat) -> Result<String, fmt::Error> {
        match format {
            ShowFormat::Yaml => self.show_yaml(),
            ShowFormat::Json => self.show_json(),
        }
    }

    fn show_yaml(&self) -> Result<String, fmt::Error> {
        let yaml = serde_yaml::to_string(&self.config).map_err(|_| fmt::Error)?;

        let mut output = String::new();
        writeln!(
            output,
            "# {} ({}, {})",
            self.component_name, self.component_type, self.framework
        )?;

        let mut stack: Vec<(usize, String)> = Vec::new();
        for line in yaml.lines() {
            match self.annotate_line(line, &mut stack) {
                Some(layer) => writeln!(output, "{line}  # [{layer}]")?,
                None => writeln!(output, "{line}")?,
            }
        }

        Ok(output)
    }

    fn show_json(&self) -> Result<String, fmt::Error> {
        let sources: serde_json::Map<String, Value> = self
            .field_sources
            .iter()
            .map(|(path, layer)| (path.clone(), Value::String(layer.as_str().to_owned())))
            .collect();

        let doc = json!({
            "component": self.component_name,
            "type": self.component_type,
            "framework": self.framework,
            "config": self.config,
            "fieldSources": sources,
        });
        serde_json::to_string_pretty(&doc).map_err(|_| fmt::Error)
    }

    /// Track the key path of a YAML line and return the layer that set it.
    ///
    /// Only `key: value` and `key:` lines of nested mappings are annotated;
    /// sequence items belong to the key that owns the sequence.
    fn annotate_line(&self, line: &str, stack: &mut Vec<(usize, String)>) -> Option<String> {
        let trimmed = line.trim_start();
        if trimmed.is_empty() || trimmed.starts_with('#') || trimmed.starts_with('-') {
            return None;
        }

        let indent = line.len().saturating_sub(trimmed.len());
        let (key, _) = trimmed.split_once(':')?;
        let key = key.trim().trim_matches(|c| c == '\'' || c == '"');

        while stack.last().is_some_and(|(depth, _)| *depth >= indent) {
            stack.pop();
        }
        stack.push((indent, key.to_owned()));

        let path = stack
            .iter()
            .map(|(_, k)| k.as_str())
            .collect::<Vec<_>>()
            .join(".");

        self.field_sources
            .get(&path)
            .map(|layer| layer.as_str().to_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::merge::{ConfigLayer, FieldSources};
    use strata_core::ComplianceFramework;

    fn resolved() -> ResolvedComponentConfig {
        let mut field_sources = FieldSources::new();
        field_sources.insert("memorySize".to_owned(), ConfigLayer::ComponentOverride);
        field_sources.insert("logging.level".to_owned(), ConfigLayer::HardcodedFallback);
        field_sources.insert("logging.retentionDays".to_owned(), ConfigLayer::PolicyOverride);
        field_sources.insert("subnets".to_owned(), ConfigLayer::PlatformDefault);

        ResolvedComponentConfig {
            component_name: "api".to_owned(),
            component_type: "lambda-api".to_owned(),
            framework: ComplianceFramework::FedrampHigh,
            config: json!({
                "memorySize": 512,
                "logging": { "level": "info", "retentionDays": 365 },
                "subnets": ["a", "b"]
            }),
            field_sources,
        }
    }

    #[test]
    fn test_show_yaml_annotates_leaves() {
        let output = resolved().show(ShowFormat::Yaml).unwrap();
        assert!(output.starts_with("# api (lambda-api, fedramp-high)"));
        assert!(output.contains("memorySize: 512  # [component-override]"));
        assert!(output.contains("level: info  # [hardcoded-fallback]"));
        assert!(output.contains("retentionDays: 365  # [policy-override]"));
        assert!(output.contains("subnets:  # [platform-default]"));
    }

    #[test]
    fn test_show_json() {
        let output = resolved().show(ShowFormat::Json).unwrap();
        let parsed: Value = serde_json::from_str(&output).unwrap();
        assert_eq!(parsed["component"], "api");
        assert_eq!(parsed["framework"], "fedramp-high");
        assert_eq!(parsed["fieldSources"]["logging.retentionDays"], "policy-override");
        assert_eq!(parsed["config"]["memorySize"], 512);
    }
}
