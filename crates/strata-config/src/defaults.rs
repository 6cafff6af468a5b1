//! Organization platform-defaults file.
//!
//! A YAML mapping keyed by component type. Each entry is deep-merged over the
//! component type's built-in platform defaults to form layer 2:
//!
//! ```yaml
//! lambda-api:
//!   memorySize: 512
//!   tags:
//!     cost-center: "4411"
//! s3-bucket:
//!   versioned: true
//! ```

use std::collections::BTreeMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use serde_json::Value;
use tracing::{debug, info};

use crate::error::{ConfigMergeError, ConfigResult};

/// Maximum allowed platform-defaults file size (1 MB).
pub const MAX_DEFAULTS_FILE_SIZE: u64 = 1_048_576;

/// Organization defaults, keyed by component type.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlatformDefaults {
    by_type: BTreeMap<String, Value>,
    source: Option<String>,
}

impl PlatformDefaults {
    /// No organization defaults.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Load defaults from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, exceeds
    /// [`MAX_DEFAULTS_FILE_SIZE`], is not valid YAML, or is not a mapping of
    /// component type to mapping.
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let display = path.display().to_string();
        let read_error = |source| ConfigMergeError::ReadError {
            path: display.clone(),
            source,
        };
        let too_large = |size: u64| ConfigMergeError::ValidationError {
            field: display.clone(),
            message: format!(
                "platform defaults file is {size} bytes, exceeding the \
                 {MAX_DEFAULTS_FILE_SIZE} byte limit"
            ),
        };

        let file = File::open(path).map_err(read_error)?;
        let size = file.metadata().map_err(read_error)?.len();
        if size > MAX_DEFAULTS_FILE_SIZE {
            return Err(too_large(size));
        }

        // Bounded read: a file that grew after the stat is still rejected.
        let mut content = String::new();
        file.take(MAX_DEFAULTS_FILE_SIZE.saturating_add(1))
            .read_to_string(&mut content)
            .map_err(read_error)?;
        if content.len() as u64 > MAX_DEFAULTS_FILE_SIZE {
            return Err(too_large(content.len() as u64));
        }

        let mut defaults = Self::from_yaml_str(&display, &content)?;
        defaults.source = Some(display);
        info!(
            path = %path.display(),
            types = defaults.by_type.len(),
            "Loaded platform defaults"
        );
        Ok(defaults)
    }

    /// Parse defaults from YAML text. `source` names the text in errors.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not valid YAML or does not have the
    /// expected shape.
    pub fn from_yaml_str(source: &str, content: &str) -> ConfigResult<Self> {
        if content.trim().is_empty() {
            return Ok(Self::empty());
        }
        let tree: Value =
            serde_yaml::from_str(content).map_err(|e| ConfigMergeError::ParseError {
                path: source.to_owned(),
                source: e,
            })?;
        Self::from_value(tree)
    }

    /// Build defaults from an already-parsed tree.
    ///
    /// An empty document (`null`) yields no defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigMergeError::ValidationError`] if the root or any entry
    /// is not a mapping.
    pub fn from_value(tree: Value) -> ConfigResult<Self> {
        let map = match tree {
            Value::Null => return Ok(Self::empty()),
            Value::Object(map) => map,
            _ => {
                return Err(ConfigMergeError::ValidationError {
                    field: "<root>".to_owned(),
                    message: "platform defaults must be a mapping keyed by component type"
                        .to_owned(),
                });
            },
        };

        let mut by_type = BTreeMap::new();
        for (type_name, entry) in map {
            if !entry.is_object() {
                return Err(ConfigMergeError::ValidationError {
                    field: type_name,
                    message: "defaults for a component type must be a mapping".to_owned(),
                });
            }
            debug!(component_type = %type_name, "platform defaults entry");
            by_type.insert(type_name, entry);
        }

        Ok(Self {
            by_type,
            source: None,
        })
    }

    /// Add or replace the defaults for one component type.
    #[must_use]
    pub fn with_type(mut self, type_name: impl Into<String>, defaults: Value) -> Self {
        self.by_type.insert(type_name.into(), defaults);
        self
    }

    /// Defaults for `type_name`, if any.
    #[must_use]
    pub fn get(&self, type_name: &str) -> Option<&Value> {
        self.by_type.get(type_name)
    }

    /// Component types that have defaults.
    pub fn type_names(&self) -> impl Iterator<Item = &str> {
        self.by_type.keys().map(String::as_str)
    }

    /// File the defaults were loaded from.
    #[must_use]
    pub fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }

    /// Whether no defaults are configured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_type.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_yaml_str() {
        let defaults = PlatformDefaults::from_yaml_str(
            "<test>",
            "lambda-api:\n  memorySize: 512\ns3-bucket:\n  versioned: true\n",
        )
        .unwrap();
        assert_eq!(defaults.get("lambda-api"), Some(&json!({ "memorySize": 512 })));
        assert!(defaults.get("sqs-queue").is_none());
        assert_eq!(
            defaults.type_names().collect::<Vec<_>>(),
            vec!["lambda-api", "s3-bucket"]
        );
    }

    #[test]
    fn test_empty_document() {
        let defaults = PlatformDefaults::from_yaml_str("<test>", "").unwrap();
        assert!(defaults.is_empty());
    }

    #[test]
    fn test_rejects_non_mapping_entry() {
        let err = PlatformDefaults::from_yaml_str("<test>", "lambda-api: 5\n").unwrap_err();
        assert!(matches!(
            err,
            ConfigMergeError::ValidationError { ref field, .. } if field == "lambda-api"
        ));
    }

    #[test]
    fn test_rejects_non_mapping_root() {
        let err = PlatformDefaults::from_yaml_str("<test>", "- a\n").unwrap_err();
        assert!(matches!(err, ConfigMergeError::ValidationError { .. }));
    }

    #[test]
    fn test_load_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("platform.yml");
        std::fs::write(&path, "sqs-queue:\n  visibilityTimeout: 60\n").unwrap();

        let defaults = PlatformDefaults::load(&path).unwrap();
        assert_eq!(defaults.get("sqs-queue").unwrap()["visibilityTimeout"], 60);
        assert_eq!(defaults.source(), Some(path.display().to_string().as_str()));
    }

    #[test]
    fn test_load_missing_file() {
        let err = PlatformDefaults::load(Path::new("/nonexistent/platform.yml")).unwrap_err();
        assert!(matches!(err, ConfigMergeError::ReadError { .. }));
    }

    #[test]
    fn test_oversized_file_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("huge.yml");
        let data = "x: \"".to_owned() + &"a".repeat(1_100_000) + "\"";
        std::fs::write(&path, data).unwrap();

        let result = PlatformDefaults::load(&path);
        assert!(
            matches!(result, Err(ConfigMergeError::ValidationError { .. })),
            "Expected ValidationError for oversized file, got: {result:?}"
        );
    }

    #[test]
    fn test_oversized_file_rejected_without_reading() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sparse.yml");
        let file = std::fs::File::create(&path).unwrap();
        file.set_len(MAX_DEFAULTS_FILE_SIZE.saturating_add(1)).unwrap();
        std::fs::OpenOptions::new()
            .write(true)
            .open(&path)
            .and_then(|mut f| std::io::Write::write_all(&mut f, &[0xFF]))
            .unwrap();

        let err = PlatformDefaults::load(&path).unwrap_err();
        assert!(
            matches!(err, ConfigMergeError::ValidationError { .. }),
            "Expected ValidationError, got: {err:?}"
        );
    }
}
