//! Manifest pipeline error types.
//!
//! Every error is path-qualified so a manifest author can act on it without
//! reading engine code. Errors that can occur more than once per manifest
//! carry a list so a single run surfaces every violation.

use std::fmt;
use std::io;

use serde_json::Value;
use thiserror::Error;

/// Pipeline stage, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Stage {
    /// Master schema composition (runs before the first validation).
    Compose,
    /// Text to tree.
    Parse,
    /// Tree against the master schema.
    Schema,
    /// Environment defaults and interpolation.
    Hydrate,
    /// Cross-component references and governance metadata.
    References,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Compose => write!(f, "schema composition"),
            Self::Parse => write!(f, "parse"),
            Self::Schema => write!(f, "schema validation"),
            Self::Hydrate => write!(f, "hydration"),
            Self::References => write!(f, "reference validation"),
        }
    }
}

/// Failure to turn manifest text into a tree.
#[derive(Debug, Error)]
pub enum ParseError {
    /// The file could not be read.
    #[error("Failed to read manifest at {path}: {source}")]
    Unreadable {
        /// Manifest path.
        path: String,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// The file exceeds the size limit.
    #[error("Manifest at {path} is {size} bytes, exceeding the {limit} byte limit")]
    TooLarge {
        /// Manifest path.
        path: String,
        /// Actual size in bytes.
        size: u64,
        /// Maximum allowed size in bytes.
        limit: u64,
    },

    /// The text is not valid YAML.
    #[error("Invalid manifest syntax in {path}: {source}")]
    Syntax {
        /// Manifest path.
        path: String,
        /// Underlying YAML error.
        #[source]
        source: serde_yaml::Error,
    },

    /// Valid YAML, but the document root is not a mapping.
    #[error("Manifest root in {path} must be a mapping, found {found}")]
    NotAnObject {
        /// Manifest path.
        path: String,
        /// Kind of value found at the root.
        found: &'static str,
    },
}

/// A single schema violation.
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaViolation {
    /// Dotted field path (`components[0].name`).
    pub path: String,
    /// What is wrong.
    pub message: String,
    /// The offending value, when the field exists and is a scalar.
    pub value: Option<Value>,
}

impl fmt::Display for SchemaViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path, self.message)?;
        if let Some(value) = &self.value {
            write!(f, " (got {value})")?;
        }
        Ok(())
    }
}

/// Schema validation failed. Always carries every violation found.
#[derive(Debug, Clone, PartialEq, Error)]
pub struct SchemaValidationError {
    /// All violations, in discovery order.
    pub errors: Vec<SchemaViolation>,
}

impl fmt::Display for SchemaValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Manifest failed schema validation with {} error(s):",
            self.errors.len()
        )?;
        for error in &self.errors {
            write!(f, "\n  - {error}")?;
        }
        Ok(())
    }
}

/// A path-qualified violation found by reference or governance checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    /// Dotted path of the offending element.
    pub path: String,
    /// What is wrong.
    pub message: String,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path, self.message)
    }
}

fn write_violations(f: &mut fmt::Formatter<'_>, violations: &[Violation]) -> fmt::Result {
    for v in violations {
        write!(f, "\n  - {v}")?;
    }
    Ok(())
}

/// Errors produced by the manifest pipeline.
#[derive(Debug, Error)]
pub enum ManifestError {
    /// A component type registered a malformed schema fragment.
    #[error("Component type '{type_name}' registered a malformed config schema: {reason}")]
    SchemaComposition {
        /// The offending component type.
        type_name: String,
        /// Why the fragment was rejected.
        reason: String,
    },

    /// The composed master schema could not be compiled.
    #[error("Master schema failed to compile: {reason}")]
    MasterSchema {
        /// Compiler message.
        reason: String,
    },

    /// Text could not be parsed.
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// The tree violates the master schema.
    #[error(transparent)]
    Schema(#[from] SchemaValidationError),

    /// Hydration could not run.
    #[error("Hydration failed at {path}: {message}")]
    Hydration {
        /// Offending path.
        path: String,
        /// What went wrong.
        message: String,
    },

    /// One or more bindings point at components that do not exist.
    #[error("Manifest has {} dangling reference(s):{}", .violations.len(), DisplayList(.violations))]
    Reference {
        /// Every dangling binding.
        violations: Vec<Violation>,
    },

    /// One or more suppression records are incomplete or invalid.
    #[error("Manifest has {} invalid suppression record(s):{}", .violations.len(), DisplayList(.violations))]
    Governance {
        /// Every suppression problem.
        violations: Vec<Violation>,
    },

    /// A validated tree could not be converted into the typed model.
    #[error("Resolved manifest does not match the manifest model: {source}")]
    Model {
        /// Underlying deserialization error.
        #[source]
        source: serde_json::Error,
    },
}

impl ManifestError {
    /// The pipeline stage that produced this error.
    #[must_use]
    pub fn stage(&self) -> Stage {
        match self {
            Self::SchemaComposition { .. } | Self::MasterSchema { .. } => Stage::Compose,
            Self::Parse(_) => Stage::Parse,
            Self::Schema(_) => Stage::Schema,
            Self::Hydration { .. } => Stage::Hydrate,
            Self::Reference { .. } | Self::Governance { .. } | Self::Model { .. } => {
                Stage::References
            },
        }
    }
}

/// Renders a violation list as indented bullet lines.
struct DisplayList<'a>(&'a [Violation]);

impl fmt::Display for DisplayList<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_violations(f, self.0)
    }
}

/// Result type for manifest operations.
pub type ManifestResult<T> = Result<T, ManifestError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_error_lists_every_violation() {
        let err = SchemaValidationError {
            errors: vec![
                SchemaViolation {
                    path: "owner".to_owned(),
                    message: "Missing required field: owner".to_owned(),
                    value: None,
                },
                SchemaViolation {
                    path: "components[0].name".to_owned(),
                    message: "does not match pattern".to_owned(),
                    value: Some(Value::String("Bad".to_owned())),
                },
            ],
        };
        let text = err.to_string();
        assert!(text.contains("2 error(s)"));
        assert!(text.contains("Missing required field: owner"));
        assert!(text.contains("components[0].name: does not match pattern (got \"Bad\")"));
    }

    #[test]
    fn test_reference_error_display() {
        let err = ManifestError::Reference {
            violations: vec![Violation {
                path: "components[0].binds[0]".to_owned(),
                message: "binding references non-existent component 'db'".to_owned(),
            }],
        };
        let text = err.to_string();
        assert!(text.contains("1 dangling reference(s)"));
        assert!(text.contains("components[0].binds[0]"));
        assert_eq!(err.stage(), Stage::References);
    }

    #[test]
    fn test_stage_order() {
        assert!(Stage::Parse < Stage::Schema);
        assert!(Stage::Hydrate < Stage::References);
    }
}
