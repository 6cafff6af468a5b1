//! Non-fatal findings surfaced alongside a successful result.

use std::fmt;

use serde::Serialize;

/// A non-fatal finding with the path it concerns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Warning {
    /// Dotted path of the element concerned.
    pub path: String,
    /// Human-readable description.
    pub message: String,
}

impl Warning {
    /// Create a warning.
    #[must_use]
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path, self.message)
    }
}
