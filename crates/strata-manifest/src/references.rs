//! Reference and governance validation.
//!
//! Two independent checks over a hydrated tree:
//! - every `components[i].binds[j].to` names a declared component;
//! - every `governance.cdkNag.suppress[k]` record is complete and its
//!   `expiresOn` is a real calendar date.
//!
//! Each check collects all of its violations. Binding problems are reported
//! first; suppression records are only examined once bindings are sound.

use std::collections::BTreeSet;

use chrono::{NaiveDate, Utc};
use serde_json::Value;
use strata_core::manifest::{EXPIRY_DATE_FORMAT, parse_expiry};
use strata_core::path::{join_index, join_key};
use tracing::debug;

use crate::error::{ManifestError, ManifestResult, Violation};
use crate::warning::Warning;

/// Fields every suppression record must carry.
pub const SUPPRESSION_FIELDS: &[&str] = &["id", "justification", "owner", "expiresOn"];

const SUPPRESS_PATH: &str = "governance.cdkNag.suppress";

/// Validates references against a fixed notion of "today".
#[derive(Debug, Clone, Copy)]
pub struct ReferenceValidator {
    today: NaiveDate,
}

impl Default for ReferenceValidator {
    fn default() -> Self {
        Self::new()
    }
}

impl ReferenceValidator {
    /// Create a validator using the current UTC date for expiry warnings.
    #[must_use]
    pub fn new() -> Self {
        Self {
            today: Utc::now().date_naive(),
        }
    }

    /// Use a fixed date for expiry warnings.
    #[must_use]
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = today;
        self
    }

    /// Run both checks over `tree`.
    ///
    /// Returns warnings for suppressions that have already expired.
    ///
    /// # Errors
    ///
    /// Returns [`ManifestError::Reference`] listing every dangling binding, or
    /// [`ManifestError::Governance`] listing every suppression problem.
    pub fn validate(&self, tree: &Value) -> ManifestResult<Vec<Warning>> {
        let dangling = dangling_bindings(tree);
        if !dangling.is_empty() {
            debug!(count = dangling.len(), "dangling bindings");
            return Err(ManifestError::Reference {
                violations: dangling,
            });
        }

        let (violations, warnings) = self.check_suppressions(tree);
        if !violations.is_empty() {
            debug!(count = violations.len(), "invalid suppression records");
            return Err(ManifestError::Governance { violations });
        }

        Ok(warnings)
    }

    fn check_suppressions(&self, tree: &Value) -> (Vec<Violation>, Vec<Warning>) {
        let mut violations = Vec::new();
        let mut warnings = Vec::new();

        let records = tree
            .pointer("/governance/cdkNag/suppress")
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or_default();

        for (index, record) in records.iter().enumerate() {
            let path = join_index(SUPPRESS_PATH, index);
            for field in SUPPRESSION_FIELDS {
                let present = record
                    .get(field)
                    .and_then(Value::as_str)
                    .is_some_and(|s| !s.trim().is_empty());
                if !present {
                    violations.push(Violation {
                        path: join_key(&path, field),
                        message: format!("suppression record is missing required field '{field}'"),
                    });
                }
            }

            let Some(raw) = record.get("expiresOn").and_then(Value::as_str) else {
                continue;
            };
            if raw.trim().is_empty() {
                continue;
            }
            match parse_expiry(raw) {
                Some(expiry) if expiry < self.today => {
                    let id = record.get("id").and_then(Value::as_str).unwrap_or("<unknown>");
                    warnings.push(Warning::new(
                        join_key(&path, "expiresOn"),
                        format!("suppression '{id}' expired on {expiry}"),
                    ));
                },
                Some(_) => {},
                None => violations.push(Violation {
                    path: join_key(&path, "expiresOn"),
                    message: format!(
                        "'{raw}' is not a valid calendar date (expected {EXPIRY_DATE_FORMAT})"
                    ),
                }),
            }
        }

        (violations, warnings)
    }
}

/// Validate references using today's date.
///
/// # Errors
///
/// See [`ReferenceValidator::validate`].
pub fn validate_references(tree: &Value) -> ManifestResult<Vec<Warning>> {
    ReferenceValidator::new().validate(tree)
}

fn dangling_bindings(tree: &Value) -> Vec<Violation> {
    let components = tree
        .get("components")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default();

    let declared: BTreeSet<&str> = components
        .iter()
        .filter_map(|c| c.get("name").and_then(Value::as_str))
        .collect();

    let mut violations = Vec::new();
    for (ci, component) in components.iter().enumerate() {
        let binds = component
            .get("binds")
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or_default();
        for (bi, bind) in binds.iter().enumerate() {
            let target = bind.get("to").and_then(Value::as_str).unwrap_or_default();
            if !declared.contains(target) {
                violations.push(Violation {
                    path: join_index(&join_key(&join_index("components", ci), "binds"), bi),
                    message: format!("binding references non-existent component '{target}'"),
                });
            }
        }
    }
    violations
}
