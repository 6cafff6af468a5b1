//! Shared enums: compliance frameworks and binding access levels.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A string did not name a known enum variant.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {kind} '{value}'; expected one of: {expected}")]
pub struct UnknownVariant {
    /// What was being parsed (e.g. "compliance framework").
    pub kind: &'static str,
    /// The rejected input.
    pub value: String,
    /// Comma-separated list of accepted values.
    pub expected: &'static str,
}

/// Compliance strictness tier.
///
/// Variants are declared from least to most strict, so the derived `Ord`
/// can be used to gate escalating defaults (`framework >= FedrampModerate`).
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "kebab-case")]
pub enum ComplianceFramework {
    /// No regulatory baseline.
    #[default]
    Commercial,
    /// `FedRAMP` Low baseline.
    FedrampLow,
    /// `FedRAMP` Moderate baseline.
    FedrampModerate,
    /// `FedRAMP` High baseline.
    FedrampHigh,
}

impl ComplianceFramework {
    /// Every framework, least strict first.
    pub const ALL: [Self; 4] = [
        Self::Commercial,
        Self::FedrampLow,
        Self::FedrampModerate,
        Self::FedrampHigh,
    ];

    /// The manifest spelling of this framework.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Commercial => "commercial",
            Self::FedrampLow => "fedramp-low",
            Self::FedrampModerate => "fedramp-moderate",
            Self::FedrampHigh => "fedramp-high",
        }
    }

    /// Whether this is any `FedRAMP` baseline.
    #[must_use]
    pub fn is_fedramp(self) -> bool {
        !matches!(self, Self::Commercial)
    }
}

impl fmt::Display for ComplianceFramework {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ComplianceFramework {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|f| f.as_str() == s)
            .ok_or_else(|| UnknownVariant {
                kind: "compliance framework",
                value: s.to_owned(),
                expected: "commercial, fedramp-low, fedramp-moderate, fedramp-high",
            })
    }
}

/// Access level requested by a binding.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccessLevel {
    /// Read-only access.
    #[default]
    Read,
    /// Write-only access.
    Write,
    /// Read and write access.
    ReadWrite,
    /// Administrative access.
    Admin,
}

impl AccessLevel {
    /// Every access level, narrowest first.
    pub const ALL: [Self; 4] = [Self::Read, Self::Write, Self::ReadWrite, Self::Admin];

    /// The manifest spelling of this access level.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Read => "read",
            Self::Write => "write",
            Self::ReadWrite => "readwrite",
            Self::Admin => "admin",
        }
    }

    /// Whether this level grants read operations.
    #[must_use]
    pub fn can_read(self) -> bool {
        !matches!(self, Self::Write)
    }

    /// Whether this level grants write operations.
    #[must_use]
    pub fn can_write(self) -> bool {
        !matches!(self, Self::Read)
    }
}

impl fmt::Display for AccessLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AccessLevel {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|a| a.as_str() == s)
            .ok_or_else(|| UnknownVariant {
                kind: "access level",
                value: s.to_owned(),
                expected: "read, write, readwrite, admin",
            })
    }
}
