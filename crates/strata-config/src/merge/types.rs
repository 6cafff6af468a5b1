use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

/// Which precedence layer a value came from. Higher layers win.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ConfigLayer {
    /// Baseline compiled into the component type.
    HardcodedFallback = 1,
    /// Organization-wide defaults (built in, plus the platform-defaults file).
    PlatformDefault = 2,
    /// Defaults of the active compliance framework.
    EnvironmentDefault = 3,
    /// The manifest's `config` block.
    ComponentOverride = 4,
    /// Governance-mandated values.
    PolicyOverride = 5,
}

impl ConfigLayer {
    /// Every layer, in application order.
    pub const ALL: [Self; 5] = [
        Self::HardcodedFallback,
        Self::PlatformDefault,
        Self::EnvironmentDefault,
        Self::ComponentOverride,
        Self::PolicyOverride,
    ];

    /// Numeric precedence (1-5).
    #[must_use]
    pub fn precedence(self) -> u8 {
        self as u8
    }

    /// Short name used in annotations.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::HardcodedFallback => "hardcoded-fallback",
            Self::PlatformDefault => "platform-default",
            Self::EnvironmentDefault => "environment-default",
            Self::ComponentOverride => "component-override",
            Self::PolicyOverride => "policy-override",
        }
    }
}

impl fmt::Display for ConfigLayer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Tracks which layer set each leaf field, keyed by dotted path.
pub type FieldSources = BTreeMap<String, ConfigLayer>;
