//! Log subscriber setup for the engine and its CLI.
//!
//! Verbosity only raises the level of the engine's own crates; dependencies
//! stay at `warn` unless an explicit directive says otherwise. Events go to
//! stderr or to daily files, never to stdout, which carries command output.

use std::path::PathBuf;
use std::str::FromStr;

use chrono::Utc;
use tracing_appender::rolling;
use tracing_subscriber::filter::Directive;
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::time::FormatTime;
use tracing_subscriber::fmt::{self, MakeWriter};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, Registry};

use crate::error::{TelemetryError, TelemetryResult};

/// Tracing targets of the engine crates.
pub const ENGINE_TARGETS: &[&str] = &[
    "strata",
    "strata_core",
    "strata_manifest",
    "strata_config",
    "strata_capabilities",
    "strata_platform",
];

/// Prefix of daily log files (`strata.2026-01-15`).
const FILE_PREFIX: &str = "strata";

/// Level applied to everything outside [`ENGINE_TARGETS`].
const DEPENDENCY_LEVEL: &str = "warn";

/// Event format selected by `--log-format`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// One line per event.
    #[default]
    Compact,
    /// Multi-line, for reading a single run.
    Pretty,
    /// Newline-delimited JSON for log shippers.
    Json,
}

impl FromStr for LogFormat {
    type Err = TelemetryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "compact" => Ok(Self::Compact),
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            _ => Err(TelemetryError::UnknownFormat(s.to_owned())),
        }
    }
}

/// Where events are written.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum LogTarget {
    /// Standard error, colorized.
    #[default]
    Stderr,
    /// Files under this directory, one per day. Created if missing.
    DailyFiles(PathBuf),
}

/// Subscriber settings derived from the CLI flags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    /// Level of the engine crates.
    pub level: &'static str,
    /// Event format.
    pub format: LogFormat,
    /// Output target.
    pub target: LogTarget,
    /// Extra `target=level` directives, applied after the engine level.
    pub directives: Vec<String>,
}

impl LogConfig {
    /// Engine level for a `-v` count: none → warn, `-v` → info, `-vv` →
    /// debug, more → trace.
    #[must_use]
    pub fn from_verbosity(verbose: u8) -> Self {
        let level = match verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        };
        Self {
            level,
            format: LogFormat::default(),
            target: LogTarget::default(),
            directives: Vec::new(),
        }
    }

    /// Use `format` for events.
    #[must_use]
    pub fn with_format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    /// Write to daily files under `directory` instead of stderr.
    #[must_use]
    pub fn with_daily_files(mut self, directory: impl Into<PathBuf>) -> Self {
        self.target = LogTarget::DailyFiles(directory.into());
        self
    }

    /// Append one `target=level` directive.
    #[must_use]
    pub fn with_directive(mut self, directive: impl Into<String>) -> Self {
        self.directives.push(directive.into());
        self
    }

    /// Append the comma-separated directives held by environment variable
    /// `var`, if it is set.
    #[must_use]
    pub fn with_env_directives(self, var: &str) -> Self {
        let Ok(value) = std::env::var(var) else {
            return self;
        };
        value
            .split(',')
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .fold(self, Self::with_directive)
    }

    fn engine_directives(&self) -> impl Iterator<Item = String> + '_ {
        ENGINE_TARGETS
            .iter()
            .map(|target| format!("{target}={}", self.level))
            .chain(self.directives.iter().cloned())
    }

    fn filter(&self) -> TelemetryResult<EnvFilter> {
        self.engine_directives()
            .try_fold(EnvFilter::new(DEPENDENCY_LEVEL), |filter, directive| {
                let parsed: Directive =
                    directive.parse().map_err(|e| TelemetryError::InvalidDirective {
                        directive: directive.clone(),
                        message: format!("{e}"),
                    })?;
                Ok(filter.add_directive(parsed))
            })
    }

    fn fmt_layer<W>(&self, writer: W, ansi: bool) -> Box<dyn Layer<Registry> + Send + Sync>
    where
        W: for<'a> MakeWriter<'a> + Send + Sync + 'static,
    {
        let layer = fmt::layer()
            .with_writer(writer)
            .with_ansi(ansi)
            .with_timer(UtcMillis);
        match self.format {
            LogFormat::Compact => layer.compact().boxed(),
            LogFormat::Pretty => layer.pretty().boxed(),
            LogFormat::Json => layer.json().boxed(),
        }
    }
}

/// RFC 3339 UTC timestamps with millisecond precision.
#[derive(Debug, Clone, Copy)]
struct UtcMillis;

impl FormatTime for UtcMillis {
    fn format_time(&self, w: &mut Writer<'_>) -> std::fmt::Result {
        write!(w, "{}", Utc::now().format("%Y-%m-%dT%H:%M:%S%.3fZ"))
    }
}

/// Install the global subscriber described by `config`.
///
/// # Errors
///
/// Returns an error if a directive does not parse, the log directory cannot
/// be created, or a subscriber is already installed.
pub fn setup_logging(config: &LogConfig) -> TelemetryResult<()> {
    let filter = config.filter()?;

    let layer = match &config.target {
        LogTarget::Stderr => config.fmt_layer(std::io::stderr, true),
        LogTarget::DailyFiles(directory) => {
            std::fs::create_dir_all(directory).map_err(|source| TelemetryError::LogDirectory {
                path: directory.clone(),
                source,
            })?;
            config.fmt_layer(rolling::daily(directory, FILE_PREFIX), false)
        },
    };

    tracing_subscriber::registry()
        .with(layer)
        .with(filter)
        .try_init()
        .map_err(|e| TelemetryError::AlreadyInitialized(e.to_string()))
}
