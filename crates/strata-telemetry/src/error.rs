//! Telemetry error types.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while installing the log subscriber.
#[derive(Debug, Error)]
pub enum TelemetryError {
    /// `--log-format` named no known format.
    #[error("unknown log format '{0}' (expected compact, pretty or json)")]
    UnknownFormat(String),

    /// A level or directive could not be parsed.
    #[error("invalid log directive '{directive}': {message}")]
    InvalidDirective {
        /// The offending directive.
        directive: String,
        /// Parser message.
        message: String,
    },

    /// The log directory could not be created.
    #[error("cannot create log directory {}: {source}", .path.display())]
    LogDirectory {
        /// Directory that was requested.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// A global subscriber is already installed.
    #[error("logging is already initialized: {0}")]
    AlreadyInitialized(String),
}

/// Result type for telemetry operations.
pub type TelemetryResult<T> = Result<T, TelemetryError>;
