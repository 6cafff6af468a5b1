//! Terminal styling for command output.

use colored::Colorize;
use strata_manifest::Warning;

/// Styling helpers. Colors are dropped automatically when stdout or stderr
/// is not a terminal.
pub(crate) struct Theme;

impl Theme {
    /// Section header inside YAML output; stays a valid comment.
    pub(crate) fn header(text: &str) -> String {
        text.bold().cyan().to_string()
    }

    /// A passed check.
    pub(crate) fn success(text: &str) -> String {
        format!("{} {text}", "✓".green().bold())
    }

    /// A failed command.
    pub(crate) fn error(text: &str) -> String {
        format!("{} {}", "error:".red().bold(), text)
    }

    /// A non-fatal pipeline finding.
    pub(crate) fn warning(text: &str) -> String {
        format!("{} {}", "warning:".yellow().bold(), text)
    }

    /// A manifest path such as `components[0].binds[1]`.
    pub(crate) fn path(text: &str) -> String {
        text.dimmed().to_string()
    }
}

/// Print pipeline warnings to stderr so stdout stays machine-readable.
pub(crate) fn print_warnings(warnings: &[Warning]) {
    for warning in warnings {
        eprintln!(
            "{} {}",
            Theme::warning(&warning.message),
            Theme::path(&format!("at {}", warning.path))
        );
    }
}
