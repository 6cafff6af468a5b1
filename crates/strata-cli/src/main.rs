//! Strata CLI - validate, plan and resolve service manifests.
//!
//! Every command runs inside a span carrying a fresh run id. Results go to
//! stdout, warnings and errors to stderr, and any failure exits non-zero
//! with the full error text.

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use strata_platform::Platform;
use strata_telemetry::{LogConfig, LogFormat, RunContext, setup_logging};
use tracing::debug;

mod commands;
mod output;
mod theme;

use commands::{check_binding, plan, resolve, validate};
use output::OutputFormat;
use theme::Theme;

/// Strata - manifest resolution and capability binding
#[derive(Parser)]
#[command(name = "strata")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Increase engine log verbosity (-v info, -vv debug, -vvv trace).
    /// `STRATA_LOG` adds comma-separated target=level directives.
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    /// Log format: compact, pretty or json
    #[arg(long, global = true, default_value = "compact", env = "STRATA_LOG_FORMAT")]
    log_format: String,

    /// Write logs to daily rotated files in this directory instead of stderr
    #[arg(long, global = true, env = "STRATA_LOG_DIR")]
    log_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse and schema-validate a manifest
    Validate {
        /// Path to the manifest
        manifest: PathBuf,
    },

    /// Bind a manifest to one environment and check its references
    Plan {
        /// Path to the manifest
        manifest: PathBuf,
        /// Target environment
        #[arg(short, long)]
        env: String,
        /// Output format
        #[arg(short, long, value_enum, default_value_t)]
        format: OutputFormat,
    },

    /// Resolve component configuration and bindings
    Resolve {
        /// Path to the manifest
        manifest: PathBuf,
        /// Target environment
        #[arg(short, long)]
        env: String,
        /// Organization platform-defaults file (YAML keyed by component type)
        #[arg(long, env = "STRATA_PLATFORM_DEFAULTS")]
        platform_defaults: Option<PathBuf>,
        /// Show only this component and its bindings
        #[arg(short, long)]
        component: Option<String>,
        /// Output format
        #[arg(short, long, value_enum, default_value_t)]
        format: OutputFormat,
    },

    /// Check whether a component type can bind to a capability
    CheckBinding {
        /// Type of the binding component, e.g. lambda-api
        source_type: String,
        /// Capability key, e.g. db:postgres
        capability: String,
    },
}

impl Commands {
    fn run_context(&self) -> RunContext {
        match self {
            Self::Validate { manifest } => {
                RunContext::new("validate").with_manifest(manifest.display().to_string())
            },
            Self::Plan { manifest, env, .. } => RunContext::new("plan")
                .with_manifest(manifest.display().to_string())
                .with_environment(env.as_str()),
            Self::Resolve { manifest, env, .. } => RunContext::new("resolve")
                .with_manifest(manifest.display().to_string())
                .with_environment(env.as_str()),
            Self::CheckBinding {
                source_type,
                capability,
            } => RunContext::new("check-binding")
                .with_metadata("source_type", source_type.as_str())
                .with_metadata("capability", capability.as_str()),
        }
    }
}

fn log_config(cli: &Cli) -> Result<LogConfig> {
    let format: LogFormat = cli.log_format.parse()?;
    let mut config = LogConfig::from_verbosity(cli.verbose)
        .with_format(format)
        .with_env_directives("STRATA_LOG");
    if let Some(dir) = &cli.log_dir {
        config = config.with_daily_files(dir);
    }
    Ok(config)
}

fn run(command: Commands) -> Result<String> {
    let platform = Platform::shared().context("failed to initialize the component catalogue")?;

    match command {
        Commands::Validate { manifest } => validate::run(platform, &manifest),
        Commands::Plan {
            manifest,
            env,
            format,
        } => plan::run(platform, &manifest, &env, format),
        Commands::Resolve {
            manifest,
            env,
            platform_defaults,
            component,
            format,
        } => resolve::run(
            platform,
            &resolve::ResolveArgs {
                manifest: &manifest,
                environment: &env,
                platform_defaults: platform_defaults.as_deref(),
                component: component.as_deref(),
                format,
            },
        ),
        Commands::CheckBinding {
            source_type,
            capability,
        } => check_binding::run(platform, &source_type, &capability),
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match log_config(&cli) {
        Ok(config) => {
            if let Err(e) = setup_logging(&config) {
                eprintln!("{}", Theme::warning(&format!("Failed to initialize logging: {e}")));
            }
        },
        Err(e) => eprintln!("{}", Theme::warning(&format!("Invalid log configuration: {e}"))),
    }

    let ctx = cli.command.run_context();
    let span = ctx.span();
    let _entered = span.enter();

    let result = run(cli.command);
    debug!(elapsed_ms = ctx.elapsed_ms(), ok = result.is_ok(), "command finished");

    match result {
        Ok(output) => {
            print!("{output}");
            ExitCode::SUCCESS
        },
        Err(e) => {
            eprintln!("{}", Theme::error(&format!("{e:#}")));
            ExitCode::FAILURE
        },
    }
}
