// crates/secret-compare-cli/src/main.rs
// ============================================================================
// Module: Secret Compare CLI Entry Point
// Description: Command dispatcher for secret comparison and timing checks.
// Purpose: Compare secrets from the environment and audit comparator timing.
// Dependencies: clap, secret-compare, serde_json, thiserror, zeroize
// ============================================================================

//! ## Overview
//! `secret-compare` exposes the library over three commands:
//! - `compare` reads two secrets from environment variables (never argv) and
//!   exits 0 when they match, 1 otherwise.
//! - `config validate` loads and validates a configuration file.
//! - `timing` runs the statistical timing harness and prints a JSON report.
//!
//! Security posture: secrets are never echoed. Configuration errors also exit
//! with status 1, so the exit code of `compare` does not distinguish a
//! mismatch from a failure.

// ============================================================================
// SECTION: Modules
// ============================================================================


// ============================================================================
// SECTION: Imports
// ============================================================================

use std::env;
use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Args;
use clap::Parser;
use clap::Subcommand;
use secret_compare::CompareConfig;
use secret_compare::ConfigError;
use secret_compare::Encoded;
use secret_compare::SecretComparator;
use secret_compare::SecretEncoding;
use secret_compare::TimingConfig;
use secret_compare::TimingError;
use secret_compare::TimingReport;
use secret_compare::run_timing_harness;
use thiserror::Error;
use zeroize::Zeroizing;

// ============================================================================
// SECTION: CLI Types
// ============================================================================

/// Top-level CLI definition.
#[derive(Parser, Debug)]
#[command(name = "secret-compare", version, disable_help_subcommand = true)]
struct Cli {
    /// Command to execute.
    #[command(subcommand)]
    command: Commands,
}

/// Top-level commands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Compare two secrets held in environment variables.
    Compare(CompareCommand),
    /// Configuration utilities.
    Config {
        /// Selected config subcommand.
        #[command(subcommand)]
        command: ConfigCommand,
    },
    /// Measure comparison latency by mismatch position.
    Timing(TimingCommand),
}

/// Arguments for `compare`.
#[derive(Args, Debug)]
struct CompareCommand {
    /// Environment variable holding the first secret.
    #[arg(long, value_name = "VAR")]
    left_env: String,
    /// Environment variable holding the second secret.
    #[arg(long, value_name = "VAR")]
    right_env: String,
    /// Encoding of both secrets.
    #[arg(long, value_name = "ENCODING", default_value_t = SecretEncoding::Utf8)]
    encoding: SecretEncoding,
    /// Optional config file path.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
}

/// Config subcommands.
#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Validate a configuration file.
    Validate(ConfigValidateCommand),
}

/// Arguments for `config validate`.
#[derive(Args, Debug)]
struct ConfigValidateCommand {
    /// Optional config file path.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
}

/// Arguments for `timing`.
#[derive(Args, Debug)]
struct TimingCommand {
    /// Optional config file path.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Override `timing.trials`.
    #[arg(long, value_name = "N")]
    trials: Option<u32>,
    /// Override `timing.secret_len`.
    #[arg(long, value_name = "BYTES")]
    secret_len: Option<usize>,
    /// Exit with status 1 when the spread exceeds the tolerance.
    #[arg(long)]
    strict: bool,
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// CLI errors with non-secret messages.
#[derive(Debug, Error)]
enum CliError {
    /// Configuration could not be loaded or applied.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
    /// Timing harness rejected its settings.
    #[error("timing harness failed: {0}")]
    Timing(#[from] TimingError),
    /// Report serialization failed.
    #[error("failed to serialize report: {0}")]
    Serialize(String),
    /// Output stream write failed.
    #[error("failed to write to {stream}: {error}")]
    Output {
        /// Stream label.
        stream: &'static str,
        /// Underlying I/O error.
        error: String,
    },
}

/// CLI result alias for fallible operations.
type CliResult<T> = Result<T, CliError>;

// ============================================================================
// SECTION: Entry Point
// ============================================================================

/// CLI entry point returning an exit code.
fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(err) => emit_error(&err.to_string()),
    }
}

/// Executes the CLI command dispatcher.
fn run() -> CliResult<ExitCode> {
    let cli = Cli::parse();
    match cli.command {
        Commands::Compare(command) => command_compare(&command),
        Commands::Config {
            command,
        } => match command {
            ConfigCommand::Validate(command) => command_config_validate(&command),
        },
        Commands::Timing(command) => command_timing(&command),
    }
}

// ============================================================================
// SECTION: Commands
// ============================================================================

/// Executes the `compare` command.
fn command_compare(command: &CompareCommand) -> CliResult<ExitCode> {
    let config = CompareConfig::load(command.config.as_deref())?;
    let comparator = SecretComparator::from_config(&config)?;
    let left = read_secret_env(&command.left_env);
    let right = read_secret_env(&command.right_env);
    let matched = comparator.compare(
        left.as_deref().map(|text| Encoded::from_bytes(text, command.encoding)),
        right.as_deref().map(|text| Encoded::from_bytes(text, command.encoding)),
    );
    Ok(if matched { ExitCode::SUCCESS } else { ExitCode::FAILURE })
}

/// Executes the `config validate` command.
fn command_config_validate(command: &ConfigValidateCommand) -> CliResult<ExitCode> {
    CompareConfig::load(command.config.as_deref())?;
    write_stdout_line("Config valid.")?;
    Ok(ExitCode::SUCCESS)
}

/// Executes the `timing` command.
fn command_timing(command: &TimingCommand) -> CliResult<ExitCode> {
    let mut config = CompareConfig::load(command.config.as_deref())?;
    apply_timing_overrides(&mut config.timing, command);
    config.timing.validate()?;
    let comparator = SecretComparator::from_config(&config)?;
    let report = run_timing_harness(&comparator, &config.timing)?;
    let payload = serde_json::to_string_pretty(&report)
        .map_err(|err| CliError::Serialize(err.to_string()))?;
    write_stdout_line(&payload)?;
    Ok(if timing_passes(&report, command.strict) { ExitCode::SUCCESS } else { ExitCode::FAILURE })
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Reads a secret from the environment as raw bytes; unset values are absent.
/// Non-UTF-8 values are kept so the comparator decides how to treat them.
fn read_secret_env(name: &str) -> Option<Zeroizing<Vec<u8>>> {
    env::var_os(name).map(|value| Zeroizing::new(value.into_encoded_bytes()))
}

/// Applies command-line overrides to timing settings.
fn apply_timing_overrides(timing: &mut TimingConfig, command: &TimingCommand) {
    if let Some(trials) = command.trials {
        timing.trials = trials;
    }
    if let Some(secret_len) = command.secret_len {
        timing.secret_len = secret_len;
    }
}

/// Returns true unless `strict` is set and the report is out of tolerance.
const fn timing_passes(report: &TimingReport, strict: bool) -> bool {
    !strict || report.within_tolerance
}

/// Writes a single line to stdout.
fn write_stdout_line(message: &str) -> CliResult<()> {
    let mut stdout = std::io::stdout();
    writeln!(&mut stdout, "{message}").map_err(|err| CliError::Output {
        stream: "stdout",
        error: err.to_string(),
    })
}

/// Writes a single line to stderr.
fn write_stderr_line(message: &str) -> std::io::Result<()> {
    let mut stderr = std::io::stderr();
    writeln!(&mut stderr, "{message}")
}

/// Emits an error message and returns a failure exit code.
fn emit_error(message: &str) -> ExitCode {
    let _ = write_stderr_line(message);
    ExitCode::FAILURE
}
