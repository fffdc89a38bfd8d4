// crates/secret-compare/src/config.rs
// ============================================================================
// Module: Secret Compare Configuration
// Description: TOML configuration for the comparator and timing harness.
// Purpose: Load, validate, and apply comparator settings fail-closed.
// Dependencies: serde, thiserror, toml
// ============================================================================

//! ## Overview
//! Configuration is read from an explicit path, from the path in
//! `SECRET_COMPARE_CONFIG`, or from `secret-compare.toml` in the working
//! directory. Only the last source is optional: a missing default file yields
//! [`CompareConfig::default`]. Files are size-limited, must be UTF-8, and
//! reject unknown fields.
//!
//! ## Invariants
//! - A loaded config has passed [`CompareConfig::validate`].
//! - `audit.path` is set exactly when `audit.sink = "file"`.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::env;
use std::fs;
use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

use crate::audit::CompareAuditSink;
use crate::audit::FileAuditSink;
use crate::audit::NoopAuditSink;
use crate::audit::StderrAuditSink;

// ============================================================================
// SECTION: Limits
// ============================================================================

/// Environment variable holding the config path.
pub const CONFIG_ENV_VAR: &str = "SECRET_COMPARE_CONFIG";
/// Config file name used when no path is supplied.
pub const DEFAULT_CONFIG_NAME: &str = "secret-compare.toml";
/// Maximum config file size in bytes.
pub(crate) const MAX_CONFIG_FILE_SIZE: usize = 1024 * 1024;
/// Maximum accepted config path length.
pub(crate) const MAX_TOTAL_PATH_LENGTH: usize = 4096;
/// Maximum padding width for fixed-width comparison.
pub const MAX_FIXED_WIDTH: usize = 64 * 1024;
/// Maximum number of timing harness trials per probe.
pub const MAX_TIMING_TRIALS: u32 = 10_000_000;
/// Maximum timing harness secret length.
pub const MAX_TIMING_SECRET_LEN: usize = 64 * 1024;

// ============================================================================
// SECTION: Config Types
// ============================================================================

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CompareConfig {
    /// Comparator settings.
    #[serde(default)]
    pub comparator: ComparatorConfig,
    /// Failure audit settings.
    #[serde(default)]
    pub audit: AuditConfig,
    /// Timing harness settings.
    #[serde(default)]
    pub timing: TimingConfig,
}

impl CompareConfig {
    /// Loads configuration from disk and validates it.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when loading or validation fails.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let Some(resolved) = resolve_path(path)? else {
            return Ok(Self::default());
        };
        validate_path(&resolved)?;
        let bytes = fs::read(&resolved).map_err(|err| ConfigError::Io(err.to_string()))?;
        if bytes.len() > MAX_CONFIG_FILE_SIZE {
            return Err(ConfigError::Invalid("config file exceeds size limit".to_string()));
        }
        let content = std::str::from_utf8(&bytes)
            .map_err(|_| ConfigError::Invalid("config file must be utf-8".to_string()))?;
        Self::from_toml_str(content)
    }

    /// Parses configuration from TOML text and validates it.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when parsing or validation fails.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self =
            toml::from_str(content).map_err(|err| ConfigError::Parse(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration for internal consistency.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when configuration is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.comparator.validate()?;
        self.audit.validate()?;
        self.timing.validate()?;
        Ok(())
    }
}

/// Comparator settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ComparatorConfig {
    /// Pad both inputs to this many bytes before comparing.
    #[serde(default)]
    pub fixed_width: Option<usize>,
}

impl ComparatorConfig {
    /// Validates comparator settings.
    fn validate(&self) -> Result<(), ConfigError> {
        if let Some(width) = self.fixed_width
            && (width == 0 || width > MAX_FIXED_WIDTH)
        {
            return Err(ConfigError::Invalid(format!(
                "comparator.fixed_width must be between 1 and {MAX_FIXED_WIDTH}"
            )));
        }
        Ok(())
    }
}

/// Audit sink selection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuditSinkKind {
    /// JSON lines on stderr.
    #[default]
    Stderr,
    /// JSON lines appended to `audit.path`.
    File,
    /// Discard events.
    None,
}

/// Failure audit settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AuditConfig {
    /// Sink receiving failure events.
    #[serde(default)]
    pub sink: AuditSinkKind,
    /// Log file path for the file sink.
    #[serde(default)]
    pub path: Option<PathBuf>,
}

impl AuditConfig {
    /// Validates audit settings.
    fn validate(&self) -> Result<(), ConfigError> {
        match (self.sink, &self.path) {
            (AuditSinkKind::File, None) => Err(missing_audit_path()),
            (AuditSinkKind::File, Some(path)) => validate_path(path),
            (AuditSinkKind::Stderr | AuditSinkKind::None, Some(_)) => Err(ConfigError::Invalid(
                "audit.path is only valid with audit.sink = \"file\"".to_string(),
            )),
            (AuditSinkKind::Stderr | AuditSinkKind::None, None) => Ok(()),
        }
    }

    /// Builds the configured audit sink.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the file sink cannot be opened or its path
    /// is missing.
    pub fn build_sink(&self) -> Result<Arc<dyn CompareAuditSink>, ConfigError> {
        match self.sink {
            AuditSinkKind::Stderr => Ok(Arc::new(StderrAuditSink)),
            AuditSinkKind::None => Ok(Arc::new(NoopAuditSink)),
            AuditSinkKind::File => {
                let path = self.path.as_deref().ok_or_else(missing_audit_path)?;
                let sink =
                    FileAuditSink::new(path).map_err(|err| ConfigError::Io(err.to_string()))?;
                Ok(Arc::new(sink))
            }
        }
    }
}

/// Timing harness settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TimingConfig {
    /// Timed calls per probe.
    #[serde(default = "default_trials")]
    pub trials: u32,
    /// Reference secret length in bytes.
    #[serde(default = "default_secret_len")]
    pub secret_len: usize,
    /// Largest acceptable relative spread between mismatch-position means.
    #[serde(default = "default_max_relative_spread")]
    pub max_relative_spread: f64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            trials: default_trials(),
            secret_len: default_secret_len(),
            max_relative_spread: default_max_relative_spread(),
        }
    }
}

impl TimingConfig {
    /// Validates timing harness settings.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when a setting is out of range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.trials == 0 || self.trials > MAX_TIMING_TRIALS {
            return Err(ConfigError::Invalid(format!(
                "timing.trials must be between 1 and {MAX_TIMING_TRIALS}"
            )));
        }
        if self.secret_len == 0 || self.secret_len > MAX_TIMING_SECRET_LEN {
            return Err(ConfigError::Invalid(format!(
                "timing.secret_len must be between 1 and {MAX_TIMING_SECRET_LEN}"
            )));
        }
        if !self.max_relative_spread.is_finite() || self.max_relative_spread <= 0.0 {
            return Err(ConfigError::Invalid(
                "timing.max_relative_spread must be a positive finite number".to_string(),
            ));
        }
        Ok(())
    }
}

/// Default trials per probe.
const fn default_trials() -> u32 {
    20_000
}

/// Default reference secret length.
const fn default_secret_len() -> usize {
    32
}

/// Default relative spread tolerance.
const fn default_max_relative_spread() -> f64 {
    0.25
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Configuration errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// I/O failure while reading configuration.
    #[error("config io error: {0}")]
    Io(String),
    /// TOML parsing error.
    #[error("config parse error: {0}")]
    Parse(String),
    /// Invalid configuration data.
    #[error("invalid config: {0}")]
    Invalid(String),
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Resolves the config path from the caller, the environment, or the default
/// file. Returns `None` when only the default applies and it does not exist.
fn resolve_path(path: Option<&Path>) -> Result<Option<PathBuf>, ConfigError> {
    if let Some(path) = path {
        return Ok(Some(path.to_path_buf()));
    }
    if let Ok(env_path) = env::var(CONFIG_ENV_VAR) {
        if env_path.len() > MAX_TOTAL_PATH_LENGTH {
            return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
        }
        return Ok(Some(PathBuf::from(env_path)));
    }
    let default_path = PathBuf::from(DEFAULT_CONFIG_NAME);
    Ok(default_path.is_file().then_some(default_path))
}

/// Error for a file sink without a path.
fn missing_audit_path() -> ConfigError {
    ConfigError::Invalid("audit.path is required when audit.sink = \"file\"".to_string())
}

/// Rejects empty or oversized paths.
fn validate_path(path: &Path) -> Result<(), ConfigError> {
    let length = path.as_os_str().len();
    if length == 0 {
        return Err(ConfigError::Invalid("path must not be empty".to_string()));
    }
    if length > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid("path exceeds max length".to_string()));
    }
    Ok(())
}
