use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

use crate::probe::ProbeError;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// CliError: unified error hierarchy for all CLI operations
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug)]
pub enum CliError {
    // Config errors
    ConfigNotFound { path: PathBuf },
    ConfigLoadFailed { source: config::ConfigError },
    ConfigValidation { errors: usize },

    // Probe errors
    Probe(ProbeError),
    NetworkMismatch { expected: u64, actual: u64 },

    // Runtime errors
    Runtime(String),

    // IO errors
    Io(std::io::Error),
    Json(serde_json::Error),
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConfigNotFound { path } => {
                write!(f, "Configuration file not found: {}", path.display())
            }
            Self::ConfigLoadFailed { source } => {
                write!(f, "Failed to load configuration: {source}")
            }
            Self::ConfigValidation { errors } => {
                write!(
                    f,
                    "Configuration has {errors} error(s). Run: nodeprobe validate"
                )
            }
            Self::Probe(err) => write!(f, "Probe failed: {err}"),
            Self::NetworkMismatch { expected, actual } => {
                write!(f, "Node reports network id {actual} but {expected} is configured")
            }
            Self::Runtime(msg) => write!(f, "Failed to create async runtime: {msg}"),
            Self::Io(err) => write!(f, "I/O error: {err}"),
            Self::Json(err) => write!(f, "JSON error: {err}"),
        }
    }
}

impl std::error::Error for CliError {}

impl From<std::io::Error> for CliError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<config::ConfigError> for CliError {
    fn from(err: config::ConfigError) -> Self {
        Self::ConfigLoadFailed { source: err }
    }
}

impl From<ProbeError> for CliError {
    fn from(err: ProbeError) -> Self {
        Self::Probe(err)
    }
}

impl From<serde_json::Error> for CliError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err)
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// ValidationIssue: structured validation results
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationIssue {
    pub severity: Severity,
    pub code: String,
    pub message: String,
    pub field: Option<String>,
}

impl ValidationIssue {
    pub fn new(severity: Severity, code: &str, message: impl Into<String>) -> Self {
        Self {
            severity,
            code: code.to_string(),
            message: message.into(),
            field: None,
        }
    }

    pub fn with_field(mut self, field: impl Into<String>) -> Self {
        self.field = Some(field.into());
        self
    }
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.field {
            Some(field) => write!(
                f,
                "[{}] {}: {} ({})",
                self.severity, self.code, self.message, field
            ),
            None => write!(f, "[{}] {}: {}", self.severity, self.code, self.message),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
    Info,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Error => write!(f, "error"),
            Self::Warning => write!(f, "warning"),
            Self::Info => write!(f, "info"),
        }
    }
}

impl Default for Severity {
    fn default() -> Self {
        Self::Info
    }
}
