//! Error types for `tezas`
//!
//! The view-state core itself has no failure modes; everything here covers
//! the ambient surfaces around it (configuration files, the on-disk session
//! store, and tracker construction) plus the CLI exit-code mapping.

use std::path::PathBuf;
use thiserror::Error;

// ============================================================================
// Exit Codes
// ============================================================================

/// Exit codes for `tezas` CLI operations.
///
/// These codes follow Unix conventions.
pub struct ExitCode;

impl ExitCode {
    /// Successful execution
    pub const SUCCESS: i32 = 0;

    /// General error
    pub const ERROR: i32 = 1;

    /// Configuration error (invalid YAML, validation failure)
    pub const CONFIG_ERROR: i32 = 2;

    /// I/O error (file not found, permission denied)
    pub const IO_ERROR: i32 = 3;

    /// Usage error (invalid arguments, missing required options)
    pub const USAGE_ERROR: i32 = 64;

    /// Interrupted by SIGINT (Ctrl+C)
    pub const INTERRUPTED: i32 = 130;

    /// Terminated by SIGTERM
    pub const TERMINATED: i32 = 143;
}

// ============================================================================
// Top-Level Error
// ============================================================================

/// Top-level error type for `tezas` operations.
///
/// Aggregates the domain errors and maps each one to an exit code.
#[derive(Debug, Error)]
pub enum TezasError {
    /// Configuration loading or validation error
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Session store error
    #[error(transparent)]
    Session(#[from] SessionError),

    /// Scroll tracker construction error
    #[error(transparent)]
    Tracker(#[from] TrackerError),

    /// Invalid command-line usage not caught by argument parsing
    #[error("usage error: {0}")]
    Usage(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML parsing error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl TezasError {
    /// Returns the appropriate exit code for this error.
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::Config(_) | Self::Json(_) | Self::Yaml(_) => ExitCode::CONFIG_ERROR,
            Self::Session(_) | Self::Io(_) => ExitCode::IO_ERROR,
            Self::Usage(_) => ExitCode::USAGE_ERROR,
            Self::Tracker(_) => ExitCode::ERROR,
        }
    }
}

// ============================================================================
// Configuration Errors
// ============================================================================

/// Configuration loading and validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// YAML parsing failed
    #[error("parse error in {path}: {message}")]
    ParseError {
        /// Path to the configuration file
        path: PathBuf,
        /// Line number where the error occurred (if available)
        line: Option<usize>,
        /// Error message from the parser
        message: String,
    },

    /// Configuration validation failed
    #[error("validation failed for {path}")]
    ValidationError {
        /// Path to the configuration file
        path: String,
        /// List of validation issues found
        errors: Vec<ValidationIssue>,
    },

    /// Referenced configuration file not found
    #[error("file not found: {path}")]
    MissingFile {
        /// Path to the missing file
        path: PathBuf,
    },

    /// Configuration file exceeds the size limit
    #[error("{path} is too large: {size} bytes (limit: {limit})")]
    TooLarge {
        /// Path to the configuration file
        path: PathBuf,
        /// Actual size in bytes
        size: u64,
        /// Configured limit in bytes
        limit: u64,
    },

    /// Field has an invalid value
    #[error("invalid value for '{field}': got '{value}', expected {expected}")]
    InvalidValue {
        /// Name of the field with invalid value
        field: String,
        /// The actual value provided
        value: String,
        /// Description of what was expected
        expected: String,
    },
}

// ============================================================================
// Validation Types
// ============================================================================

/// A single validation issue found during configuration validation.
#[derive(Debug, Clone)]
pub struct ValidationIssue {
    /// Path to the problematic field (e.g., "intro.phase2")
    pub path: String,
    /// Description of the validation issue
    pub message: String,
    /// Severity level of the issue
    pub severity: Severity,
}

impl std::fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let prefix = match self.severity {
            Severity::Error => "error",
            Severity::Warning => "warning",
        };
        write!(f, "{}: {} at {}", prefix, self.message, self.path)
    }
}

/// Severity level for validation issues.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Error - validation failure that prevents configuration from being used
    Error,
    /// Warning - potential issue that does not prevent configuration loading
    Warning,
}

// ============================================================================
// Session Store Errors
// ============================================================================

/// Errors raised by persistent session stores.
///
/// The in-memory store never fails; these only surface from the file-backed
/// store used by the CLI.
#[derive(Debug, Error)]
pub enum SessionError {
    /// Reading or writing the session file failed
    #[error("session store I/O error at {path}: {source}")]
    Io {
        /// Path to the session file
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The session file does not contain a JSON string map
    #[error("corrupt session file {path}: {source}")]
    Corrupt {
        /// Path to the session file
        path: PathBuf,
        /// Underlying JSON error
        #[source]
        source: serde_json::Error,
    },

    /// Serializing the session map failed
    #[error("session serialization failed: {0}")]
    Json(#[from] serde_json::Error),
}

// ============================================================================
// Tracker Errors
// ============================================================================

/// Scroll tracker construction errors.
#[derive(Debug, Error)]
pub enum TrackerError {
    /// The tracker was given no sections, so no section could ever be active
    #[error("scroll tracker requires at least one section")]
    NoSections,

    /// The header offset is not a finite, non-negative number
    #[error("invalid header offset: {0}")]
    InvalidHeaderOffset(f64),
}

// ============================================================================
// Result Type Alias
// ============================================================================

/// Result type alias for `tezas` operations.
pub type Result<T> = std::result::Result<T, TezasError>;

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes() {
        assert_eq!(ExitCode::SUCCESS, 0);
        assert_eq!(ExitCode::ERROR, 1);
        assert_eq!(ExitCode::CONFIG_ERROR, 2);
        assert_eq!(ExitCode::IO_ERROR, 3);
        assert_eq!(ExitCode::USAGE_ERROR, 64);
        assert_eq!(ExitCode::INTERRUPTED, 130);
        assert_eq!(ExitCode::TERMINATED, 143);
    }

    #[test]
    fn test_config_error_exit_code() {
        let err: TezasError = ConfigError::MissingFile {
            path: PathBuf::from("/site.yaml"),
        }
        .into();
        assert_eq!(err.exit_code(), ExitCode::CONFIG_ERROR);
    }

    #[test]
    fn test_session_error_exit_code() {
        let err: TezasError = SessionError::Io {
            path: PathBuf::from("/session.json"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        }
        .into();
        assert_eq!(err.exit_code(), ExitCode::IO_ERROR);
    }

    #[test]
    fn test_tracker_error_exit_code() {
        let err: TezasError = TrackerError::NoSections.into();
        assert_eq!(err.exit_code(), ExitCode::ERROR);
    }

    #[test]
    fn test_usage_error_exit_code() {
        let err = TezasError::Usage("nothing to do".to_string());
        assert_eq!(err.exit_code(), ExitCode::USAGE_ERROR);
    }

    #[test]
    fn test_io_error_exit_code() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "not found");
        let err: TezasError = io_err.into();
        assert_eq!(err.exit_code(), ExitCode::IO_ERROR);
    }

    #[test]
    fn test_validation_issue_display() {
        let issue = ValidationIssue {
            path: "intro.phase2".to_string(),
            message: "must come after intro.phase1".to_string(),
            severity: Severity::Error,
        };
        assert_eq!(
            issue.to_string(),
            "error: must come after intro.phase1 at intro.phase2"
        );
    }

    #[test]
    fn test_validation_issue_warning_display() {
        let issue = ValidationIssue {
            path: "layout[1]".to_string(),
            message: "span overlaps layout[0]".to_string(),
            severity: Severity::Warning,
        };
        assert_eq!(issue.to_string(), "warning: span overlaps layout[0] at layout[1]");
    }

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::ParseError {
            path: PathBuf::from("site.yaml"),
            line: Some(12),
            message: "unexpected token".to_string(),
        };
        assert!(err.to_string().contains("site.yaml"));
        assert!(err.to_string().contains("unexpected token"));
    }

    #[test]
    fn test_tracker_error_display() {
        assert_eq!(
            TrackerError::InvalidHeaderOffset(-1.0).to_string(),
            "invalid header offset: -1"
        );
    }
}
