//! Error types and handling for condition rewriting

use std::path::PathBuf;
use thiserror::Error;

use crate::diagnostics::Location;

/// Main error type for fuzzfix operations
#[derive(Debug, Error)]
pub enum FuzzfixError {
    /// The source could not be parsed; the unit is skipped entirely
    #[error("Parse error: {message} at {location}")]
    ParseFailure {
        message: String,
        location: Box<Location>,
    },

    /// A matched site could not produce a consistent set of edits
    #[error("Cannot rewrite {rule_id} site at {location}: {message}")]
    EditGenerationFailure {
        rule_id: String,
        message: String,
        location: Box<Location>,
    },

    /// The aggregated edits are invalid; nothing is emitted
    #[error("Cannot apply changes: {message}")]
    EditApplicationFailure { message: String },

    /// Configuration loading or validation errors
    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    /// File system I/O errors
    #[error("IO error for path '{path}': {source}")]
    IoError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Generic internal errors
    #[error("Internal error: {message}")]
    InternalError { message: String },
}

/// Error kind enumeration for categorizing errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    ParseFailure,
    EditGenerationFailure,
    EditApplicationFailure,
    Config,
    Io,
    Internal,
}

impl FuzzfixError {
    /// Get the error kind for this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            FuzzfixError::ParseFailure { .. } => ErrorKind::ParseFailure,
            FuzzfixError::EditGenerationFailure { .. } => ErrorKind::EditGenerationFailure,
            FuzzfixError::EditApplicationFailure { .. } => ErrorKind::EditApplicationFailure,
            FuzzfixError::ConfigError { .. } => ErrorKind::Config,
            FuzzfixError::IoError { .. } => ErrorKind::Io,
            FuzzfixError::InternalError { .. } => ErrorKind::Internal,
        }
    }

    /// Check if this error only affects one site (the run can continue)
    pub fn is_recoverable(&self) -> bool {
        matches!(self.kind(), ErrorKind::EditGenerationFailure)
    }

    /// Create a parse error
    pub fn parse_failure(message: impl Into<String>, location: Location) -> Self {
        Self::ParseFailure {
            message: message.into(),
            location: Box::new(location),
        }
    }

    /// Create an edit generation error for one site
    pub fn edit_generation(
        rule_id: impl Into<String>,
        message: impl Into<String>,
        location: Location,
    ) -> Self {
        Self::EditGenerationFailure {
            rule_id: rule_id.into(),
            message: message.into(),
            location: Box::new(location),
        }
    }

    /// Create an edit application error
    pub fn edit_application(message: impl Into<String>) -> Self {
        Self::EditApplicationFailure {
            message: message.into(),
        }
    }

    /// Create a configuration error
    pub fn config_error(message: impl Into<String>) -> Self {
        Self::ConfigError {
            message: message.into(),
        }
    }

    /// Create an IO error with path context
    pub fn io_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::IoError {
            path: path.into(),
            source,
        }
    }

    /// Create an internal error
    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::InternalError {
            message: message.into(),
        }
    }
}

/// Convert from std::io::Error
impl From<std::io::Error> for FuzzfixError {
    fn from(err: std::io::Error) -> Self {
        Self::IoError {
            path: PathBuf::new(),
            source: err,
        }
    }
}
