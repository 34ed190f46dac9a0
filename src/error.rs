//! Error types for the stackgate deployment system.
//!
//! This module provides the error hierarchy for all operations in the
//! change-set lifecycle: configuration, CloudFormation API access, waiting
//! and polling, and the deploy pipeline.

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for stackgate operations.
#[derive(Debug, Error)]
pub enum StackgateError {
    /// Configuration-related errors.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// CloudFormation API errors.
    #[error("CloudFormation error: {0}")]
    CloudFormation(#[from] CloudFormationError),

    /// Wait and poll errors.
    #[error("Wait error: {0}")]
    Wait(#[from] WaitError),

    /// IO errors.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Configuration-related errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file was not found.
    #[error("Configuration file not found: {path}")]
    FileNotFound {
        /// Path to the missing file.
        path: PathBuf,
    },

    /// The configuration file could not be parsed.
    #[error("Failed to parse configuration: {message}")]
    ParseError {
        /// Description of the parse error.
        message: String,
        /// Optional source location.
        location: Option<String>,
    },

    /// Validation failed.
    #[error("Configuration validation failed: {message}")]
    ValidationError {
        /// Description of the validation error.
        message: String,
        /// Field that failed validation.
        field: Option<String>,
    },

    /// No change-set name was supplied for a command that requires one.
    #[error(
        "changeSetName not set. Set it by passing --change-set-name (-n) or by \
         setting change_sets.name in stackgate.deploy.yaml"
    )]
    ChangeSetNameMissing,
}

/// CloudFormation API errors.
#[derive(Debug, Error)]
pub enum CloudFormationError {
    /// A service call was rejected by CloudFormation.
    #[error("CloudFormation request failed{}: {message}", format_code(.code))]
    ApiRequestFailed {
        /// Service error code, when the service provided one.
        code: Option<String>,
        /// Error message from the service.
        message: String,
    },

    /// Network-level failure talking to the service.
    #[error("Network error communicating with CloudFormation: {message}")]
    NetworkError {
        /// Description of the network error.
        message: String,
    },

    /// The service returned a response this crate could not interpret.
    #[error("Invalid response from CloudFormation: {message}")]
    InvalidResponse {
        /// Description of the response issue.
        message: String,
    },
}

/// Wait and poll errors.
#[derive(Debug, Error)]
pub enum WaitError {
    /// A change set never became available for execution within the deadline.
    #[error(
        "Change set {change_set_name} not ready after {waited_secs}s \
         (last execution status: {last_status})"
    )]
    NotReady {
        /// The change set that was being waited on.
        change_set_name: String,
        /// Last execution status observed before giving up.
        last_status: String,
        /// Total seconds waited.
        waited_secs: u64,
    },

    /// A bounded poll exhausted its try budget.
    #[error("Timed out polling for {description} after {tries} tries")]
    PollTimeout {
        /// What was being polled for.
        description: String,
        /// Number of predicate calls made.
        tries: u32,
    },
}

/// Result type alias for stackgate operations.
pub type Result<T> = std::result::Result<T, StackgateError>;

fn format_code(code: &Option<String>) -> String {
    code.as_ref().map_or_else(String::new, |c| format!(" ({c})"))
}

impl StackgateError {
    /// Creates a new internal error with the given message.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Returns true if this error reports that the target stack does not
    /// exist.
    ///
    /// CloudFormation signals the condition as a `ValidationError` whose
    /// message contains `does not exist`; no dedicated error code exists for
    /// it, so the message text is inspected alongside the code.
    #[must_use]
    pub fn is_stack_missing(&self) -> bool {
        match self {
            Self::CloudFormation(CloudFormationError::ApiRequestFailed { code, message }) => {
                code.as_deref().is_none_or(|c| c == "ValidationError")
                    && message.contains("does not exist")
            }
            _ => false,
        }
    }
}

impl CloudFormationError {
    /// Creates an API request error.
    #[must_use]
    pub fn api(code: Option<String>, message: impl Into<String>) -> Self {
        Self::ApiRequestFailed {
            code,
            message: message.into(),
        }
    }

    /// Creates a network error.
    #[must_use]
    pub fn network(message: impl Into<String>) -> Self {
        Self::NetworkError {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stack_missing_detection() {
        let err = StackgateError::CloudFormation(CloudFormationError::api(
            Some(String::from("ValidationError")),
            "Stack [my-service-dev] does not exist",
        ));
        assert!(err.is_stack_missing());
    }

    #[test]
    fn test_stack_missing_requires_message_match() {
        let err = StackgateError::CloudFormation(CloudFormationError::api(
            Some(String::from("ValidationError")),
            "Template format error",
        ));
        assert!(!err.is_stack_missing());
    }

    #[test]
    fn test_stack_missing_rejects_other_codes() {
        let err = StackgateError::CloudFormation(CloudFormationError::api(
            Some(String::from("Throttling")),
            "Rate exceeded, stack does not exist yet",
        ));
        assert!(!err.is_stack_missing());
    }

    #[test]
    fn test_change_set_name_missing_names_both_sources() {
        let message = ConfigError::ChangeSetNameMissing.to_string();
        assert!(message.contains("--change-set-name"));
        assert!(message.contains("change_sets.name"));
    }
}
