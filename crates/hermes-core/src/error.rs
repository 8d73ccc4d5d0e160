//! Error types for Hermes.
//!
//! This module provides the [`DispatchError`] type, the standard error
//! taxonomy used throughout the framework. Short-circuit outcomes
//! (unauthorized, validation failed, cancelled) are first-class variants
//! rather than control-flow exceptions, so tests and callers can inspect
//! exactly where a pipeline stopped.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias using [`DispatchError`].
pub type DispatchResult<T> = Result<T, DispatchError>;

/// Categories of errors for classification and handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// Builder or registry misuse. Programming error, never retried.
    Usage,
    /// Authorization errors (principal lacks a required role).
    Authorization,
    /// Command validation errors.
    Validation,
    /// Invocation aborted via the cancellation signal.
    Cancelled,
    /// Terminal-handler failures, opaque to the pipeline.
    Handler,
}

/// Standard error type for Hermes.
///
/// `DispatchError` covers the full failure taxonomy of a command
/// invocation. Guard stages produce [`Unauthorized`](Self::Unauthorized)
/// and [`ValidationFailed`](Self::ValidationFailed); the builder and the
/// dispatch table produce the usage variants; everything the terminal
/// handler fails with is wrapped in [`Handler`](Self::Handler) and
/// propagated unchanged otherwise.
///
/// # Example
///
/// ```
/// use hermes_core::{DispatchError, ErrorCategory};
///
/// let err = DispatchError::unauthorized_role("admin");
/// assert_eq!(err.category(), ErrorCategory::Authorization);
/// assert_eq!(err.code(), "UNAUTHORIZED");
/// ```
#[derive(Error, Debug)]
pub enum DispatchError {
    /// The pipeline builder was used after finalization.
    #[error("pipeline builder is already finalized")]
    BuilderFinalized,

    /// The principal lacks a required role.
    #[error("unauthorized: {message}")]
    Unauthorized {
        /// Human-readable error message.
        message: String,
        /// The role the principal was missing, if the check was role-based.
        required_role: Option<String>,
    },

    /// Command validation produced one or more failures.
    #[error("validation failed with {} failure(s)", failures.len())]
    ValidationFailed {
        /// The structured validation failures, in validator order.
        failures: Vec<ValidationFailure>,
    },

    /// The invocation was aborted via the cancellation signal.
    ///
    /// Distinct from business failures so callers can tell "didn't run"
    /// from "ran and failed".
    #[error("invocation cancelled")]
    Cancelled,

    /// A handler is already registered for the command type.
    #[error("a handler is already registered for command '{command}'")]
    DuplicateHandler {
        /// The command-type identifier.
        command: &'static str,
    },

    /// No handler is registered for the command type.
    #[error("no handler registered for command '{command}'")]
    UnregisteredCommand {
        /// The command-type identifier.
        command: &'static str,
    },

    /// The terminal handler failed.
    #[error("handler error: {message}")]
    Handler {
        /// Human-readable error message.
        message: String,
        /// The underlying error, if any.
        #[source]
        source: Option<anyhow::Error>,
    },
}

impl DispatchError {
    /// Creates an unauthorized error with a message.
    #[must_use]
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::Unauthorized {
            message: message.into(),
            required_role: None,
        }
    }

    /// Creates an unauthorized error for a missing role.
    #[must_use]
    pub fn unauthorized_role(role: impl Into<String>) -> Self {
        let role = role.into();
        Self::Unauthorized {
            message: format!("principal does not hold role '{role}'"),
            required_role: Some(role),
        }
    }

    /// Creates a validation error from a list of failures.
    #[must_use]
    pub fn validation_failed(failures: Vec<ValidationFailure>) -> Self {
        Self::ValidationFailed { failures }
    }

    /// Creates a handler error with a message.
    #[must_use]
    pub fn handler(message: impl Into<String>) -> Self {
        Self::Handler {
            message: message.into(),
            source: None,
        }
    }

    /// Creates a handler error wrapping a source error.
    pub fn handler_with_source(
        message: impl Into<String>,
        source: impl Into<anyhow::Error>,
    ) -> Self {
        Self::Handler {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    /// Returns the error category.
    #[must_use]
    pub const fn category(&self) -> ErrorCategory {
        match self {
            Self::BuilderFinalized | Self::DuplicateHandler { .. } | Self::UnregisteredCommand { .. } => {
                ErrorCategory::Usage
            }
            Self::Unauthorized { .. } => ErrorCategory::Authorization,
            Self::ValidationFailed { .. } => ErrorCategory::Validation,
            Self::Cancelled => ErrorCategory::Cancelled,
            Self::Handler { .. } => ErrorCategory::Handler,
        }
    }

    /// Returns a machine-readable error code.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::BuilderFinalized => "BUILDER_FINALIZED",
            Self::Unauthorized { .. } => "UNAUTHORIZED",
            Self::ValidationFailed { .. } => "VALIDATION_FAILED",
            Self::Cancelled => "CANCELLED",
            Self::DuplicateHandler { .. } => "DUPLICATE_HANDLER",
            Self::UnregisteredCommand { .. } => "UNREGISTERED_COMMAND",
            Self::Handler { .. } => "HANDLER_ERROR",
        }
    }

    /// Returns additional structured details for this error.
    #[must_use]
    pub fn details(&self) -> Option<serde_json::Value> {
        match self {
            Self::ValidationFailed { failures } => serde_json::to_value(failures).ok(),
            Self::Unauthorized {
                required_role: Some(role),
                ..
            } => Some(serde_json::json!({ "required_role": role })),
            Self::DuplicateHandler { command } | Self::UnregisteredCommand { command } => {
                Some(serde_json::json!({ "command": command }))
            }
            _ => None,
        }
    }
}

/// A single structured validation failure.
///
/// Validators return an ordered list of these; a non-empty list
/// short-circuits the pipeline with
/// [`DispatchError::ValidationFailed`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationFailure {
    /// The field path that failed validation. Empty for payload-level failures.
    pub field: String,
    /// Human-readable failure message.
    pub message: String,
    /// Machine-readable failure code.
    pub code: String,
}

impl ValidationFailure {
    /// Creates a failure for a field with a default code.
    #[must_use]
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
            code: "INVALID".to_string(),
        }
    }

    /// Sets a machine-readable code on the failure.
    #[must_use]
    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = code.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unauthorized_role_error() {
        let err = DispatchError::unauthorized_role("admin");
        assert_eq!(err.category(), ErrorCategory::Authorization);
        assert_eq!(err.code(), "UNAUTHORIZED");
        assert!(err.to_string().contains("admin"));

        let details = err.details().unwrap();
        assert_eq!(details["required_role"], "admin");
    }

    #[test]
    fn test_validation_failed_carries_failures() {
        let failures = vec![
            ValidationFailure::new("amount", "must be positive"),
            ValidationFailure::new("currency", "unknown currency").with_code("UNKNOWN_CURRENCY"),
        ];
        let err = DispatchError::validation_failed(failures.clone());

        assert_eq!(err.category(), ErrorCategory::Validation);
        assert!(err.to_string().contains("2 failure(s)"));
        match err {
            DispatchError::ValidationFailed { failures: carried } => {
                assert_eq!(carried, failures);
            }
            _ => panic!("expected ValidationFailed"),
        }
    }

    #[test]
    fn test_cancelled_is_distinct_category() {
        let err = DispatchError::Cancelled;
        assert_eq!(err.category(), ErrorCategory::Cancelled);
        assert_eq!(err.code(), "CANCELLED");
        assert!(err.details().is_none());
    }

    #[test]
    fn test_builder_finalized_is_usage_error() {
        let err = DispatchError::BuilderFinalized;
        assert_eq!(err.category(), ErrorCategory::Usage);
        assert_eq!(err.code(), "BUILDER_FINALIZED");
    }

    #[test]
    fn test_handler_error_with_source() {
        let io = std::io::Error::other("disk on fire");
        let err = DispatchError::handler_with_source("could not persist", io);
        assert_eq!(err.category(), ErrorCategory::Handler);
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_registry_error_details() {
        let err = DispatchError::UnregisteredCommand { command: "transfer" };
        assert_eq!(err.category(), ErrorCategory::Usage);
        assert_eq!(err.details().unwrap()["command"], "transfer");
    }

    #[test]
    fn test_validation_failure_serialization() {
        let failure = ValidationFailure::new("email", "invalid format").with_code("INVALID_FORMAT");
        let json = serde_json::to_string(&failure).expect("serialization should work");
        assert!(json.contains("\"field\":\"email\""));
        assert!(json.contains("\"code\":\"INVALID_FORMAT\""));

        let parsed: ValidationFailure =
            serde_json::from_str(&json).expect("deserialization should work");
        assert_eq!(failure, parsed);
    }
}
