//! Error types for vale-core.

use crate::status::PolicyViolation;

/// Errors raised by domain validation and the status policy.
///
/// All error variants are marked with `#[non_exhaustive]` to allow
/// adding new error types without breaking changes.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// Input payload failed validation
    #[error("Validation error: {message}")]
    Validation {
        /// Field that failed validation
        field: Option<String>,
        /// What went wrong
        message: String,
    },

    /// A status transition was refused by the voucher policy
    #[error("Status policy violation: {0}")]
    Policy(#[from] PolicyViolation),

    /// A stored or submitted enum value is not recognized
    #[error("Invalid {kind}: '{value}'")]
    UnknownValue {
        /// Which enum was being parsed (role, status, ...)
        kind: &'static str,
        /// The rejected raw value
        value: String,
    },
}

/// Convenience `Result` type alias for vale-core operations.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Creates a new validation error.
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Error::Validation {
            field: None,
            message: message.into(),
        }
    }

    /// Creates a new validation error with a field name.
    pub fn validation_field<F, M>(field: F, message: M) -> Self
    where
        F: Into<String>,
        M: Into<String>,
    {
        Error::Validation {
            field: Some(field.into()),
            message: message.into(),
        }
    }

    /// Creates an error for an unrecognized enum value.
    pub fn unknown_value<S: Into<String>>(kind: &'static str, value: S) -> Self {
        Error::UnknownValue {
            kind,
            value: value.into(),
        }
    }

    /// Whether this error was caused by the caller's input (4xx) rather
    /// than by stored data.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Error::Validation { .. } | Error::Policy(_) | Error::UnknownValue { .. }
        )
    }
}
