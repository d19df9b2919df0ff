//! Error types for the shift engine.
//!
//! This module provides strongly-typed errors using the `thiserror` crate
//! for every error condition a scheduling or roster operation can hit.
//! Each error is scoped to a single operation: an operation that returns
//! an error has left the roster state untouched.

use thiserror::Error;

/// The main error type for the shift engine.
///
/// The variants split into four families that callers handle differently:
/// validation failures (fix the input), conflicts (refresh state and retry),
/// permission failures, and upstream outages (degrade gracefully).
///
/// # Example
///
/// ```
/// use shift_engine::error::EngineError;
///
/// let error = EngineError::Conflict {
///     message: "open shift already claimed".to_string(),
/// };
/// assert_eq!(error.to_string(), "Conflict: open shift already claimed");
/// ```
#[derive(Debug, Error)]
pub enum EngineError {
    /// Configuration file was not found at the specified path.
    #[error("Configuration file not found: {path}")]
    ConfigNotFound {
        /// The path that was not found.
        path: String,
    },

    /// Configuration file could not be parsed.
    #[error("Failed to parse configuration file '{path}': {message}")]
    ConfigParseError {
        /// The path to the file that failed to parse.
        path: String,
        /// A description of the parse error.
        message: String,
    },

    /// Input was rejected before any state change.
    #[error("Invalid field '{field}': {message}")]
    Validation {
        /// The offending field, dotted for nested input (e.g. `slots[0].end_time`).
        field: String,
        /// A description of what made the field invalid.
        message: String,
    },

    /// A referenced entity does not exist.
    #[error("{entity} not found: {id}")]
    NotFound {
        /// The kind of entity (e.g. "shift").
        entity: String,
        /// The identifier that was looked up.
        id: String,
    },

    /// The operation lost a race or clashes with dependent state.
    #[error("Conflict: {message}")]
    Conflict {
        /// A description of the conflicting state.
        message: String,
    },

    /// The caller is not allowed to perform the operation.
    #[error("Forbidden: {message}")]
    Forbidden {
        /// Why the caller was refused.
        message: String,
    },

    /// An external collaborator failed or timed out.
    #[error("Upstream unavailable: {message}")]
    UpstreamUnavailable {
        /// A description of the upstream failure.
        message: String,
    },
}

impl EngineError {
    /// Shorthand for a [`EngineError::Validation`] error.
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        EngineError::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Shorthand for a [`EngineError::NotFound`] error.
    pub fn not_found(entity: impl Into<String>, id: impl ToString) -> Self {
        EngineError::NotFound {
            entity: entity.into(),
            id: id.to_string(),
        }
    }

    /// Shorthand for a [`EngineError::Conflict`] error.
    pub fn conflict(message: impl Into<String>) -> Self {
        EngineError::Conflict {
            message: message.into(),
        }
    }

    /// Shorthand for a [`EngineError::Forbidden`] error.
    pub fn forbidden(message: impl Into<String>) -> Self {
        EngineError::Forbidden {
            message: message.into(),
        }
    }

    /// Returns true if retrying with fresh state may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            EngineError::Conflict { .. } | EngineError::UpstreamUnavailable { .. }
        )
    }
}

/// A type alias for Results that return EngineError.
pub type EngineResult<T> = Result<T, EngineError>;
