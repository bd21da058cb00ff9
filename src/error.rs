//! Error types for the HCM assistant.
//!
//! This module provides strongly-typed errors using the `thiserror` crate
//! for all error conditions that can occur while serving HR data and chat.

use thiserror::Error;

/// The main error type for the HCM assistant.
///
/// Store, auth, language-model and configuration failures all surface as
/// this type so the HTTP layer can map them onto status codes in one place.
///
/// # Example
///
/// ```
/// use hcm_assistant::error::HcmError;
///
/// let error = HcmError::ConfigNotFound {
///     path: "/missing/hcm.yaml".to_string(),
/// };
/// assert_eq!(error.to_string(), "Configuration file not found: /missing/hcm.yaml");
/// ```
#[derive(Debug, Error)]
pub enum HcmError {
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

    /// An employee record was invalid or contained inconsistent data.
    #[error("Invalid employee field '{field}': {message}")]
    InvalidEmployee {
        /// The field that was invalid.
        field: String,
        /// A description of what made the field invalid.
        message: String,
    },

    /// A leave request was rejected by validation.
    #[error("Invalid leave request: {message}")]
    InvalidLeaveRequest {
        /// A description of what made the request invalid.
        message: String,
    },

    /// A request body was well-formed JSON but semantically invalid.
    #[error("Invalid request: {message}")]
    InvalidRequest {
        /// A description of the problem.
        message: String,
    },

    /// A referenced entity does not exist.
    #[error("{entity} not found: {id}")]
    NotFound {
        /// The kind of entity (e.g. "Employee").
        entity: String,
        /// The identifier that was looked up.
        id: String,
    },

    /// A write would violate a uniqueness rule at the store boundary.
    #[error("Conflict: {message}")]
    Conflict {
        /// A description of the conflicting state.
        message: String,
    },

    /// The caller has no verified identity.
    #[error("Unauthorized: {message}")]
    Unauthorized {
        /// Why the request was rejected.
        message: String,
    },

    /// The entity store failed to read or write.
    #[error("Store error: {message}")]
    Store {
        /// The underlying store failure.
        message: String,
    },

    /// A server-side fault outside the store, such as hashing or signing.
    #[error("Internal error: {message}")]
    Internal {
        /// The underlying failure.
        message: String,
    },

    /// The external language model call failed.
    #[error("Language model error: {message}")]
    Upstream {
        /// The upstream failure detail.
        message: String,
    },
}

impl HcmError {
    /// Shorthand for a [`HcmError::NotFound`] error.
    pub fn not_found(entity: &str, id: impl ToString) -> Self {
        HcmError::NotFound {
            entity: entity.to_string(),
            id: id.to_string(),
        }
    }

    /// Shorthand for a [`HcmError::Upstream`] error.
    pub fn upstream(message: impl Into<String>) -> Self {
        HcmError::Upstream {
            message: message.into(),
        }
    }
}

/// A type alias for Results that return HcmError.
pub type HcmResult<T> = Result<T, HcmError>;
