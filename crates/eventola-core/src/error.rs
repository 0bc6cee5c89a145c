// Error types for Eventola domain operations

use thiserror::Error;

/// Result type alias for domain operations
pub type Result<T> = std::result::Result<T, EventolaError>;

/// Errors that can occur in domain and copy-generation code
#[derive(Debug, Error)]
pub enum EventolaError {
    /// Form input failed boundary validation
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Copy-generation provider error
    #[error("Copy provider error: {0}")]
    CopyProvider(String),

    /// Storage layer error
    #[error("Storage error: {0}")]
    Storage(String),

    /// Requested entity does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Caller is not authenticated or the session expired
    #[error("Unauthorized")]
    Unauthorized,

    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl EventolaError {
    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        EventolaError::Validation(msg.into())
    }

    /// Create a copy-provider error
    pub fn copy(msg: impl Into<String>) -> Self {
        EventolaError::CopyProvider(msg.into())
    }

    /// Create a storage error
    pub fn storage(msg: impl Into<String>) -> Self {
        EventolaError::Storage(msg.into())
    }

    /// Create a not-found error
    pub fn not_found(what: impl Into<String>) -> Self {
        EventolaError::NotFound(what.into())
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        EventolaError::Configuration(msg.into())
    }
}
