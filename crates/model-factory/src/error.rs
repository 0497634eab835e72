//! Error types for model definitions and instances
//!
//! Only `Configuration` is raised by the factory itself. The remaining
//! variants cover member access on the produced classes and give
//! caller-supplied collaborators a place to report their own failures.

use thiserror::Error;

/// Result type alias for model operations
pub type ModelResult<T> = Result<T, ModelError>;

/// Error types for model factory operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ModelError {
    /// The class configuration is unusable (e.g. cache key without fetch)
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// A cache operation was requested on a class without a cache key
    #[error("Caching is not enabled for model '{0}'")]
    CacheDisabled(String),

    /// No static or instance member with this name
    #[error("Model '{model}' has no member '{member}'")]
    UnknownMember { model: String, member: String },

    /// The member exists but cannot be invoked this way
    #[error("Member '{member}' of model '{model}' is not callable")]
    NotCallable { model: String, member: String },

    /// Raised by fetch collaborators
    #[error("Fetch error: {0}")]
    Fetch(String),

    /// Raised by custom initializers
    #[error("Initialization error: {0}")]
    Initialization(String),
}

impl ModelError {
    pub(crate) fn unknown_member(model: &str, member: &str) -> Self {
        ModelError::UnknownMember {
            model: model.to_string(),
            member: member.to_string(),
        }
    }

    pub(crate) fn not_callable(model: &str, member: &str) -> Self {
        ModelError::NotCallable {
            model: model.to_string(),
            member: member.to_string(),
        }
    }
}
