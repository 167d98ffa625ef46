//! Storage error types reported by token and client backends.

use std::fmt;

use crate::error::AuthError;

/// Store-level integrity constraints checked on insert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Constraint {
    /// `token` must be unique.
    TokenUnique,
    /// `refresh_token` must be unique when present.
    RefreshTokenUnique,
    /// `application_id` must reference an existing application.
    ApplicationExists,
    /// `resource_owner_id` must be present.
    ResourceOwnerRequired,
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TokenUnique => write!(f, "token_unique"),
            Self::RefreshTokenUnique => write!(f, "refresh_token_unique"),
            Self::ApplicationExists => write!(f, "application_exists"),
            Self::ResourceOwnerRequired => write!(f, "resource_owner_required"),
        }
    }
}

/// Errors that can occur during storage operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StorageError {
    /// An insert violated an integrity constraint.
    #[error("Constraint violation: {0}")]
    Constraint(Constraint),

    /// The backend could not be reached or failed internally.
    #[error("Storage unavailable: {message}")]
    Unavailable {
        /// Description of the failure.
        message: String,
    },
}

impl StorageError {
    /// Creates a new `Unavailable` error.
    #[must_use]
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable {
            message: message.into(),
        }
    }
}

impl From<StorageError> for AuthError {
    /// Translates read-path failures. Insert paths map constraints themselves.
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::Unavailable { message } => AuthError::storage(message),
            StorageError::Constraint(constraint) => {
                AuthError::internal(format!("unexpected constraint violation: {constraint}"))
            }
        }
    }
}

/// Type alias for storage results.
pub type StorageResult<T> = Result<T, StorageError>;
