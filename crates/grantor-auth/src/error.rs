//! Token authority error types.
//!
//! This module defines all error types that can occur while loading clients,
//! minting tokens and matching existing grants.

use std::fmt;

use uuid::Uuid;

/// Token fields that carry a global uniqueness constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenField {
    /// The access token value.
    Token,
    /// The refresh token value.
    RefreshToken,
}

impl TokenField {
    /// Returns the field name as stored.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Token => "token",
            Self::RefreshToken => "refresh_token",
        }
    }
}

impl fmt::Display for TokenField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors that can occur during token authority operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    /// The inbound request is malformed or incomplete.
    #[error("Invalid request: {message}")]
    InvalidRequest {
        /// Description of why the request is invalid.
        message: String,
    },

    /// The client identifier does not resolve to a registered client.
    #[error("Invalid client: {message}")]
    InvalidClient {
        /// Description of why the client is invalid.
        message: String,
    },

    /// The scope specification is empty or not permitted.
    #[error("Invalid scope: {message}")]
    InvalidScope {
        /// Description of why the scope is invalid.
        message: String,
    },

    /// The token references an application that does not exist.
    #[error("Application {application_id} does not exist")]
    ApplicationConstraint {
        /// The referenced application id.
        application_id: Uuid,
    },

    /// A token value collided with an existing record.
    #[error("Token constraint violated: {field} has already been taken")]
    TokenConstraint {
        /// The field whose uniqueness was violated.
        field: TokenField,
    },

    /// One or more field validations failed while building a record.
    #[error("Validation failed: {}", join_errors(.errors))]
    Validation {
        /// The individual failures.
        errors: Vec<AuthError>,
    },

    /// An error occurred while storing or retrieving token data.
    #[error("Storage error: {message}")]
    Storage {
        /// Description of the storage error.
        message: String,
    },

    /// The authority configuration is invalid.
    #[error("Configuration error: {message}")]
    Configuration {
        /// Description of the configuration error.
        message: String,
    },

    /// An unexpected internal error occurred.
    #[error("Internal error: {message}")]
    Internal {
        /// Description of the internal error.
        message: String,
    },
}

fn join_errors(errors: &[AuthError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl AuthError {
    /// Creates a new `InvalidRequest` error.
    #[must_use]
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest {
            message: message.into(),
        }
    }

    /// Creates a new `InvalidClient` error.
    #[must_use]
    pub fn invalid_client(message: impl Into<String>) -> Self {
        Self::InvalidClient {
            message: message.into(),
        }
    }

    /// Creates a new `InvalidScope` error.
    #[must_use]
    pub fn invalid_scope(message: impl Into<String>) -> Self {
        Self::InvalidScope {
            message: message.into(),
        }
    }

    /// Creates a new `ApplicationConstraint` error.
    #[must_use]
    pub fn application_constraint(application_id: Uuid) -> Self {
        Self::ApplicationConstraint { application_id }
    }

    /// Creates a new `TokenConstraint` error.
    #[must_use]
    pub fn token_constraint(field: TokenField) -> Self {
        Self::TokenConstraint { field }
    }

    /// Wraps field failures into a `Validation` error.
    #[must_use]
    pub fn validation(errors: Vec<AuthError>) -> Self {
        Self::Validation { errors }
    }

    /// Creates a new `Storage` error.
    #[must_use]
    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
        }
    }

    /// Creates a new `Configuration` error.
    #[must_use]
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Creates a new `Internal` error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Returns the individual failures carried by a `Validation` error.
    ///
    /// Any other error is returned as a single-element slice.
    #[must_use]
    pub fn violations(&self) -> &[AuthError] {
        match self {
            Self::Validation { errors } => errors,
            other => std::slice::from_ref(other),
        }
    }

    /// Returns `true` if this is a client error (4xx category).
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidRequest { .. }
                | Self::InvalidClient { .. }
                | Self::InvalidScope { .. }
                | Self::ApplicationConstraint { .. }
                | Self::Validation { .. }
        )
    }

    /// Returns `true` if this is a server error (5xx category).
    ///
    /// Token collisions count as server errors: the values are generated here,
    /// never supplied by the caller.
    #[must_use]
    pub fn is_server_error(&self) -> bool {
        matches!(
            self,
            Self::TokenConstraint { .. }
                | Self::Storage { .. }
                | Self::Configuration { .. }
                | Self::Internal { .. }
        )
    }

    /// Returns the error category for logging/monitoring purposes.
    #[must_use]
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::InvalidRequest { .. } => ErrorCategory::Validation,
            Self::InvalidClient { .. } => ErrorCategory::Authentication,
            Self::InvalidScope { .. } => ErrorCategory::Authorization,
            Self::ApplicationConstraint { .. } => ErrorCategory::Validation,
            Self::TokenConstraint { .. } => ErrorCategory::Token,
            Self::Validation { .. } => ErrorCategory::Validation,
            Self::Storage { .. } => ErrorCategory::Infrastructure,
            Self::Configuration { .. } => ErrorCategory::Configuration,
            Self::Internal { .. } => ErrorCategory::Internal,
        }
    }

    /// Returns the OAuth 2.0 error code for this error.
    #[must_use]
    pub fn oauth_error_code(&self) -> &'static str {
        match self {
            Self::InvalidRequest { .. } => "invalid_request",
            Self::InvalidClient { .. } => "invalid_client",
            Self::InvalidScope { .. } => "invalid_scope",
            Self::ApplicationConstraint { .. } => "invalid_request",
            Self::Validation { .. } => "invalid_request",
            Self::TokenConstraint { .. } => "server_error",
            Self::Storage { .. } => "server_error",
            Self::Configuration { .. } => "server_error",
            Self::Internal { .. } => "server_error",
        }
    }
}

/// Categories of authority errors for logging and monitoring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Client identification errors.
    Authentication,
    /// Scope and permission errors.
    Authorization,
    /// Token value errors.
    Token,
    /// Request or record validation errors.
    Validation,
    /// Infrastructure/storage errors.
    Infrastructure,
    /// Configuration errors.
    Configuration,
    /// Internal server errors.
    Internal,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Authentication => write!(f, "authentication"),
            Self::Authorization => write!(f, "authorization"),
            Self::Token => write!(f, "token"),
            Self::Validation => write!(f, "validation"),
            Self::Infrastructure => write!(f, "infrastructure"),
            Self::Configuration => write!(f, "configuration"),
            Self::Internal => write!(f, "internal"),
        }
    }
}
