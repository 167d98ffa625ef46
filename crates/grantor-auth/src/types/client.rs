//! OAuth 2.0 client application and resource owner types.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::scope::ScopeSet;

// =============================================================================
// Client
// =============================================================================

/// Registered client application.
///
/// The authority treats clients as read-only descriptors resolved through a
/// [`ClientResolver`](crate::storage::ClientResolver). Tokens reference a
/// client by its internal `id`; requests name it by its public `client_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Client {
    /// Internal identifier referenced by `AccessToken::application_id`.
    pub id: Uuid,

    /// Public client identifier used in OAuth requests.
    pub client_id: String,

    /// Human-readable display name.
    pub name: String,

    /// Allowed redirect URIs.
    #[serde(default)]
    pub redirect_uris: Vec<String>,

    /// Scopes this client may request. Empty means all server scopes.
    #[serde(default)]
    pub scopes: Vec<String>,

    /// Whether this client is currently active and can be used.
    pub active: bool,
}

impl Client {
    /// Creates an active client with a fresh internal id.
    #[must_use]
    pub fn new(client_id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            client_id: client_id.into(),
            name: name.into(),
            redirect_uris: Vec::new(),
            scopes: Vec::new(),
            active: true,
        }
    }

    /// Validates the client registration.
    ///
    /// # Errors
    ///
    /// Returns an error if the client id or name is empty.
    pub fn validate(&self) -> Result<(), ClientValidationError> {
        if self.client_id.trim().is_empty() {
            return Err(ClientValidationError::EmptyClientId);
        }

        if self.name.trim().is_empty() {
            return Err(ClientValidationError::EmptyName);
        }

        Ok(())
    }

    /// Checks if every requested scope is allowed for this client.
    ///
    /// An empty scopes list means all scopes are allowed.
    #[must_use]
    pub fn is_scope_allowed(&self, requested: &ScopeSet) -> bool {
        self.scopes.is_empty() || requested.is_subset_of(&ScopeSet::from_names(&self.scopes))
    }

    /// Checks if the given redirect URI is registered for this client.
    #[must_use]
    pub fn is_redirect_uri_allowed(&self, uri: &str) -> bool {
        self.redirect_uris.iter().any(|allowed| allowed == uri)
    }
}

/// Client registration validation errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ClientValidationError {
    /// Client id must not be empty.
    #[error("client_id cannot be empty")]
    EmptyClientId,

    /// Display name must not be empty.
    #[error("name cannot be empty")]
    EmptyName,
}

// =============================================================================
// Resource Owner
// =============================================================================

/// Principal a token is issued for.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResourceOwner {
    /// Stable owner identifier.
    pub id: String,
}

impl ResourceOwner {
    /// Creates a resource owner reference.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }
}
