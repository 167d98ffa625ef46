//! Access token storage trait.
//!
//! This module defines the repository interface the authority consumes.
//! Backends own all mutable token state and must enforce, at insert time:
//!
//! - `token` is globally unique
//! - `refresh_token` is globally unique when present
//! - `application_id` references an existing application
//! - `resource_owner_id` is present

use async_trait::async_trait;
use time::OffsetDateTime;
use uuid::Uuid;

use super::error::StorageResult;
use crate::types::AccessToken;

// =============================================================================
// Attribute Filter
// =============================================================================

/// How a single stored field is matched.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum FieldMatch<T> {
    /// The field is not constrained.
    #[default]
    Any,
    /// The stored field must be absent.
    IsNull,
    /// The stored field must be present and equal to the value.
    Equals(T),
}

impl<T: PartialEq> FieldMatch<T> {
    /// Builds an exact match from an optional value: `None` requires null.
    pub fn exact(value: Option<T>) -> Self {
        match value {
            Some(v) => Self::Equals(v),
            None => Self::IsNull,
        }
    }

    /// Builds a match that only constrains the field when a value is given.
    pub fn when_present(value: Option<T>) -> Self {
        match value {
            Some(v) => Self::Equals(v),
            None => Self::Any,
        }
    }

    /// Tests a stored optional field against this matcher.
    pub fn matches(&self, stored: Option<&T>) -> bool {
        match self {
            Self::Any => true,
            Self::IsNull => stored.is_none(),
            Self::Equals(v) => stored == Some(v),
        }
    }
}

/// Exact-equality filter across token attributes.
///
/// Every constrained field must match; there is no partial or fuzzy match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenFilter {
    /// Owner the token was issued for. Always constrained.
    pub resource_owner_id: String,
    /// Bound application.
    pub application_id: FieldMatch<Uuid>,
    /// Canonical scope string.
    pub scopes: FieldMatch<String>,
    /// Lifetime in seconds.
    pub expires_in: FieldMatch<i64>,
    /// Revocation timestamp. Only `Any` and `IsNull` are meaningful.
    pub revoked_at: FieldMatch<OffsetDateTime>,
}

impl TokenFilter {
    /// Creates a filter on the owner alone.
    #[must_use]
    pub fn for_owner(resource_owner_id: impl Into<String>) -> Self {
        Self {
            resource_owner_id: resource_owner_id.into(),
            application_id: FieldMatch::Any,
            scopes: FieldMatch::Any,
            expires_in: FieldMatch::Any,
            revoked_at: FieldMatch::Any,
        }
    }

    /// Constrains the bound application.
    #[must_use]
    pub fn with_application(mut self, application_id: FieldMatch<Uuid>) -> Self {
        self.application_id = application_id;
        self
    }

    /// Constrains the scope string.
    #[must_use]
    pub fn with_scopes(mut self, scopes: FieldMatch<String>) -> Self {
        self.scopes = scopes;
        self
    }

    /// Constrains the lifetime.
    #[must_use]
    pub fn with_expires_in(mut self, expires_in: FieldMatch<i64>) -> Self {
        self.expires_in = expires_in;
        self
    }

    /// Restricts the filter to tokens that were never revoked.
    #[must_use]
    pub fn not_revoked(mut self) -> Self {
        self.revoked_at = FieldMatch::IsNull;
        self
    }

    /// Tests a stored record against every constrained attribute.
    #[must_use]
    pub fn matches(&self, token: &AccessToken) -> bool {
        token.resource_owner_id == self.resource_owner_id
            && self.application_id.matches(token.application_id.as_ref())
            && self.scopes.matches(Some(&token.scopes))
            && self.expires_in.matches(token.expires_in.as_ref())
            && self.revoked_at.matches(token.revoked_at.as_ref())
    }
}

// =============================================================================
// Token Store Trait
// =============================================================================

/// Storage trait for access tokens.
///
/// Lookups return `Ok(None)` when nothing matches; errors are reserved for
/// backend failures and constraint violations.
#[async_trait]
pub trait TokenStore: Send + Sync {
    /// Finds a token record by its bearer value.
    ///
    /// Returns records regardless of expiration/revocation status; callers
    /// should check accessibility before using.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn find_by_token(&self, token: &str) -> StorageResult<Option<AccessToken>>;

    /// Finds a token record by its refresh token value.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn find_by_refresh_token(
        &self,
        refresh_token: &str,
    ) -> StorageResult<Option<AccessToken>>;

    /// Finds at most one record matching every attribute in `filter`.
    ///
    /// With `most_recent_first`, the latest `inserted_at` wins and ties go to
    /// the record inserted last. Otherwise any matching record may be returned.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn find_one_by_attributes(
        &self,
        filter: &TokenFilter,
        most_recent_first: bool,
    ) -> StorageResult<Option<AccessToken>>;

    /// Lists all non-revoked tokens for an owner, in store order.
    ///
    /// Expired tokens are included.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn find_all_by_owner_non_revoked(
        &self,
        resource_owner_id: &str,
    ) -> StorageResult<Vec<AccessToken>>;

    /// Inserts a new token record atomically.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Constraint` naming the violated constraint, or
    /// `StorageError::Unavailable` if the backend fails.
    async fn insert(&self, token: AccessToken) -> StorageResult<AccessToken>;

    /// Sets `revoked_at` on a token if it is not already set.
    ///
    /// An existing revocation timestamp is never overwritten. Returns the
    /// stored record, or `None` if no token has this value.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn revoke(&self, token: &str, at: OffsetDateTime)
    -> StorageResult<Option<AccessToken>>;
}
