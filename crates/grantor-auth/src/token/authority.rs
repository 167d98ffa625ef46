//! Access token authority.
//!
//! Decides whether an existing token may be reused, mints new ones, and
//! answers lookup and accessibility questions on behalf of grant flows.
//!
//! # Usage
//!
//! ```ignore
//! use grantor_auth::token::{AccessTokenAuthority, TokenAttrs};
//!
//! let authority = AccessTokenAuthority::new(token_store, client_resolver, config);
//!
//! let ctx = authority.load_client(ctx).await;
//! let client = ctx.into_client()?;
//!
//! let attrs = authority.config().token_attrs().with_application(client);
//! let token = authority.find_or_create_token(&owner, &attrs).await?;
//! ```
//!
//! # Matching strategies
//!
//! Two deliberately different strategies live here:
//!
//! - [`AccessTokenAuthority::find_or_create_token`] matches every supplied
//!   attribute exactly, including the scope string as stored.
//! - [`AccessTokenAuthority::get_matching_token_for`] takes the latest
//!   non-revoked token for an owner/application pair and then compares scopes
//!   as sets.
//!
//! # Concurrency
//!
//! The authority holds no mutable state. `find_or_create_token` is a lookup
//! followed by an insert with nothing in between, so two concurrent calls with
//! identical attributes may both mint. Each gets its own token value, leaving
//! two live tokens for the same logical grant; this is accepted.

use std::sync::Arc;

use time::OffsetDateTime;
use uuid::Uuid;

use super::generator::generate_token;
use super::policy;
use crate::AuthResult;
use crate::config::AuthConfig;
use crate::error::{AuthError, TokenField};
use crate::oauth::RequestContext;
use crate::scope::ScopeSet;
use crate::storage::{ClientResolver, Constraint, FieldMatch, StorageError, TokenFilter, TokenStore};
use crate::types::{AccessToken, Client, ResourceOwner};

// =============================================================================
// Token Attributes
// =============================================================================

/// Optional attributes for minting or matching a token.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenAttrs {
    /// Lifetime in seconds (None = never expires by time).
    pub expires_in: Option<i64>,

    /// Requested scopes (None = configured defaults).
    pub scopes: Option<String>,

    /// Client application to bind the token to.
    pub application: Option<Client>,

    /// Also issue a refresh token. Affects minting only, never matching.
    pub use_refresh_token: bool,
}

impl TokenAttrs {
    /// Creates empty attributes.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the lifetime in seconds.
    #[must_use]
    pub fn with_expires_in(mut self, expires_in: i64) -> Self {
        self.expires_in = Some(expires_in);
        self
    }

    /// Sets the requested scopes.
    #[must_use]
    pub fn with_scopes(mut self, scopes: impl Into<String>) -> Self {
        self.scopes = Some(scopes.into());
        self
    }

    /// Binds the token to a client application.
    #[must_use]
    pub fn with_application(mut self, application: Client) -> Self {
        self.application = Some(application);
        self
    }

    /// Sets whether a refresh token is issued.
    #[must_use]
    pub fn with_refresh_token(mut self, use_refresh_token: bool) -> Self {
        self.use_refresh_token = use_refresh_token;
        self
    }

    fn application_id(&self) -> Option<Uuid> {
        self.application.as_ref().map(|c| c.id)
    }
}

// =============================================================================
// Authority
// =============================================================================

/// Issues, matches and retires access tokens.
pub struct AccessTokenAuthority {
    /// Token persistence.
    token_store: Arc<dyn TokenStore>,

    /// Client application lookup.
    client_resolver: Arc<dyn ClientResolver>,

    /// Authority configuration.
    config: AuthConfig,
}

impl AccessTokenAuthority {
    /// Creates a new authority.
    ///
    /// # Arguments
    ///
    /// * `token_store` - Storage for access tokens
    /// * `client_resolver` - Lookup for client applications
    /// * `config` - Authority configuration
    #[must_use]
    pub fn new(
        token_store: Arc<dyn TokenStore>,
        client_resolver: Arc<dyn ClientResolver>,
        config: AuthConfig,
    ) -> Self {
        Self {
            token_store,
            client_resolver,
            config,
        }
    }

    /// Returns the authority configuration.
    #[must_use]
    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    /// Resolves the client named in the request and attaches it.
    ///
    /// An already failed context is returned untouched. Otherwise the context
    /// is failed with `InvalidRequest` when the client parameter is missing,
    /// with `InvalidClient` when it names no active client, and with `Storage`
    /// when the lookup itself fails.
    pub async fn load_client(&self, ctx: RequestContext) -> RequestContext {
        if ctx.is_failed() {
            return ctx;
        }

        let param = self.config.client_id_param.as_str();
        let Some(client_id) = ctx.param(param).map(str::to_string) else {
            tracing::debug!(param, "Request is missing client identifier");
            return ctx.fail(AuthError::invalid_request(format!(
                "Missing {param} parameter"
            )));
        };

        match self.client_resolver.resolve(&client_id).await {
            Ok(Some(client)) => ctx.with_client(client),
            Ok(None) => {
                let err = AuthError::invalid_client(format!("Client '{client_id}' not found"));
                tracing::warn!(client_id = %client_id, category = %err.category(), "Unknown client");
                ctx.fail(err)
            }
            Err(e) => {
                let err = AuthError::from(e);
                tracing::warn!(
                    client_id = %client_id,
                    category = %err.category(),
                    error = %err,
                    "Client lookup failed"
                );
                ctx.fail(err)
            }
        }
    }

    /// Creates and stores a new token.
    ///
    /// A refresh token is generated only when `attrs.use_refresh_token` is
    /// set. Missing scopes are replaced by the configured defaults.
    ///
    /// # Errors
    ///
    /// Returns `Validation` carrying:
    /// - `InvalidRequest` if the owner id is empty
    /// - `InvalidScope` if scopes were supplied but name nothing
    /// - `ApplicationConstraint` if the application does not exist
    /// - `TokenConstraint` if a generated value collided
    ///
    /// Returns `Configuration` if no default scopes are configured and
    /// `Storage` if the backend fails.
    pub async fn mint_token(
        &self,
        owner: &ResourceOwner,
        attrs: &TokenAttrs,
    ) -> AuthResult<AccessToken> {
        let mut violations = Vec::new();

        if owner.id.trim().is_empty() {
            violations.push(AuthError::invalid_request("resource owner is required"));
        }

        let scopes = match self.resolve_scopes(attrs.scopes.as_deref()) {
            Ok(scopes) => scopes,
            Err(e @ AuthError::InvalidScope { .. }) => {
                violations.push(e);
                String::new()
            }
            Err(e) => return Err(e),
        };

        if !violations.is_empty() {
            return Err(AuthError::validation(violations));
        }

        let candidate = AccessToken {
            id: Uuid::new_v4(),
            token: generate_token(),
            refresh_token: attrs.use_refresh_token.then(generate_token),
            resource_owner_id: owner.id.clone(),
            application_id: attrs.application_id(),
            scopes,
            expires_in: attrs.expires_in,
            inserted_at: OffsetDateTime::now_utc(),
            revoked_at: None,
        };
        let token_id = candidate.id;
        let application_id = candidate.application_id;

        match self.token_store.insert(candidate).await {
            Ok(stored) => {
                tracing::debug!(
                    token_id = %stored.id,
                    resource_owner_id = %stored.resource_owner_id,
                    application_id = ?stored.application_id,
                    refresh = stored.refresh_token.is_some(),
                    "Minted access token"
                );
                Ok(stored)
            }
            Err(StorageError::Constraint(constraint)) => {
                let violation = match constraint {
                    Constraint::TokenUnique => AuthError::token_constraint(TokenField::Token),
                    Constraint::RefreshTokenUnique => {
                        AuthError::token_constraint(TokenField::RefreshToken)
                    }
                    Constraint::ResourceOwnerRequired => {
                        AuthError::invalid_request("resource owner is required")
                    }
                    Constraint::ApplicationExists => match application_id {
                        Some(id) => AuthError::application_constraint(id),
                        None => {
                            return Err(AuthError::internal(
                                "application constraint reported for application-less token",
                            ));
                        }
                    },
                };
                tracing::warn!(
                    %token_id,
                    %constraint,
                    category = %violation.category(),
                    "Token insert rejected"
                );
                Err(AuthError::validation(vec![violation]))
            }
            Err(e) => {
                let err = AuthError::from(e);
                tracing::warn!(%token_id, category = %err.category(), error = %err, "Token insert failed");
                Err(err)
            }
        }
    }

    /// Returns an accessible token with exactly these attributes, or mints one.
    ///
    /// Every supplied attribute must match the stored record exactly; an
    /// absent application only matches application-less tokens. The refresh
    /// flag is ignored for matching. A found token is returned unchanged.
    ///
    /// # Errors
    ///
    /// Returns the lookup failure, or any error from [`Self::mint_token`].
    pub async fn find_or_create_token(
        &self,
        owner: &ResourceOwner,
        attrs: &TokenAttrs,
    ) -> AuthResult<AccessToken> {
        let filter = TokenFilter::for_owner(owner.id.as_str())
            .with_application(FieldMatch::exact(attrs.application_id()))
            .with_scopes(FieldMatch::when_present(
                attrs.scopes.as_deref().map(|s| ScopeSet::parse(s).serialize()),
            ))
            .with_expires_in(FieldMatch::when_present(attrs.expires_in));

        let existing = self.token_store.find_one_by_attributes(&filter, true).await?;

        if let Some(token) = existing.filter(|t| policy::is_accessible(Some(t))) {
            tracing::debug!(
                token_id = %token.id,
                resource_owner_id = %owner.id,
                "Reusing accessible token"
            );
            return Ok(token);
        }

        self.mint_token(owner, attrs).await
    }

    /// Returns the latest non-revoked token for the pair if its scopes match.
    ///
    /// Only the most recently created candidate is considered. When its
    /// scopes differ (as a set) from `scopes`, the result is `None` even if
    /// an older token would have matched.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    pub async fn get_matching_token_for(
        &self,
        owner: &ResourceOwner,
        application: Option<&Client>,
        scopes: impl Into<ScopeSet>,
    ) -> AuthResult<Option<AccessToken>> {
        let requested = scopes.into();
        let filter = TokenFilter::for_owner(owner.id.as_str())
            .with_application(FieldMatch::exact(application.map(|c| c.id)))
            .not_revoked();

        let latest = self.token_store.find_one_by_attributes(&filter, true).await?;

        Ok(latest.filter(|t| ScopeSet::parse(&t.scopes).equal(&requested)))
    }

    /// Lists all non-revoked tokens for an owner.
    ///
    /// Expired tokens are included; apply [`Self::is_accessible`] where
    /// usability matters.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    pub async fn get_active_tokens_for(&self, owner: &ResourceOwner) -> AuthResult<Vec<AccessToken>> {
        Ok(self
            .token_store
            .find_all_by_owner_non_revoked(&owner.id)
            .await?)
    }

    /// Returns `true` if the token exists and is neither expired nor revoked.
    #[must_use]
    pub fn is_accessible(&self, token: Option<&AccessToken>) -> bool {
        policy::is_accessible(token)
    }

    /// Finds a token by its bearer value.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    pub async fn get_by_token(&self, token: &str) -> AuthResult<Option<AccessToken>> {
        Ok(self.token_store.find_by_token(token).await?)
    }

    /// Finds a token by its refresh token value.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    pub async fn get_by_refresh_token(&self, refresh_token: &str) -> AuthResult<Option<AccessToken>> {
        Ok(self.token_store.find_by_refresh_token(refresh_token).await?)
    }

    /// Revokes a token.
    ///
    /// Revocation is terminal: revoking twice keeps the first timestamp.
    ///
    /// # Errors
    ///
    /// Returns `InvalidRequest` if no token has this value, or `Storage` if
    /// the backend fails.
    pub async fn revoke(&self, token: &str) -> AuthResult<AccessToken> {
        let revoked = self
            .token_store
            .revoke(token, OffsetDateTime::now_utc())
            .await?
            .ok_or_else(|| AuthError::invalid_request("Token not found"))?;

        tracing::debug!(token_id = %revoked.id, "Revoked access token");
        Ok(revoked)
    }

    /// Validates requested scopes and returns their canonical form.
    ///
    /// A missing or blank request resolves to the default scopes. Requested
    /// scopes must be offered by the server and, when the client restricts
    /// its scopes, by the client too.
    ///
    /// # Errors
    ///
    /// Returns `InvalidScope` naming the offending scope.
    pub fn validate_scopes(
        &self,
        requested: Option<&str>,
        client: Option<&Client>,
    ) -> AuthResult<String> {
        let requested = requested.map(ScopeSet::parse).unwrap_or_default();
        if requested.is_empty() {
            return self.resolve_scopes(None);
        }

        requested.ensure_permitted(&self.config.server_scopes())?;

        if let Some(client) = client
            && !client.is_scope_allowed(&requested)
        {
            return Err(AuthError::invalid_scope(format!(
                "scope '{}' is not permitted for client '{}'",
                requested, client.client_id
            )));
        }

        Ok(requested.serialize())
    }

    /// Canonical scope string for a token: supplied scopes or the defaults.
    fn resolve_scopes(&self, scopes: Option<&str>) -> AuthResult<String> {
        match scopes {
            Some(s) => Ok(ScopeSet::parse_non_empty(s)?.serialize()),
            None => {
                let defaults = self.config.default_scope_set();
                if defaults.is_empty() {
                    return Err(AuthError::configuration("default_scopes is empty"));
                }
                Ok(defaults.serialize())
            }
        }
    }
}
