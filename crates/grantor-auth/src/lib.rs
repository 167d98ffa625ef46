//! # grantor-auth
//!
//! OAuth 2.0 access token authority.
//!
//! This crate provides:
//! - Opaque bearer token and refresh token generation
//! - Find-or-create issuance that reuses an equivalent live token
//! - Scope-set matching against the latest token of an owner/application pair
//! - Expiry and revocation rules
//! - Client resolution for token endpoint requests
//!
//! ## Modules
//!
//! - [`config`] - Authority configuration and layered loading
//! - [`error`] - Error types
//! - [`oauth`] - Request context shared by grant flows
//! - [`scope`] - Scope string parsing and comparison
//! - [`storage`] - Storage traits consumed by the authority
//! - [`token`] - Token issuance, matching and lifecycle rules
//! - [`types`] - Token, client and resource owner records

pub mod config;
pub mod error;
pub mod oauth;
pub mod scope;
pub mod storage;
pub mod token;
pub mod types;

pub use config::{AuthConfig, ConfigError};
pub use error::{AuthError, ErrorCategory, TokenField};
pub use oauth::RequestContext;
pub use scope::ScopeSet;
pub use storage::{
    ClientResolver, Constraint, FieldMatch, StorageError, StorageResult, TokenFilter, TokenStore,
};
pub use token::{AccessTokenAuthority, TokenAttrs};
pub use types::{AccessToken, Client, ClientValidationError, ResourceOwner};

/// Type alias for authority results.
pub type AuthResult<T> = Result<T, AuthError>;

/// Prelude module for convenient imports.
///
/// ```ignore
/// use grantor_auth::prelude::*;
/// ```
pub mod prelude {
    pub use crate::AuthResult;
    pub use crate::config::{AuthConfig, ConfigError};
    pub use crate::error::{AuthError, ErrorCategory, TokenField};
    pub use crate::oauth::RequestContext;
    pub use crate::scope::ScopeSet;
    pub use crate::storage::{
        ClientResolver, Constraint, FieldMatch, StorageError, StorageResult, TokenFilter,
        TokenStore,
    };
    pub use crate::token::{AccessTokenAuthority, TokenAttrs};
    pub use crate::types::{AccessToken, Client, ClientValidationError, ResourceOwner};
}
