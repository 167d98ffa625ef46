//! Token authority configuration.
//!
//! # Example (TOML)
//!
//! ```toml
//! default_scopes = ["public"]
//! optional_scopes = ["read", "write"]
//! access_token_lifetime = "2h"
//! use_refresh_token = true
//! ```
//!
//! Every key can be overridden from the environment with the `GRANTOR__`
//! prefix, e.g. `GRANTOR__USE_REFRESH_TOKEN=true`. List values are
//! comma-separated: `GRANTOR__DEFAULT_SCOPES=public,profile`.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::scope::ScopeSet;
use crate::token::TokenAttrs;

/// Longest accepted token lifetime (100 years).
pub const MAX_ACCESS_TOKEN_LIFETIME: Duration = Duration::from_secs(100 * 365 * 24 * 3600);

/// Root configuration for the access token authority.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Scopes granted when a request names none. Must not be empty.
    pub default_scopes: Vec<String>,

    /// Additional scopes a client may request explicitly.
    pub optional_scopes: Vec<String>,

    /// Lifetime given to tokens minted by grant flows.
    /// `None` issues tokens that never expire by time.
    #[serde(with = "humantime_serde")]
    pub access_token_lifetime: Option<Duration>,

    /// Issue a refresh token alongside each access token.
    pub use_refresh_token: bool,

    /// Request parameter carrying the public client identifier.
    pub client_id_param: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            default_scopes: vec!["public".to_string()],
            optional_scopes: Vec::new(),
            access_token_lifetime: Some(Duration::from_secs(2 * 3600)), // 2 hours
            use_refresh_token: false,
            client_id_param: "client_id".to_string(),
        }
    }
}

/// Configuration validation errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// An invalid configuration value was provided.
    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),

    /// A required configuration value is missing.
    #[error("Missing required configuration: {0}")]
    Missing(String),

    /// The configuration sources could not be read or deserialized.
    #[error("Failed to load configuration: {0}")]
    Load(String),
}

impl AuthConfig {
    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Missing` if no default scope is configured, and
    /// `ConfigError::InvalidValue` if a scope name contains whitespace, the
    /// lifetime is zero or the client id parameter is blank.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.default_scopes.is_empty() {
            return Err(ConfigError::Missing("default_scopes".to_string()));
        }

        for scope in self.default_scopes.iter().chain(&self.optional_scopes) {
            if scope.is_empty() || scope.chars().any(char::is_whitespace) {
                return Err(ConfigError::InvalidValue(format!(
                    "Invalid scope name: '{}'",
                    scope
                )));
            }
        }

        if let Some(lifetime) = self.access_token_lifetime {
            if lifetime.as_secs() == 0 {
                return Err(ConfigError::InvalidValue(
                    "access_token_lifetime must be > 0".to_string(),
                ));
            }
            if lifetime > MAX_ACCESS_TOKEN_LIFETIME {
                return Err(ConfigError::InvalidValue(format!(
                    "access_token_lifetime must be at most {}s",
                    MAX_ACCESS_TOKEN_LIFETIME.as_secs()
                )));
            }
        }

        if self.client_id_param.trim().is_empty() {
            return Err(ConfigError::InvalidValue(
                "client_id_param cannot be empty".to_string(),
            ));
        }

        Ok(())
    }

    /// Returns the default scope set.
    #[must_use]
    pub fn default_scope_set(&self) -> ScopeSet {
        ScopeSet::from_names(&self.default_scopes)
    }

    /// Returns every scope the server offers: defaults followed by optionals.
    #[must_use]
    pub fn server_scopes(&self) -> ScopeSet {
        ScopeSet::from_names(self.default_scopes.iter().chain(&self.optional_scopes))
    }

    /// Builds the token attributes grant flows start from.
    #[must_use]
    ///
    /// A lifetime beyond [`MAX_ACCESS_TOKEN_LIFETIME`] is clamped to it;
    /// `validate()` rejects such configurations up front.
    pub fn token_attrs(&self) -> TokenAttrs {
        let mut attrs = TokenAttrs::new().with_refresh_token(self.use_refresh_token);
        if let Some(lifetime) = self.access_token_lifetime {
            let secs = lifetime.min(MAX_ACCESS_TOKEN_LIFETIME).as_secs();
            attrs = attrs.with_expires_in(i64::try_from(secs).unwrap_or(i64::MAX));
        }
        attrs
    }
}

pub mod loader {
    //! Layered configuration loading: TOML file, then environment overrides.

    use std::path::Path;

    use config::{Config, Environment, File};

    use super::{AuthConfig, ConfigError};

    /// Environment variable prefix for overrides.
    pub const ENV_PREFIX: &str = "GRANTOR";

    /// Loads and validates the configuration.
    ///
    /// A missing file is not an error; defaults apply to every key the
    /// sources leave unset.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Load` if a source cannot be parsed, or the
    /// validation error for an inconsistent result.
    pub fn load_config(path: Option<&Path>) -> Result<AuthConfig, ConfigError> {
        let mut builder = Config::builder();
        if let Some(p) = path
            && p.exists()
        {
            builder = builder.add_source(File::from(p));
        }
        builder = builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .try_parsing(true)
                .separator("__")
                .list_separator(",")
                .with_list_parse_key("default_scopes")
                .with_list_parse_key("optional_scopes"),
        );

        let cfg = builder
            .build()
            .map_err(|e| ConfigError::Load(format!("config build error: {e}")))?;
        let merged: AuthConfig = cfg
            .try_deserialize()
            .map_err(|e| ConfigError::Load(format!("config deserialize error: {e}")))?;

        merged.validate()?;
        tracing::debug!(
            default_scopes = ?merged.default_scopes,
            use_refresh_token = merged.use_refresh_token,
            "Loaded token authority configuration"
        );
        Ok(merged)
    }
}
