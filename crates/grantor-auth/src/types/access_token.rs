//! Access token domain type.
//!
//! Access tokens are opaque bearer strings bound to a resource owner and,
//! optionally, to a client application. A record is created once by the
//! authority, never edited, and retired only by setting `revoked_at`.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::token::policy;

/// Access token stored by a [`TokenStore`](crate::storage::TokenStore).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessToken {
    /// Unique identifier for this token record.
    pub id: Uuid,

    /// Opaque bearer token value. Globally unique.
    pub token: String,

    /// Opaque refresh token value, present when refresh was requested.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,

    /// Principal the token was issued for.
    pub resource_owner_id: String,

    /// Client application bound to the token (None for owner-only tokens).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub application_id: Option<Uuid>,

    /// Granted scopes (space-separated, never empty).
    pub scopes: String,

    /// Lifetime in seconds counted from `inserted_at` (None = no expiration).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_in: Option<i64>,

    /// When this token was created.
    #[serde(with = "time::serde::rfc3339")]
    pub inserted_at: OffsetDateTime,

    /// When this token was revoked (None = not revoked).
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "time::serde::rfc3339::option"
    )]
    pub revoked_at: Option<OffsetDateTime>,
}

impl AccessToken {
    /// Returns the instant this token stops being usable, if it expires at all.
    #[must_use]
    pub fn expires_at(&self) -> Option<OffsetDateTime> {
        policy::expires_at(self.expires_in, self.inserted_at)
    }

    /// Returns `true` if this token has expired.
    #[must_use]
    pub fn is_expired(&self) -> bool {
        policy::is_expired(self.expires_in, self.inserted_at)
    }

    /// Returns `true` if this token has been revoked.
    #[must_use]
    pub fn is_revoked(&self) -> bool {
        policy::is_revoked(self.revoked_at)
    }

    /// Returns `true` if this token is neither expired nor revoked.
    #[must_use]
    pub fn is_accessible(&self) -> bool {
        policy::is_accessible(Some(self))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::Duration;

    fn create_test_token(expires_in: Option<i64>, revoked_at: Option<OffsetDateTime>) -> AccessToken {
        AccessToken {
            id: Uuid::new_v4(),
            token: "test-token".to_string(),
            refresh_token: None,
            resource_owner_id: "owner-1".to_string(),
            application_id: None,
            scopes: "public".to_string(),
            expires_in,
            inserted_at: OffsetDateTime::now_utc() - Duration::minutes(10),
            revoked_at,
        }
    }

    #[test]
    fn test_expires_at() {
        let token = create_test_token(Some(60), None);
        assert_eq!(token.expires_at(), Some(token.inserted_at + Duration::seconds(60)));

        let token = create_test_token(None, None);
        assert_eq!(token.expires_at(), None);
    }

    #[test]
    fn test_state_predicates() {
        let token = create_test_token(Some(3600), None);
        assert!(!token.is_expired());
        assert!(!token.is_revoked());
        assert!(token.is_accessible());

        let token = create_test_token(Some(60), None);
        assert!(token.is_expired());
        assert!(!token.is_accessible());

        let token = create_test_token(None, Some(OffsetDateTime::now_utc()));
        assert!(token.is_revoked());
        assert!(!token.is_accessible());
    }

    #[test]
    fn test_serialization() {
        let token = create_test_token(Some(7200), None);

        let json = serde_json::to_value(&token).unwrap();
        assert_eq!(json["resourceOwnerId"], "owner-1");
        assert_eq!(json["expiresIn"], 7200);
        assert!(json.get("revokedAt").is_none());
        assert!(json.get("refreshToken").is_none());

        let deserialized: AccessToken = serde_json::from_value(json).unwrap();
        assert_eq!(token.token, deserialized.token);
        assert_eq!(token.scopes, deserialized.scopes);
        assert_eq!(deserialized.revoked_at, None);
    }
}
