//! Token accessibility policy.
//!
//! Plain functions over a record's timestamps. A token is accessible when it
//! is neither expired nor revoked, and a missing token is never accessible:
//! lookups that come back empty should be routed through [`is_accessible`]
//! rather than special-cased.

use time::{Duration, OffsetDateTime};

use crate::types::AccessToken;

/// Returns the expiry instant for a token inserted at `inserted_at`.
///
/// A lifetime that ends beyond the representable date range never expires by
/// time, so this returns `None` for it.
#[must_use]
pub fn expires_at(expires_in: Option<i64>, inserted_at: OffsetDateTime) -> Option<OffsetDateTime> {
    expires_in.and_then(|secs| inserted_at.checked_add(Duration::seconds(secs)))
}

/// Returns `true` if the lifetime has elapsed.
#[must_use]
pub fn is_expired(expires_in: Option<i64>, inserted_at: OffsetDateTime) -> bool {
    is_expired_at(expires_in, inserted_at, OffsetDateTime::now_utc())
}

/// Returns `true` if the lifetime has elapsed at `now`.
///
/// Expiry is inclusive: a token is expired at exactly `inserted_at + expires_in`.
#[must_use]
pub fn is_expired_at(
    expires_in: Option<i64>,
    inserted_at: OffsetDateTime,
    now: OffsetDateTime,
) -> bool {
    expires_at(expires_in, inserted_at).is_some_and(|exp| now >= exp)
}

/// Returns `true` if a revocation timestamp is present, whatever its value.
#[must_use]
pub fn is_revoked(revoked_at: Option<OffsetDateTime>) -> bool {
    revoked_at.is_some()
}

/// Returns `true` if the token exists and is neither expired nor revoked.
#[must_use]
pub fn is_accessible(token: Option<&AccessToken>) -> bool {
    is_accessible_at(token, OffsetDateTime::now_utc())
}

/// Returns `true` if the token exists and is neither expired nor revoked at `now`.
#[must_use]
pub fn is_accessible_at(token: Option<&AccessToken>, now: OffsetDateTime) -> bool {
    token.is_some_and(|t| {
        !is_expired_at(t.expires_in, t.inserted_at, now) && !is_revoked(t.revoked_at)
    })
}
