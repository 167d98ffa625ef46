//! Token issuance and lifecycle.
//!
//! - [`authority`] - Reuse-or-mint decisions and token lookups
//! - [`generator`] - Opaque token value generation
//! - [`policy`] - Expiry, revocation and accessibility rules

pub mod authority;
pub mod generator;
pub mod policy;

pub use authority::{AccessTokenAuthority, TokenAttrs};
pub use generator::generate_token;
pub use policy::{expires_at, is_accessible, is_expired, is_revoked};
