//! Domain types shared across the authority.
//!
//! - [`AccessToken`] - Persisted bearer token record
//! - [`Client`] - Registered client application
//! - [`ResourceOwner`] - Principal a token is issued for

pub mod access_token;
pub mod client;

pub use access_token::AccessToken;
pub use client::{Client, ClientValidationError, ResourceOwner};
