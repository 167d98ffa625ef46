//! In-memory storage backend for Grantor.
//!
//! This crate provides in-memory implementations of the `TokenStore` and
//! `ClientResolver` traits from `grantor-auth`. Clients live in a papaya
//! lock-free HashMap; tokens live in an insertion-ordered table behind a
//! tokio `RwLock` so that constraint checks and inserts are atomic.
//!
//! # Example
//!
//! ```ignore
//! use grantor_auth::{AuthConfig, Client, ResourceOwner, TokenAttrs};
//! use grantor_db_memory::{InMemoryStorage, create_authority};
//!
//! let storage = std::sync::Arc::new(InMemoryStorage::new());
//! storage.register_client(Client::new("my-app", "My App"))?;
//!
//! let authority = create_authority(storage, AuthConfig::default());
//! let token = authority
//!     .find_or_create_token(&ResourceOwner::new("user-1"), &TokenAttrs::new())
//!     .await?;
//! ```

mod client_impl;
pub mod storage;
mod token_impl;

pub use grantor_auth::{ClientResolver, StorageError, TokenStore};
pub use storage::InMemoryStorage;

use std::sync::Arc;

use grantor_auth::{AccessTokenAuthority, AuthConfig};

/// Creates an authority backed by a single in-memory storage instance.
#[must_use]
pub fn create_authority(storage: Arc<InMemoryStorage>, config: AuthConfig) -> AccessTokenAuthority {
    AccessTokenAuthority::new(storage.clone(), storage, config)
}
