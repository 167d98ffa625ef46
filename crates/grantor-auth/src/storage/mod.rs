//! Storage traits consumed by the authority.
//!
//! - [`TokenStore`] - Access token persistence
//! - [`ClientResolver`] - Client application lookup
//!
//! # Implementations
//!
//! Storage implementations are provided in separate crates:
//!
//! - `grantor-db-memory` - In-memory backend

pub mod client;
pub mod error;
pub mod token;

pub use client::ClientResolver;
pub use error::{Constraint, StorageError, StorageResult};
pub use token::{FieldMatch, TokenFilter, TokenStore};
