//! Client resolver trait.
//!
//! The authority only ever reads client registrations; managing them is the
//! job of the surrounding server.

use async_trait::async_trait;

use super::error::StorageResult;
use crate::types::Client;

/// Read-only lookup of registered client applications.
///
/// # Example
///
/// ```ignore
/// use grantor_auth::storage::ClientResolver;
///
/// async fn example(resolver: &impl ClientResolver) {
///     if let Some(client) = resolver.resolve("my-app").await? {
///         println!("Found client: {}", client.name);
///     }
/// }
/// ```
#[async_trait]
pub trait ClientResolver: Send + Sync {
    /// Find a client by its public OAuth `client_id`.
    ///
    /// Returns `None` if the client doesn't exist or is not active.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn resolve(&self, client_id: &str) -> StorageResult<Option<Client>>;
}
