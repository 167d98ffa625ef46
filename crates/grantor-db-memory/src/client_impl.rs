//! `ClientResolver` implementation for `InMemoryStorage`.

use async_trait::async_trait;
use grantor_auth::storage::{ClientResolver, StorageResult};
use grantor_auth::Client;

use crate::storage::InMemoryStorage;

#[async_trait]
impl ClientResolver for InMemoryStorage {
    async fn resolve(&self, client_id: &str) -> StorageResult<Option<Client>> {
        let clients = self.clients.pin();
        Ok(clients.get(client_id).filter(|c| c.active).cloned())
    }
}
