use std::collections::HashMap;
use std::sync::Arc;

use grantor_auth::{AccessToken, AuthError, AuthResult, Client};
use papaya::HashMap as PapayaHashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Insertion-ordered token records with secondary indexes.
#[derive(Debug, Default)]
pub(crate) struct TokenTable {
    /// Records in insertion order; the position breaks `inserted_at` ties.
    pub(crate) rows: Vec<AccessToken>,
    /// Bearer value -> row position.
    pub(crate) by_token: HashMap<String, usize>,
    /// Refresh token value -> row position.
    pub(crate) by_refresh_token: HashMap<String, usize>,
}

impl TokenTable {
    pub(crate) fn push(&mut self, token: AccessToken) {
        let position = self.rows.len();
        self.by_token.insert(token.token.clone(), position);
        if let Some(refresh) = &token.refresh_token {
            self.by_refresh_token.insert(refresh.clone(), position);
        }
        self.rows.push(token);
    }
}

/// In-memory token and client storage.
///
/// This storage implementation provides:
/// - Lock-free client lookup via papaya::HashMap
/// - Atomic token inserts with uniqueness and reference checks
/// - Deterministic "most recent" ordering for attribute lookups
#[derive(Debug, Default)]
pub struct InMemoryStorage {
    /// Clients keyed by public client identifier
    pub(crate) clients: Arc<PapayaHashMap<String, Client>>,
    /// Client identifiers keyed by internal application id
    pub(crate) applications: Arc<PapayaHashMap<Uuid, String>>,
    /// Token records
    pub(crate) tokens: Arc<RwLock<TokenTable>>,
}

impl InMemoryStorage {
    /// Creates an empty storage.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers or replaces a client application.
    ///
    /// Replacing a client with a record under a new `id` retires the old
    /// application id, so tokens can no longer be bound to it.
    ///
    /// # Errors
    ///
    /// Returns `InvalidClient` if the client record is invalid or its `id`
    /// is already registered under another `client_id`.
    pub fn register_client(&self, client: Client) -> AuthResult<()> {
        client
            .validate()
            .map_err(|e| AuthError::invalid_client(e.to_string()))?;

        let applications = self.applications.pin();
        if let Some(owner) = applications.get(&client.id)
            && *owner != client.client_id
        {
            return Err(AuthError::invalid_client(format!(
                "Application {} is already registered as '{}'",
                client.id, owner
            )));
        }

        let clients = self.clients.pin();
        if let Some(previous) = clients.insert(client.client_id.clone(), client.clone())
            && previous.id != client.id
        {
            tracing::debug!(
                client_id = %client.client_id,
                application_id = %previous.id,
                "Retired replaced application id"
            );
            applications.remove(&previous.id);
        }
        applications.insert(client.id, client.client_id.clone());

        tracing::debug!(client_id = %client.client_id, application_id = %client.id, "Registered client");
        Ok(())
    }

    /// Returns `true` if an application with this id is registered.
    pub(crate) fn application_exists(&self, application_id: &Uuid) -> bool {
        self.applications.pin().contains_key(application_id)
    }

    /// Number of stored token records, revoked ones included.
    pub async fn token_count(&self) -> usize {
        self.tokens.read().await.rows.len()
    }
}
