//! `TokenStore` implementation for `InMemoryStorage`.

use async_trait::async_trait;
use grantor_auth::storage::{Constraint, StorageError, StorageResult, TokenFilter, TokenStore};
use grantor_auth::AccessToken;
use time::OffsetDateTime;

use crate::storage::InMemoryStorage;

#[async_trait]
impl TokenStore for InMemoryStorage {
    async fn find_by_token(&self, token: &str) -> StorageResult<Option<AccessToken>> {
        let table = self.tokens.read().await;
        Ok(table
            .by_token
            .get(token)
            .map(|&position| table.rows[position].clone()))
    }

    async fn find_by_refresh_token(
        &self,
        refresh_token: &str,
    ) -> StorageResult<Option<AccessToken>> {
        let table = self.tokens.read().await;
        Ok(table
            .by_refresh_token
            .get(refresh_token)
            .map(|&position| table.rows[position].clone()))
    }

    async fn find_one_by_attributes(
        &self,
        filter: &TokenFilter,
        most_recent_first: bool,
    ) -> StorageResult<Option<AccessToken>> {
        let table = self.tokens.read().await;
        let mut matching = table
            .rows
            .iter()
            .enumerate()
            .filter(|(_, t)| filter.matches(t));

        let found = if most_recent_first {
            matching
                .max_by_key(|(position, t)| (t.inserted_at, *position))
                .map(|(_, t)| t)
        } else {
            matching.next().map(|(_, t)| t)
        };

        Ok(found.cloned())
    }

    async fn find_all_by_owner_non_revoked(
        &self,
        resource_owner_id: &str,
    ) -> StorageResult<Vec<AccessToken>> {
        let table = self.tokens.read().await;
        Ok(table
            .rows
            .iter()
            .filter(|t| t.resource_owner_id == resource_owner_id && t.revoked_at.is_none())
            .cloned()
            .collect())
    }

    async fn insert(&self, token: AccessToken) -> StorageResult<AccessToken> {
        if token.resource_owner_id.is_empty() {
            return Err(StorageError::Constraint(Constraint::ResourceOwnerRequired));
        }
        if let Some(application_id) = &token.application_id
            && !self.application_exists(application_id)
        {
            return Err(StorageError::Constraint(Constraint::ApplicationExists));
        }

        let mut table = self.tokens.write().await;
        if table.by_token.contains_key(&token.token) {
            return Err(StorageError::Constraint(Constraint::TokenUnique));
        }
        if let Some(refresh) = &token.refresh_token
            && table.by_refresh_token.contains_key(refresh)
        {
            return Err(StorageError::Constraint(Constraint::RefreshTokenUnique));
        }

        table.push(token.clone());
        Ok(token)
    }

    async fn revoke(
        &self,
        token: &str,
        at: OffsetDateTime,
    ) -> StorageResult<Option<AccessToken>> {
        let mut table = self.tokens.write().await;
        let Some(&position) = table.by_token.get(token) else {
            return Ok(None);
        };

        let record = &mut table.rows[position];
        record.revoked_at.get_or_insert(at);
        Ok(Some(record.clone()))
    }
}
