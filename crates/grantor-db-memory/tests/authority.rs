//! End-to-end tests for the access token authority over in-memory storage.

use std::collections::HashSet;
use std::sync::Arc;

use grantor_auth::{
    AccessToken, AccessTokenAuthority, AuthConfig, AuthError, Client, RequestContext, ResourceOwner,
    StorageResult, TokenAttrs, TokenField, TokenFilter, TokenStore,
};
use grantor_db_memory::{InMemoryStorage, create_authority};
use time::{Duration, OffsetDateTime};
use uuid::Uuid;

fn setup() -> (AccessTokenAuthority, Arc<InMemoryStorage>, Client) {
    let storage = Arc::new(InMemoryStorage::new());
    let client = Client::new("app-1", "Application One");
    storage.register_client(client.clone()).unwrap();
    let authority = create_authority(storage.clone(), AuthConfig::default());
    (authority, storage, client)
}

#[tokio::test]
async fn test_minted_tokens_are_unique() {
    let (authority, storage, _) = setup();
    let owner = ResourceOwner::new("user-1");

    let mut values = HashSet::new();
    for _ in 0..10_000 {
        let token = authority
            .mint_token(&owner, &TokenAttrs::new().with_refresh_token(true))
            .await
            .unwrap();
        assert!(values.insert(token.token));
        assert!(values.insert(token.refresh_token.unwrap()));
    }

    assert_eq!(storage.token_count().await, 10_000);
}

#[tokio::test]
async fn test_find_or_create_is_idempotent() {
    let (authority, storage, client) = setup();
    let owner = ResourceOwner::new("user-1");
    let attrs = TokenAttrs::new()
        .with_application(client)
        .with_scopes("read write")
        .with_expires_in(3600);

    let first = authority.find_or_create_token(&owner, &attrs).await.unwrap();
    let second = authority.find_or_create_token(&owner, &attrs).await.unwrap();

    assert_eq!(first, second);
    assert_eq!(storage.token_count().await, 1);
}

#[tokio::test]
async fn test_find_or_create_ignores_refresh_flag_when_matching() {
    let (authority, storage, _) = setup();
    let owner = ResourceOwner::new("user-1");

    let first = authority
        .find_or_create_token(&owner, &TokenAttrs::new())
        .await
        .unwrap();
    let second = authority
        .find_or_create_token(&owner, &TokenAttrs::new().with_refresh_token(true))
        .await
        .unwrap();

    assert_eq!(first.id, second.id);
    assert_eq!(second.refresh_token, None);
    assert_eq!(storage.token_count().await, 1);
}

#[tokio::test]
async fn test_find_or_create_different_attributes_mint_new_tokens() {
    let (authority, storage, client) = setup();
    let owner = ResourceOwner::new("user-1");

    let read = authority
        .find_or_create_token(&owner, &TokenAttrs::new().with_scopes("read"))
        .await
        .unwrap();
    let write = authority
        .find_or_create_token(&owner, &TokenAttrs::new().with_scopes("write"))
        .await
        .unwrap();
    let bound = authority
        .find_or_create_token(
            &owner,
            &TokenAttrs::new().with_scopes("read").with_application(client),
        )
        .await
        .unwrap();

    assert_ne!(read.id, write.id);
    assert_ne!(read.id, bound.id);
    assert_eq!(storage.token_count().await, 3);
}

#[tokio::test]
async fn test_find_or_create_replaces_expired_token() {
    let (authority, storage, _) = setup();
    let owner = ResourceOwner::new("user-1");

    let expired = AccessToken {
        id: Uuid::new_v4(),
        token: "expired-token".to_string(),
        refresh_token: None,
        resource_owner_id: "user-1".to_string(),
        application_id: None,
        scopes: "public".to_string(),
        expires_in: Some(60),
        inserted_at: OffsetDateTime::now_utc() - Duration::hours(1),
        revoked_at: None,
    };
    storage.insert(expired.clone()).await.unwrap();
    assert!(!authority.is_accessible(Some(&expired)));

    let fresh = authority
        .find_or_create_token(&owner, &TokenAttrs::new().with_expires_in(60))
        .await
        .unwrap();

    assert_ne!(fresh.token, expired.token);
    assert!(authority.is_accessible(Some(&fresh)));
    assert_eq!(storage.token_count().await, 2);
}

#[tokio::test]
async fn test_default_scopes_applied() {
    let (authority, _, _) = setup();

    let token = authority
        .mint_token(&ResourceOwner::new("user-1"), &TokenAttrs::new())
        .await
        .unwrap();

    assert_eq!(token.scopes, "public");
}

#[tokio::test]
async fn test_matching_token_uses_scope_sets() {
    let (authority, _, client) = setup();
    let owner = ResourceOwner::new("U1");

    let minted = authority
        .mint_token(
            &owner,
            &TokenAttrs::new()
                .with_application(client.clone())
                .with_scopes("read write"),
        )
        .await
        .unwrap();

    assert_eq!(minted.scopes, "read write");
    assert_eq!(minted.application_id, Some(client.id));
    assert_eq!(minted.refresh_token, None);

    let found = authority
        .get_matching_token_for(&owner, Some(&client), ["write", "read"])
        .await
        .unwrap();
    assert_eq!(found.map(|t| t.id), Some(minted.id));

    let found = authority
        .get_matching_token_for(&owner, Some(&client), "read")
        .await
        .unwrap();
    assert_eq!(found, None);
}

#[tokio::test]
async fn test_matching_token_only_considers_latest() {
    let (authority, _, client) = setup();
    let owner = ResourceOwner::new("U1");

    authority
        .mint_token(
            &owner,
            &TokenAttrs::new()
                .with_application(client.clone())
                .with_scopes("read"),
        )
        .await
        .unwrap();
    let newer = authority
        .mint_token(
            &owner,
            &TokenAttrs::new()
                .with_application(client.clone())
                .with_scopes("write"),
        )
        .await
        .unwrap();

    // The older "read" token is never consulted
    let found = authority
        .get_matching_token_for(&owner, Some(&client), "read")
        .await
        .unwrap();
    assert_eq!(found, None);

    let found = authority
        .get_matching_token_for(&owner, Some(&client), "write")
        .await
        .unwrap();
    assert_eq!(found.map(|t| t.id), Some(newer.id));
}

#[tokio::test]
async fn test_matching_token_skips_revoked() {
    let (authority, _, client) = setup();
    let owner = ResourceOwner::new("U1");
    let attrs = TokenAttrs::new()
        .with_application(client.clone())
        .with_scopes("read");

    let older = authority.mint_token(&owner, &attrs).await.unwrap();
    let newer = authority.mint_token(&owner, &attrs).await.unwrap();
    authority.revoke(&newer.token).await.unwrap();

    let found = authority
        .get_matching_token_for(&owner, Some(&client), "read")
        .await
        .unwrap();
    assert_eq!(found.map(|t| t.id), Some(older.id));
}

#[tokio::test]
async fn test_app_less_and_app_bound_tokens_are_isolated() {
    let (authority, _, client) = setup();
    let owner = ResourceOwner::new("user-1");

    let bound = authority
        .mint_token(
            &owner,
            &TokenAttrs::new()
                .with_application(client.clone())
                .with_scopes("read"),
        )
        .await
        .unwrap();

    let found = authority
        .get_matching_token_for(&owner, None, "read")
        .await
        .unwrap();
    assert_eq!(found, None);

    let app_less = authority
        .find_or_create_token(&owner, &TokenAttrs::new().with_scopes("read"))
        .await
        .unwrap();
    assert_ne!(app_less.id, bound.id);
    assert_eq!(app_less.application_id, None);

    let found = authority
        .get_matching_token_for(&owner, Some(&client), "read")
        .await
        .unwrap();
    assert_eq!(found.map(|t| t.id), Some(bound.id));
}

#[tokio::test]
async fn test_revocation_is_terminal() {
    let (authority, _, _) = setup();
    let owner = ResourceOwner::new("user-1");

    let token = authority
        .find_or_create_token(&owner, &TokenAttrs::new())
        .await
        .unwrap();
    assert!(authority.is_accessible(Some(&token)));

    let revoked = authority.revoke(&token.token).await.unwrap();
    assert!(!authority.is_accessible(Some(&revoked)));

    let again = authority.revoke(&token.token).await.unwrap();
    assert_eq!(again.revoked_at, revoked.revoked_at);

    let stored = authority.get_by_token(&token.token).await.unwrap();
    assert_eq!(stored.and_then(|t| t.revoked_at), revoked.revoked_at);

    let replacement = authority
        .find_or_create_token(&owner, &TokenAttrs::new())
        .await
        .unwrap();
    assert_ne!(replacement.token, token.token);

    let active = authority.get_active_tokens_for(&owner).await.unwrap();
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].id, replacement.id);

    let err = authority.revoke("no-such-token").await.unwrap_err();
    assert!(matches!(err, AuthError::InvalidRequest { .. }));
}

#[tokio::test]
async fn test_lookup_by_refresh_token() {
    let (authority, _, _) = setup();
    let owner = ResourceOwner::new("user-1");

    let token = authority
        .mint_token(&owner, &TokenAttrs::new().with_refresh_token(true))
        .await
        .unwrap();
    let refresh = token.refresh_token.clone().unwrap();

    let found = authority.get_by_refresh_token(&refresh).await.unwrap();
    assert_eq!(found, Some(token.clone()));
    assert_eq!(authority.get_by_refresh_token(&token.token).await.unwrap(), None);
    assert!(!authority.is_accessible(None));
}

#[tokio::test]
async fn test_mint_for_unknown_application() {
    let (authority, storage, _) = setup();
    let stranger = Client::new("stranger", "Not Registered");

    let err = authority
        .mint_token(
            &ResourceOwner::new("user-1"),
            &TokenAttrs::new().with_application(stranger.clone()),
        )
        .await
        .unwrap_err();

    assert_eq!(
        err,
        AuthError::validation(vec![AuthError::application_constraint(stranger.id)])
    );
    assert_eq!(storage.token_count().await, 0);
}

/// Token store that forces generated values to collide with stored ones.
struct CollidingStore {
    inner: Arc<InMemoryStorage>,
    token: Option<String>,
    refresh_token: Option<String>,
}

#[async_trait::async_trait]
impl TokenStore for CollidingStore {
    async fn find_by_token(&self, token: &str) -> StorageResult<Option<AccessToken>> {
        self.inner.find_by_token(token).await
    }

    async fn find_by_refresh_token(
        &self,
        refresh_token: &str,
    ) -> StorageResult<Option<AccessToken>> {
        self.inner.find_by_refresh_token(refresh_token).await
    }

    async fn find_one_by_attributes(
        &self,
        filter: &TokenFilter,
        most_recent_first: bool,
    ) -> StorageResult<Option<AccessToken>> {
        self.inner.find_one_by_attributes(filter, most_recent_first).await
    }

    async fn find_all_by_owner_non_revoked(
        &self,
        resource_owner_id: &str,
    ) -> StorageResult<Vec<AccessToken>> {
        self.inner.find_all_by_owner_non_revoked(resource_owner_id).await
    }

    async fn insert(&self, mut token: AccessToken) -> StorageResult<AccessToken> {
        if let Some(value) = &self.token {
            token.token = value.clone();
        }
        if let Some(value) = &self.refresh_token {
            token.refresh_token = Some(value.clone());
        }
        self.inner.insert(token).await
    }

    async fn revoke(
        &self,
        token: &str,
        at: OffsetDateTime,
    ) -> StorageResult<Option<AccessToken>> {
        self.inner.revoke(token, at).await
    }
}

#[tokio::test]
async fn test_mint_reports_token_collisions() {
    let (authority, storage, _) = setup();
    let owner = ResourceOwner::new("user-1");
    let existing = authority
        .mint_token(&owner, &TokenAttrs::new().with_refresh_token(true))
        .await
        .unwrap();

    let colliding = AccessTokenAuthority::new(
        Arc::new(CollidingStore {
            inner: storage.clone(),
            token: Some(existing.token.clone()),
            refresh_token: None,
        }),
        storage.clone(),
        AuthConfig::default(),
    );
    let err = colliding
        .mint_token(&owner, &TokenAttrs::new())
        .await
        .unwrap_err();
    assert_eq!(
        err,
        AuthError::validation(vec![AuthError::token_constraint(TokenField::Token)])
    );

    let colliding = AccessTokenAuthority::new(
        Arc::new(CollidingStore {
            inner: storage.clone(),
            token: None,
            refresh_token: existing.refresh_token.clone(),
        }),
        storage.clone(),
        AuthConfig::default(),
    );
    let err = colliding
        .mint_token(&owner, &TokenAttrs::new().with_refresh_token(true))
        .await
        .unwrap_err();
    assert_eq!(
        err,
        AuthError::validation(vec![AuthError::token_constraint(TokenField::RefreshToken)])
    );

    assert_eq!(storage.token_count().await, 1);
}

#[tokio::test]
async fn test_mint_for_replaced_application() {
    let (authority, storage, client) = setup();
    let replacement = Client::new(client.client_id.clone(), "Application One v2");
    storage.register_client(replacement.clone()).unwrap();

    let err = authority
        .mint_token(
            &ResourceOwner::new("user-1"),
            &TokenAttrs::new().with_application(client.clone()),
        )
        .await
        .unwrap_err();
    assert_eq!(
        err,
        AuthError::validation(vec![AuthError::application_constraint(client.id)])
    );

    let token = authority
        .mint_token(
            &ResourceOwner::new("user-1"),
            &TokenAttrs::new().with_application(replacement.clone()),
        )
        .await
        .unwrap();
    assert_eq!(token.application_id, Some(replacement.id));
}

#[tokio::test]
async fn test_unbounded_lifetime_is_reusable() {
    let (authority, storage, _) = setup();
    let owner = ResourceOwner::new("user-1");
    let attrs = TokenAttrs::new().with_expires_in(i64::MAX);

    let first = authority.find_or_create_token(&owner, &attrs).await.unwrap();
    let second = authority.find_or_create_token(&owner, &attrs).await.unwrap();

    assert_eq!(first.id, second.id);
    assert!(authority.is_accessible(Some(&second)));
    assert_eq!(storage.token_count().await, 1);
}

#[tokio::test]
async fn test_token_endpoint_flow() {
    let (authority, _, client) = setup();

    let ctx = RequestContext::default().with_param("client_id", "app-1");
    let ctx = authority.load_client(ctx).await;
    let resolved = ctx.into_client().unwrap();
    assert_eq!(resolved, client);

    let scopes = authority.validate_scopes(None, Some(&resolved)).unwrap();
    let attrs = authority
        .config()
        .token_attrs()
        .with_application(resolved)
        .with_scopes(scopes);
    let token = authority
        .find_or_create_token(&ResourceOwner::new("user-1"), &attrs)
        .await
        .unwrap();

    assert_eq!(token.scopes, "public");
    assert_eq!(token.expires_in, Some(7200));
    assert_eq!(token.application_id, Some(client.id));

    let ctx = RequestContext::default().with_param("client_id", "unknown");
    let err = authority.load_client(ctx).await.into_client().unwrap_err();
    assert!(matches!(err, AuthError::InvalidClient { .. }));
}
