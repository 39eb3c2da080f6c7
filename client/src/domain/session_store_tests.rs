//! Tests for the session store.

use std::collections::BTreeSet;
use std::sync::Arc;

use async_trait::async_trait;
use rstest::rstest;
use tokio::sync::Notify;

use super::*;
use crate::domain::ErrorCode;
use crate::domain::ports::{InMemoryTokenStore, MockAuthApi, MockTokenStore, RemoteApiError};
use crate::domain::{LoginCredentials, LoginResponse};

fn user(role: &str, permissions: &[&str]) -> SessionUser {
    SessionUser {
        id: "u-1".to_owned(),
        name: "Ada Lovelace".to_owned(),
        email: Some("ada@crm.io".to_owned()),
        role: role.to_owned(),
        permissions: permissions
            .iter()
            .map(|p| (*p).to_owned())
            .collect::<BTreeSet<_>>(),
    }
}

fn login_response(refresh: Option<&str>) -> LoginResponse {
    LoginResponse {
        access_token: AccessToken::new("access-1"),
        refresh_token: refresh.map(AccessToken::new),
        user: user("sales", &["customers:read"]),
    }
}

fn stored(tokens: &InMemoryTokenStore, slot: TokenSlot) -> Option<String> {
    tokens
        .load(slot)
        .expect("in-memory load")
        .map(|token| token.expose().to_owned())
}

fn make_store(api: MockAuthApi, tokens: Arc<InMemoryTokenStore>) -> SessionStore {
    SessionStore::new(Arc::new(api), tokens)
}

#[test]
fn starts_anonymous_without_a_stored_token() {
    let store = make_store(MockAuthApi::new(), Arc::new(InMemoryTokenStore::new()));
    assert_eq!(store.phase(), SessionPhase::Anonymous);
    assert!(!store.is_authenticated());
    assert_eq!(store.user_name(), "Guest");
    assert!(!store.has_permission("customers:read"));
}

#[test]
fn rehydrates_the_access_slot_on_start() {
    let tokens = Arc::new(InMemoryTokenStore::with_access_token("persisted"));
    let store = make_store(MockAuthApi::new(), tokens);
    assert!(store.is_authenticated());
    assert_eq!(store.phase(), SessionPhase::Authenticated);
    assert_eq!(store.user(), None);
}

#[test]
fn unreadable_storage_starts_anonymous() {
    let mut tokens = MockTokenStore::new();
    tokens
        .expect_load()
        .returning(|_| Err(TokenStoreError::corrupt("expected value at line 1")));
    let store = SessionStore::new(Arc::new(MockAuthApi::new()), Arc::new(tokens));
    assert!(!store.is_authenticated());
}

#[rstest]
#[case("", "pw", "Email is required")]
#[case("   ", "pw", "Email is required")]
#[case("ada@crm.io", "", "Password is required")]
#[tokio::test]
async fn blank_credentials_never_reach_the_server(
    #[case] email: &str,
    #[case] password: &str,
    #[case] message: &str,
) {
    let mut api = MockAuthApi::new();
    api.expect_login().never();
    let store = make_store(api, Arc::new(InMemoryTokenStore::new()));

    let err = store.login(email, password).await.expect_err("must fail");
    assert_eq!(err.code(), ErrorCode::InvalidRequest);
    assert_eq!(err.message(), message);
    assert_eq!(store.last_error().as_deref(), Some(message));
}

#[tokio::test]
async fn login_stores_tokens_and_user() {
    let mut api = MockAuthApi::new();
    api.expect_login()
        .withf(|creds: &LoginCredentials| creds.email() == "ada@crm.io" && creds.password() == "pw")
        .times(1)
        .return_once(|_| Ok(login_response(Some("refresh-1"))));
    let tokens = Arc::new(InMemoryTokenStore::new());
    let store = make_store(api, tokens.clone());

    let signed_in = store.login(" ada@crm.io ", "pw").await.expect("login succeeds");

    assert_eq!(signed_in.name, "Ada Lovelace");
    assert_eq!(store.phase(), SessionPhase::Authenticated);
    assert_eq!(store.user_name(), "Ada Lovelace");
    assert!(store.has_permission("customers:read"));
    assert!(!store.has_permission("customers:delete"));
    assert!(!store.is_loading());
    assert_eq!(stored(&tokens, TokenSlot::Access).as_deref(), Some("access-1"));
    assert_eq!(stored(&tokens, TokenSlot::Refresh).as_deref(), Some("refresh-1"));
}

#[tokio::test]
async fn login_without_refresh_token_clears_a_stale_one() {
    let mut api = MockAuthApi::new();
    api.expect_login()
        .times(1)
        .return_once(|_| Ok(login_response(None)));
    let tokens = Arc::new(InMemoryTokenStore::new());
    tokens
        .save(TokenSlot::Refresh, &AccessToken::new("stale"))
        .expect("seed refresh");
    let store = make_store(api, tokens.clone());

    store.login("ada@crm.io", "pw").await.expect("login succeeds");
    assert_eq!(stored(&tokens, TokenSlot::Refresh), None);
}

#[tokio::test]
async fn failed_login_clears_tokens_and_reraises() {
    let mut api = MockAuthApi::new();
    api.expect_login()
        .times(1)
        .return_once(|_| Err(RemoteApiError::unauthorized("Invalid credentials")));
    let tokens = Arc::new(InMemoryTokenStore::with_access_token("old"));
    let store = make_store(api, tokens.clone());

    let err = store.login("ada@crm.io", "nope").await.expect_err("must fail");

    assert_eq!(err.code(), ErrorCode::Unauthorized);
    assert_eq!(err.message(), "Login failed: not authorised: Invalid credentials");
    assert_eq!(store.phase(), SessionPhase::Error);
    assert_eq!(store.last_error().as_deref(), Some(err.message()));
    assert!(!store.is_authenticated());
    assert_eq!(stored(&tokens, TokenSlot::Access), None);
}

#[rstest]
#[case(true)]
#[case(false)]
#[tokio::test]
async fn logout_always_clears_state_and_storage(#[case] remote_ok: bool) {
    let mut api = MockAuthApi::new();
    api.expect_logout().times(1).return_once(move || {
        if remote_ok {
            Ok(())
        } else {
            Err(RemoteApiError::transport("offline"))
        }
    });
    let tokens = Arc::new(InMemoryTokenStore::with_access_token("access-1"));
    tokens
        .save(TokenSlot::Refresh, &AccessToken::new("refresh-1"))
        .expect("seed refresh");
    let store = make_store(api, tokens.clone());

    store.logout().await;

    assert_eq!(store.phase(), SessionPhase::Anonymous);
    assert_eq!(store.user(), None);
    assert_eq!(stored(&tokens, TokenSlot::Access), None);
    assert_eq!(stored(&tokens, TokenSlot::Refresh), None);
}

#[tokio::test]
async fn logout_without_token_skips_the_remote_call() {
    let mut api = MockAuthApi::new();
    api.expect_logout().never();
    let store = make_store(api, Arc::new(InMemoryTokenStore::new()));
    store.logout().await;
    assert_eq!(store.phase(), SessionPhase::Anonymous);
}

#[tokio::test]
async fn fetch_user_is_a_no_op_without_token() {
    let mut api = MockAuthApi::new();
    api.expect_current_user().never();
    let store = make_store(api, Arc::new(InMemoryTokenStore::new()));
    assert_eq!(store.fetch_user().await, FetchUserOutcome::Skipped);
}

#[tokio::test]
async fn fetch_user_refreshes_the_profile() {
    let mut api = MockAuthApi::new();
    api.expect_current_user()
        .times(1)
        .return_once(|| Ok(user("admin", &[])));
    let store = make_store(api, Arc::new(InMemoryTokenStore::with_access_token("t")));

    let outcome = store.fetch_user().await;

    assert_eq!(outcome, FetchUserOutcome::Refreshed(user("admin", &[])));
    assert!(store.is_admin());
    assert!(store.has_permission("anything:at-all"));
}

#[tokio::test]
async fn fetch_user_failure_fails_closed() {
    let mut api = MockAuthApi::new();
    api.expect_current_user()
        .times(1)
        .return_once(|| Err(RemoteApiError::unauthorized("expired")));
    api.expect_logout().times(1).return_once(|| Ok(()));
    let tokens = Arc::new(InMemoryTokenStore::with_access_token("t"));
    tokens
        .save(TokenSlot::Refresh, &AccessToken::new("r"))
        .expect("seed refresh");
    let store = make_store(api, tokens.clone());

    assert_eq!(store.fetch_user().await, FetchUserOutcome::SessionInvalidated);
    assert!(!store.is_authenticated());
    assert_eq!(stored(&tokens, TokenSlot::Access), None);
    assert_eq!(stored(&tokens, TokenSlot::Refresh), None);
}

#[tokio::test]
async fn refresh_replaces_the_access_token() {
    let mut api = MockAuthApi::new();
    api.expect_refresh()
        .withf(|token: &AccessToken| token.expose() == "refresh-1")
        .times(1)
        .return_once(|_| Ok(AccessToken::new("access-2")));
    let tokens = Arc::new(InMemoryTokenStore::with_access_token("access-1"));
    tokens
        .save(TokenSlot::Refresh, &AccessToken::new("refresh-1"))
        .expect("seed refresh");
    let store = make_store(api, tokens.clone());

    store.refresh_access_token().await.expect("refresh succeeds");
    assert_eq!(stored(&tokens, TokenSlot::Access).as_deref(), Some("access-2"));
    assert!(store.is_authenticated());
}

#[tokio::test]
async fn refresh_without_refresh_token_fails() {
    let mut api = MockAuthApi::new();
    api.expect_refresh().never();
    let store = make_store(api, Arc::new(InMemoryTokenStore::new()));
    let err = store.refresh_access_token().await.expect_err("must fail");
    assert_eq!(err.code(), ErrorCode::SessionInvalid);
}

struct GatedAuthApi {
    gate: Notify,
}

#[async_trait]
impl AuthApi for GatedAuthApi {
    async fn login(&self, _credentials: &LoginCredentials) -> Result<LoginResponse, RemoteApiError> {
        self.gate.notified().await;
        Ok(login_response(Some("late-refresh")))
    }

    async fn logout(&self) -> Result<(), RemoteApiError> {
        Ok(())
    }

    async fn refresh(&self, _refresh_token: &AccessToken) -> Result<AccessToken, RemoteApiError> {
        Err(RemoteApiError::transport("unused"))
    }

    async fn current_user(&self) -> Result<SessionUser, RemoteApiError> {
        Err(RemoteApiError::transport("unused"))
    }
}

#[tokio::test]
async fn late_login_after_logout_is_discarded() {
    let api = Arc::new(GatedAuthApi {
        gate: Notify::new(),
    });
    let tokens = Arc::new(InMemoryTokenStore::new());
    let store = SessionStore::new(api.clone(), tokens.clone());

    let (login, ()) = tokio::join!(store.login("ada@crm.io", "pw"), async {
        tokio::task::yield_now().await;
        assert_eq!(store.phase(), SessionPhase::Authenticating);
        assert!(store.is_loading());
        store.logout().await;
        api.gate.notify_one();
    });

    let err = login.expect_err("late completion is discarded");
    assert_eq!(err.code(), ErrorCode::SessionInvalid);
    assert_eq!(store.phase(), SessionPhase::Anonymous);
    assert_eq!(store.user(), None);
    assert_eq!(stored(&tokens, TokenSlot::Access), None);
    assert_eq!(stored(&tokens, TokenSlot::Refresh), None);
    assert!(!store.is_loading());
}
