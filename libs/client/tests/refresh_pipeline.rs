use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crewdesk_client::api;
use crewdesk_client::store::{CredentialStore, MemoryCredentialStore, SharedCredentialStore};
use crewdesk_client::{ApiClient, ApiError, AuthSession, RefreshError};
use crewdesk_core::{TaskPriority, TokenPair};
use crewdesk_mock_server::MockState;

async fn start() -> (Arc<MockState>, String) {
    let state = MockState::new();
    let (addr, _server) = crewdesk_mock_server::spawn(Arc::clone(&state))
        .await
        .expect("mock server starts");
    (state, format!("http://{addr}"))
}

fn client_with(base: &str, pair: TokenPair) -> (ApiClient, SharedCredentialStore) {
    let store: SharedCredentialStore = Arc::new(MemoryCredentialStore::with_tokens(pair));
    (ApiClient::new(base, Arc::clone(&store)), store)
}

#[tokio::test]
async fn login_stores_tokens_and_profile() {
    let (_state, base) = start().await;
    let store: SharedCredentialStore = Arc::new(MemoryCredentialStore::new());
    let session = AuthSession::new(ApiClient::new(&base, Arc::clone(&store)));

    let user = session.login("owner@example.com", "hunter2").await.unwrap();
    assert_eq!(user.email, "owner@example.com");
    assert!(store.tokens().await.unwrap().is_some());
    assert_eq!(
        store.user().await.unwrap().unwrap().email,
        "owner@example.com"
    );
    assert!(session.is_authenticated().await.unwrap());
}

#[tokio::test]
async fn expired_access_token_is_refreshed_transparently() {
    let (state, base) = start().await;
    let owner = state.user_by_email("owner@example.com").unwrap();
    let stale = state.issue_stale_pair(&owner).await;
    let (client, store) = client_with(&base, stale.clone());

    let me = api::auth::me(&client).await.unwrap();
    assert_eq!(me.email, "owner@example.com");
    assert_eq!(state.counters.refresh_calls.load(Ordering::SeqCst), 1);

    let rotated = store.tokens().await.unwrap().unwrap();
    assert_ne!(rotated.access_token, stale.access_token);
    assert_ne!(rotated.refresh_token, stale.refresh_token);
}

#[tokio::test]
async fn concurrent_unauthorized_requests_share_one_refresh() {
    let (state, base) = start().await;
    let owner = state.user_by_email("owner@example.com").unwrap();
    let stale = state.issue_stale_pair(&owner).await;
    let (client, _store) = client_with(&base, stale);

    let mut calls = Vec::new();
    for _ in 0..3 {
        let client = client.clone();
        calls.push(tokio::spawn(async move { api::auth::me(&client).await }));
    }
    for call in calls {
        let user = call.await.unwrap().unwrap();
        assert_eq!(user.email, "owner@example.com");
    }
    // The single non-trivial property of the pipeline: N concurrent 401s,
    // one refresh call.
    assert_eq!(state.counters.refresh_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn replayed_request_is_not_retried_a_second_time() {
    let (state, base) = start().await;
    let owner = state.user_by_email("owner@example.com").unwrap();
    // Refresh "succeeds" but rotates to another expired access token, so the
    // replay fails with 401 again. That second 401 must propagate.
    state.stale_refresh.store(true, Ordering::SeqCst);
    let stale = state.issue_stale_pair(&owner).await;
    let (client, _store) = client_with(&base, stale);

    let err = api::auth::me(&client).await.unwrap_err();
    assert!(err.is_unauthorized(), "expected 401 passthrough, got {err}");
    assert_eq!(state.counters.refresh_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn refresh_failure_clears_session_and_notifies() {
    let (state, base) = start().await;
    let owner = state.user_by_email("owner@example.com").unwrap();
    // Expired access token and a refresh token the backend never issued.
    let access = state.mint_access(&owner, time::Duration::seconds(-300));
    let bogus = TokenPair::bearer(access, "not-a-refresh-token");
    let (client, store) = client_with(&base, bogus);
    store.set_user(owner.clone()).await.unwrap();

    let expired = Arc::new(AtomicBool::new(false));
    {
        let expired = Arc::clone(&expired);
        client.events().on_session_expired(move || {
            expired.store(true, Ordering::SeqCst);
        });
    }

    let err = api::auth::me(&client).await.unwrap_err();
    match err {
        ApiError::Refresh(RefreshError::Rejected { status }) => assert_eq!(status, 401),
        other => panic!("expected refresh rejection, got {other}"),
    }
    assert!(expired.load(Ordering::SeqCst), "session-expired hook fired");
    assert!(store.tokens().await.unwrap().is_none());
    assert!(store.user().await.unwrap().is_none());
}

#[tokio::test]
async fn missing_refresh_token_is_terminal() {
    let (_state, base) = start().await;
    let store: SharedCredentialStore = Arc::new(MemoryCredentialStore::new());
    let client = ApiClient::new(&base, Arc::clone(&store));

    let expired = Arc::new(AtomicBool::new(false));
    {
        let expired = Arc::clone(&expired);
        client.events().on_session_expired(move || {
            expired.store(true, Ordering::SeqCst);
        });
    }

    let err = api::auth::me(&client).await.unwrap_err();
    match err {
        ApiError::Refresh(RefreshError::MissingRefreshToken) => {}
        other => panic!("expected missing-refresh-token, got {other}"),
    }
    assert!(expired.load(Ordering::SeqCst));
}

#[tokio::test]
async fn non_401_errors_propagate_unchanged() {
    let (state, base) = start().await;
    let owner = state.user_by_email("owner@example.com").unwrap();
    let pair = state.issue_pair(&owner).await;
    let (client, _store) = client_with(&base, pair);

    let err = api::tasks::delete(&client, 424242).await.unwrap_err();
    assert_eq!(err.status(), Some(reqwest::StatusCode::NOT_FOUND));
    assert_eq!(state.counters.refresh_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn task_crud_passes_through() {
    let (state, base) = start().await;
    let owner = state.user_by_email("owner@example.com").unwrap();
    let pair = state.issue_pair(&owner).await;
    let (client, _store) = client_with(&base, pair);

    let created = api::tasks::create(
        &client,
        &api::tasks::TaskCreate {
            title: "Restock pantry".into(),
            description: None,
            assigned_to: 2,
            priority: TaskPriority::High,
            due_date: Some("2026-08-14".into()),
        },
    )
    .await
    .unwrap();
    assert_eq!(created.assignee.as_ref().unwrap().id, 2);

    let mine = api::tasks::list(
        &client,
        &api::tasks::TaskQuery {
            assigned_to: Some(2),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(mine.len(), 1);
    assert_eq!(mine[0].title, "Restock pantry");

    api::tasks::delete(&client, created.id).await.unwrap();
    let remaining = api::tasks::list(&client, &api::tasks::TaskQuery::default())
        .await
        .unwrap();
    assert!(remaining.is_empty());
}
