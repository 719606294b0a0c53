use std::sync::Arc;
use std::sync::atomic::Ordering;
use std::time::Duration;

use crewdesk_chat::{ChatConfig, ChatHandle, ConversationLog, ReconnectPolicy, connect};
use crewdesk_client::store::{MemoryCredentialStore, SharedCredentialStore};
use crewdesk_core::ChatRole;
use crewdesk_mock_server::MockState;

const WAIT: Duration = Duration::from_secs(5);

async fn start() -> (Arc<MockState>, String, SharedCredentialStore) {
    let state = MockState::new();
    let (addr, _server) = crewdesk_mock_server::spawn(Arc::clone(&state))
        .await
        .expect("mock server starts");
    let owner = state.user_by_email("owner@example.com").unwrap();
    let pair = state.issue_pair(&owner).await;
    let store: SharedCredentialStore = Arc::new(MemoryCredentialStore::with_tokens(pair));
    (state, format!("ws://{addr}"), store)
}

fn fast_policy() -> ReconnectPolicy {
    ReconnectPolicy::new(Duration::from_millis(10), Duration::from_millis(80))
}

async fn wait_connected(handle: &ChatHandle, expected: bool) {
    let mut status = handle.watch_status();
    tokio::time::timeout(WAIT, async {
        while *status.borrow_and_update() != expected {
            status.changed().await.expect("transport alive");
        }
    })
    .await
    .expect("connection status change");
}

async fn wait_for(handle: &ChatHandle, predicate: impl Fn(&ConversationLog) -> bool) -> ConversationLog {
    let mut revision = handle.watch_revision();
    tokio::time::timeout(WAIT, async {
        loop {
            let snapshot = handle.snapshot().await;
            if predicate(&snapshot) {
                return snapshot;
            }
            revision.changed().await.expect("transport alive");
        }
    })
    .await
    .expect("conversation update")
}

#[tokio::test]
async fn round_trip_preserves_order_and_typing_lifecycle() {
    let (_state, ws_base, store) = start().await;
    let handle = connect(ChatConfig::new(ws_base).with_policy(fast_policy()), store);

    wait_connected(&handle, true).await;
    let with_conversation = wait_for(&handle, |log| log.conversation_id().is_some()).await;
    assert!(with_conversation.messages().is_empty());

    handle.send("hello");
    let settled = wait_for(&handle, |log| log.messages().len() >= 2 && !log.is_typing()).await;

    let roles: Vec<ChatRole> = settled.messages().iter().map(|m| m.role).collect();
    assert_eq!(roles, vec![ChatRole::User, ChatRole::Assistant]);
    assert_eq!(settled.messages()[0].content, "hello");
    assert_eq!(settled.messages()[1].content, "Noted: hello");

    handle.close();
    handle.join().await;
}

#[tokio::test]
async fn assistant_actions_survive_dispatch() {
    let (_state, ws_base, store) = start().await;
    let handle = connect(ChatConfig::new(ws_base).with_policy(fast_policy()), store);
    wait_connected(&handle, true).await;

    handle.send("add a task for tomorrow");
    let settled = wait_for(&handle, |log| log.messages().len() >= 2).await;
    let reply = &settled.messages()[1];
    assert_eq!(reply.role, ChatRole::Assistant);
    assert!(reply.actions.is_some(), "echoed actions should be kept");

    handle.close();
    handle.join().await;
}

#[tokio::test]
async fn reconnects_after_server_drop() {
    let (state, ws_base, store) = start().await;
    let handle = connect(ChatConfig::new(ws_base).with_policy(fast_policy()), store);
    wait_connected(&handle, true).await;

    // The mock hangs up on this message without replying.
    handle.send("/close");
    wait_connected(&handle, false).await;
    wait_connected(&handle, true).await;
    assert!(state.counters.ws_connections.load(Ordering::SeqCst) >= 2);

    handle.send("back again");
    let settled = wait_for(&handle, |log| {
        log.messages()
            .iter()
            .any(|m| m.content == "Noted: back again")
    })
    .await;
    // the pre-drop user message is still there, in order
    assert_eq!(settled.messages()[0].content, "/close");

    handle.close();
    handle.join().await;
}

#[tokio::test]
async fn send_while_disconnected_is_a_no_op() {
    // Nothing listens on this port; the transport stays in its retry loop.
    let store: SharedCredentialStore = Arc::new(MemoryCredentialStore::with_tokens(
        crewdesk_core::TokenPair::bearer("stale", "stale"),
    ));
    let handle = connect(
        ChatConfig::new("ws://127.0.0.1:9").with_policy(fast_policy()),
        store,
    );

    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(!handle.is_connected());
    handle.send("into the void");
    tokio::time::sleep(Duration::from_millis(50)).await;

    let snapshot = handle.snapshot().await;
    assert!(snapshot.messages().is_empty());
    assert!(!snapshot.is_typing());

    handle.close();
    handle.join().await;
}

#[tokio::test]
async fn teardown_cancels_a_pending_reconnect() {
    let store: SharedCredentialStore = Arc::new(MemoryCredentialStore::with_tokens(
        crewdesk_core::TokenPair::bearer("stale", "stale"),
    ));
    // Long enough that a reconnect timer is guaranteed to be pending when we
    // tear down; the join below would hang if the timer kept the task alive.
    let policy = ReconnectPolicy::new(Duration::from_secs(30), Duration::from_secs(30));
    let handle = connect(ChatConfig::new("ws://127.0.0.1:9").with_policy(policy), store);

    tokio::time::sleep(Duration::from_millis(100)).await;
    handle.close();
    tokio::time::timeout(WAIT, handle.join())
        .await
        .expect("teardown stops the task despite the pending timer");
}

#[tokio::test]
async fn history_hydration_then_live_traffic_appends() {
    let (_state, ws_base, store) = start().await;
    let handle = connect(ChatConfig::new(ws_base).with_policy(fast_policy()), store);
    wait_connected(&handle, true).await;

    let history: Vec<crewdesk_core::AiMessage> = serde_json::from_str(
        r#"[
            {"id":1,"conversation_id":9,"role":"user","content":"earlier question","created_at":"2026-02-01T10:00:00Z"},
            {"id":2,"conversation_id":9,"role":"assistant","content":"earlier answer","created_at":"2026-02-01T10:00:05Z"}
        ]"#,
    )
    .unwrap();
    handle.load_history(history).await;

    handle.send("and now?");
    let settled = wait_for(&handle, |log| log.messages().len() >= 4).await;
    let contents: Vec<&str> = settled
        .messages()
        .iter()
        .map(|m| m.content.as_str())
        .collect();
    assert_eq!(
        contents,
        vec![
            "earlier question",
            "earlier answer",
            "and now?",
            "Noted: and now?"
        ]
    );

    handle.close();
    handle.join().await;
}
