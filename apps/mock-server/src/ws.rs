use std::sync::Arc;
use std::sync::atomic::Ordering;

use axum::extract::ws::{Message, WebSocket};
use axum::extract::{Query, State, WebSocketUpgrade};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Deserialize;
use uuid::Uuid;

use crate::state::{Claims, MockState};

#[derive(Debug, Deserialize)]
pub struct TokenQuery {
    token: String,
}

/// `GET /ws/chat?token=<access_token>`: validates the credential before
/// upgrading, mirroring the real backend.
pub async fn chat_upgrade(
    State(state): State<Arc<MockState>>,
    Query(query): Query<TokenQuery>,
    upgrade: WebSocketUpgrade,
) -> Response {
    let Some(claims) = state.verify_access(&query.token) else {
        return StatusCode::UNAUTHORIZED.into_response();
    };
    upgrade.on_upgrade(move |socket| chat_session(state, socket, claims))
}

/// Canned assistant: announces the conversation, then answers every inbound
/// `{content}` with a typing signal followed by an echo message. The magic
/// content `/close` makes the server drop the connection, which tests use to
/// force the client through its reconnect path.
async fn chat_session(state: Arc<MockState>, mut socket: WebSocket, claims: Claims) {
    state.counters.ws_connections.fetch_add(1, Ordering::SeqCst);
    let conversation_id = state.next_id();
    tracing::info!(user_id = claims.sub, conversation_id, "chat connected");

    let hello = serde_json::json!({
        "type": "conversation_id",
        "conversation_id": conversation_id,
    });
    if send_json(&mut socket, &hello).await.is_err() {
        return;
    }

    while let Some(message) = socket.recv().await {
        let text = match message {
            Ok(Message::Text(text)) => text.to_string(),
            Ok(Message::Close(_)) | Err(_) => break,
            Ok(_) => continue,
        };
        let content = serde_json::from_str::<serde_json::Value>(&text)
            .ok()
            .and_then(|frame| {
                frame
                    .get("content")
                    .and_then(serde_json::Value::as_str)
                    .map(str::to_string)
            })
            .unwrap_or(text);

        if content == "/close" {
            tracing::info!(conversation_id, "dropping chat connection on request");
            break;
        }

        let typing = serde_json::json!({ "type": "typing" });
        if send_json(&mut socket, &typing).await.is_err() {
            break;
        }

        let actions = content
            .contains("task")
            .then(|| serde_json::json!([{ "kind": "create_task" }]));
        let mut reply = serde_json::json!({
            "type": "message",
            "id": Uuid::new_v4().to_string(),
            "content": format!("Noted: {content}"),
        });
        if let Some(actions) = actions {
            reply["actions"] = actions;
        }
        if send_json(&mut socket, &reply).await.is_err() {
            break;
        }
    }
    tracing::info!(conversation_id, "chat disconnected");
}

async fn send_json(socket: &mut WebSocket, value: &serde_json::Value) -> Result<(), axum::Error> {
    socket.send(Message::Text(value.to_string().into())).await
}
