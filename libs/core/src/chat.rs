use serde::{Deserialize, Serialize};
use serde_json::Value;
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
}

/// One entry in the assistant conversation, in local append order.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ChatMessage {
    pub id: String,
    pub role: ChatRole,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actions: Option<Vec<Value>>,
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            role: ChatRole::User,
            content: content.into(),
            actions: None,
            timestamp: OffsetDateTime::now_utc(),
        }
    }

    pub fn assistant(
        id: Option<String>,
        content: impl Into<String>,
        actions: Option<Vec<Value>>,
    ) -> Self {
        Self {
            id: id.unwrap_or_else(|| Uuid::new_v4().to_string()),
            role: ChatRole::Assistant,
            content: content.into(),
            actions,
            timestamp: OffsetDateTime::now_utc(),
        }
    }
}

/// Stored conversation returned by the AI history endpoints.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct AiConversation {
    pub id: i64,
    pub user_id: i64,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

/// Stored chat history row; hydrated into `ChatMessage`s by the client.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct AiMessage {
    pub id: i64,
    pub conversation_id: i64,
    pub role: ChatRole,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actions_taken: Option<Vec<Value>>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl From<AiMessage> for ChatMessage {
    fn from(row: AiMessage) -> Self {
        Self {
            id: row.id.to_string(),
            role: row.role,
            content: row.content,
            actions: row.actions_taken,
            timestamp: row.created_at,
        }
    }
}

/// One decoded frame received over the chat channel.
#[derive(Clone, Debug, PartialEq)]
pub enum InboundFrame {
    Typing,
    Message {
        id: Option<String>,
        content: String,
        actions: Option<Vec<Value>>,
    },
    ConversationId(i64),
    /// Anything that is not a recognised JSON frame: surfaced as plain
    /// assistant text rather than dropped.
    Raw { content: String },
}

impl InboundFrame {
    /// Decodes a text frame. Never fails: malformed JSON and unknown frame
    /// types degrade to `Raw` carrying best-effort content.
    pub fn decode(text: &str) -> Self {
        let value: Value = match serde_json::from_str(text) {
            Ok(value) => value,
            Err(_) => {
                return Self::Raw {
                    content: text.to_string(),
                };
            }
        };
        match value.get("type").and_then(Value::as_str) {
            Some("typing") => Self::Typing,
            Some("message") => Self::Message {
                id: frame_id(&value),
                content: value
                    .get("content")
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string(),
                actions: value.get("actions").and_then(Value::as_array).cloned(),
            },
            Some("conversation_id") => match value.get("conversation_id").and_then(Value::as_i64) {
                Some(id) => Self::ConversationId(id),
                None => Self::Raw {
                    content: fallback_content(&value, text),
                },
            },
            _ => Self::Raw {
                content: fallback_content(&value, text),
            },
        }
    }
}

fn frame_id(value: &Value) -> Option<String> {
    match value.get("id") {
        Some(Value::String(id)) => Some(id.clone()),
        Some(Value::Number(id)) => Some(id.to_string()),
        _ => None,
    }
}

fn fallback_content(value: &Value, raw: &str) -> String {
    match value {
        Value::String(text) => text.clone(),
        _ => value
            .get("content")
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| raw.to_string()),
    }
}

/// Frame sent to the chat backend.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct OutboundFrame {
    pub content: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_typing_frame() {
        assert_eq!(InboundFrame::decode(r#"{"type":"typing"}"#), InboundFrame::Typing);
    }

    #[test]
    fn decodes_message_frame_with_actions() {
        let frame = InboundFrame::decode(
            r#"{"type":"message","id":41,"content":"done","actions":[{"kind":"create_task"}]}"#,
        );
        match frame {
            InboundFrame::Message { id, content, actions } => {
                assert_eq!(id.as_deref(), Some("41"));
                assert_eq!(content, "done");
                assert_eq!(actions.unwrap().len(), 1);
            }
            other => panic!("unexpected frame: {other:?}"),
        }
    }

    #[test]
    fn decodes_conversation_id_frame() {
        let frame = InboundFrame::decode(r#"{"type":"conversation_id","conversation_id":99}"#);
        assert_eq!(frame, InboundFrame::ConversationId(99));
    }

    #[test]
    fn unknown_type_falls_back_to_content_field() {
        let frame = InboundFrame::decode(r#"{"type":"mystery","content":"hi there"}"#);
        assert_eq!(
            frame,
            InboundFrame::Raw {
                content: "hi there".into()
            }
        );
    }

    #[test]
    fn plain_text_is_preserved_verbatim() {
        let frame = InboundFrame::decode("not json at all");
        assert_eq!(
            frame,
            InboundFrame::Raw {
                content: "not json at all".into()
            }
        );
    }

    #[test]
    fn json_string_frame_unwraps_to_its_text() {
        let frame = InboundFrame::decode(r#""quoted hello""#);
        assert_eq!(
            frame,
            InboundFrame::Raw {
                content: "quoted hello".into()
            }
        );
    }

    #[test]
    fn unknown_object_without_content_keeps_raw_text() {
        let raw = r#"{"what":"ever"}"#;
        assert_eq!(
            InboundFrame::decode(raw),
            InboundFrame::Raw { content: raw.into() }
        );
    }

    #[test]
    fn history_row_hydrates_into_chat_message() {
        let row: AiMessage = serde_json::from_str(
            r#"{
                "id": 12,
                "conversation_id": 3,
                "role": "assistant",
                "content": "scheduled",
                "actions_taken": [{"kind":"create_schedule"}],
                "created_at": "2026-02-01T10:00:00Z"
            }"#,
        )
        .unwrap();
        let message = ChatMessage::from(row);
        assert_eq!(message.id, "12");
        assert_eq!(message.role, ChatRole::Assistant);
        assert_eq!(message.actions.unwrap().len(), 1);
    }
}
