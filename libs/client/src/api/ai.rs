use crewdesk_core::{AiConversation, AiMessage};

use crate::error::ApiError;
use crate::http::ApiClient;

/// History endpoints for the assistant; live traffic runs over the realtime
/// transport, these only hydrate past conversations.
pub async fn conversations(client: &ApiClient) -> Result<Vec<AiConversation>, ApiError> {
    client.get_json("/ai/conversations", &[]).await
}

pub async fn messages(
    client: &ApiClient,
    conversation_id: i64,
) -> Result<Vec<AiMessage>, ApiError> {
    client
        .get_json(&format!("/ai/conversations/{conversation_id}/messages"), &[])
        .await
}
