use crewdesk_core::{Notification, NotificationKind};

use crate::error::ApiError;
use crate::http::ApiClient;

pub async fn list(
    client: &ApiClient,
    kind: Option<NotificationKind>,
) -> Result<Vec<Notification>, ApiError> {
    client
        .get_json(
            "/notifications",
            &[("type", kind.map(|kind| kind.as_str().to_string()))],
        )
        .await
}

pub async fn mark_read(client: &ApiClient, id: i64) -> Result<(), ApiError> {
    client.put_unit(&format!("/notifications/{id}/read")).await
}

pub async fn mark_all_read(client: &ApiClient) -> Result<(), ApiError> {
    client.put_unit("/notifications/read-all").await
}
