use serde::Serialize;

use crewdesk_core::Schedule;

use crate::error::ApiError;
use crate::http::ApiClient;

#[derive(Clone, Debug, Default)]
pub struct ScheduleQuery {
    pub user_id: Option<i64>,
    pub date_from: Option<String>,
    pub date_to: Option<String>,
}

#[derive(Clone, Debug, Serialize)]
pub struct ScheduleCreate {
    pub user_id: i64,
    pub date: String,
    pub shift_start: String,
    pub shift_end: String,
    pub location: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

#[derive(Clone, Debug, Default, Serialize)]
pub struct ScheduleUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shift_start: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shift_end: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<crewdesk_core::ScheduleStatus>,
}

/// Shift-swap request raised by staff against an existing schedule entry.
#[derive(Clone, Debug, Serialize)]
pub struct ChangeRequest {
    pub original_schedule_id: i64,
    pub requested_date: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

pub async fn list(client: &ApiClient, query: &ScheduleQuery) -> Result<Vec<Schedule>, ApiError> {
    client
        .get_json(
            "/schedules",
            &[
                ("user_id", query.user_id.map(|id| id.to_string())),
                ("date_from", query.date_from.clone()),
                ("date_to", query.date_to.clone()),
            ],
        )
        .await
}

pub async fn create(client: &ApiClient, request: &ScheduleCreate) -> Result<Schedule, ApiError> {
    client.post_json("/schedules", request).await
}

pub async fn update(
    client: &ApiClient,
    id: i64,
    patch: &ScheduleUpdate,
) -> Result<Schedule, ApiError> {
    client.put_json(&format!("/schedules/{id}"), patch).await
}

pub async fn delete(client: &ApiClient, id: i64) -> Result<(), ApiError> {
    client.delete(&format!("/schedules/{id}")).await
}

pub async fn create_change_request(
    client: &ApiClient,
    request: &ChangeRequest,
) -> Result<(), ApiError> {
    client
        .post_unit("/schedules/change-requests", request)
        .await
}
