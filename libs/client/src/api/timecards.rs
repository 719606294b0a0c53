use crewdesk_core::TimeCard;

use crate::error::ApiError;
use crate::http::ApiClient;

#[derive(Clone, Debug, Default)]
pub struct TimeCardQuery {
    pub user_id: Option<i64>,
    pub date_from: Option<String>,
    pub date_to: Option<String>,
}

/// Punch-clock endpoints. The backend decides the punch timestamp; the
/// device description is recorded for the owner's audit view.
pub async fn clock_in(client: &ApiClient, device_info: &str) -> Result<TimeCard, ApiError> {
    client
        .post_json(
            "/timecards/clock-in",
            &serde_json::json!({ "device_info": device_info }),
        )
        .await
}

pub async fn clock_out(client: &ApiClient, device_info: &str) -> Result<TimeCard, ApiError> {
    client
        .post_json(
            "/timecards/clock-out",
            &serde_json::json!({ "device_info": device_info }),
        )
        .await
}

/// The open punch for today, if one exists.
pub async fn today(client: &ApiClient) -> Result<Option<TimeCard>, ApiError> {
    client.get_json("/timecards/today", &[]).await
}

pub async fn list(client: &ApiClient, query: &TimeCardQuery) -> Result<Vec<TimeCard>, ApiError> {
    client
        .get_json(
            "/timecards",
            &[
                ("user_id", query.user_id.map(|id| id.to_string())),
                ("date_from", query.date_from.clone()),
                ("date_to", query.date_to.clone()),
            ],
        )
        .await
}
