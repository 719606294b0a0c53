use serde::Serialize;

use crewdesk_core::Note;

use crate::error::ApiError;
use crate::http::ApiClient;

#[derive(Clone, Debug, Serialize)]
pub struct NoteCreate {
    pub title: String,
    pub content: String,
    pub color: String,
}

#[derive(Clone, Debug, Default, Serialize)]
pub struct NoteUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

pub async fn list(client: &ApiClient, search: Option<&str>) -> Result<Vec<Note>, ApiError> {
    client
        .get_json("/notes", &[("search", search.map(str::to_string))])
        .await
}

pub async fn create(client: &ApiClient, request: &NoteCreate) -> Result<Note, ApiError> {
    client.post_json("/notes", request).await
}

pub async fn update(client: &ApiClient, id: i64, patch: &NoteUpdate) -> Result<Note, ApiError> {
    client.put_json(&format!("/notes/{id}"), patch).await
}

pub async fn delete(client: &ApiClient, id: i64) -> Result<(), ApiError> {
    client.delete(&format!("/notes/{id}")).await
}
