use serde::Serialize;

use crewdesk_core::{Role, User};

use crate::api::auth::SignupRequest;
use crate::error::ApiError;
use crate::http::ApiClient;

#[derive(Clone, Debug, Default, Serialize)]
pub struct UserUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

pub async fn list(client: &ApiClient, role: Option<Role>) -> Result<Vec<User>, ApiError> {
    client
        .get_json(
            "/users",
            &[("role", role.map(|role| role.as_str().to_string()))],
        )
        .await
}

pub async fn get(client: &ApiClient, id: i64) -> Result<User, ApiError> {
    client.get_json(&format!("/users/{id}"), &[]).await
}

/// Staff accounts are provisioned through the registration endpoint.
pub async fn create(client: &ApiClient, request: &SignupRequest) -> Result<User, ApiError> {
    client.post_json("/auth/register", request).await
}

pub async fn update(client: &ApiClient, id: i64, patch: &UserUpdate) -> Result<User, ApiError> {
    client.put_json(&format!("/users/{id}"), patch).await
}

/// Deactivation, not deletion: the backend flips `is_active`.
pub async fn deactivate(client: &ApiClient, id: i64) -> Result<(), ApiError> {
    client.delete(&format!("/users/{id}")).await
}
