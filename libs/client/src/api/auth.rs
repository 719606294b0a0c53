use serde::Serialize;

use crewdesk_core::{Role, TokenPair, User};

use crate::error::ApiError;
use crate::http::ApiClient;

#[derive(Clone, Debug, Serialize)]
pub struct SignupRequest {
    pub email: String,
    pub password: String,
    pub full_name: String,
    pub role: Role,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

pub async fn login(client: &ApiClient, email: &str, password: &str) -> Result<TokenPair, ApiError> {
    client
        .post_json(
            "/auth/login",
            &serde_json::json!({ "email": email, "password": password }),
        )
        .await
}

pub async fn me(client: &ApiClient) -> Result<User, ApiError> {
    client.get_json("/auth/me", &[]).await
}

pub async fn signup(client: &ApiClient, request: &SignupRequest) -> Result<User, ApiError> {
    client.post_json("/auth/signup", request).await
}

pub async fn change_password(
    client: &ApiClient,
    current_password: &str,
    new_password: &str,
) -> Result<(), ApiError> {
    client
        .post_unit(
            "/auth/change-password",
            &serde_json::json!({
                "current_password": current_password,
                "new_password": new_password,
            }),
        )
        .await
}
