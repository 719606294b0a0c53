use serde::Serialize;

use crewdesk_core::{CategoryKind, FinanceCategory};

use crate::error::ApiError;
use crate::http::ApiClient;

#[derive(Clone, Debug, Serialize)]
pub struct CategoryCreate {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: CategoryKind,
}

pub async fn list(
    client: &ApiClient,
    kind: Option<CategoryKind>,
) -> Result<Vec<FinanceCategory>, ApiError> {
    client
        .get_json(
            "/categories",
            &[("type", kind.map(|kind| kind.as_str().to_string()))],
        )
        .await
}

pub async fn create(
    client: &ApiClient,
    request: &CategoryCreate,
) -> Result<FinanceCategory, ApiError> {
    client.post_json("/categories", request).await
}

pub async fn rename(client: &ApiClient, id: i64, name: &str) -> Result<FinanceCategory, ApiError> {
    client
        .put_json(
            &format!("/categories/{id}"),
            &serde_json::json!({ "name": name }),
        )
        .await
}

pub async fn delete(client: &ApiClient, id: i64) -> Result<(), ApiError> {
    client.delete(&format!("/categories/{id}")).await
}
