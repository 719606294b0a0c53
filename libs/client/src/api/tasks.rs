use serde::Serialize;

use crewdesk_core::{Task, TaskPriority, TaskStatus};

use crate::error::ApiError;
use crate::http::ApiClient;

#[derive(Clone, Debug, Default)]
pub struct TaskQuery {
    pub assigned_to: Option<i64>,
    pub status: Option<TaskStatus>,
    pub priority: Option<TaskPriority>,
}

#[derive(Clone, Debug, Serialize)]
pub struct TaskCreate {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub assigned_to: i64,
    pub priority: TaskPriority,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,
}

#[derive(Clone, Debug, Default, Serialize)]
pub struct TaskUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assigned_to: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<TaskPriority>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<TaskStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,
}

fn enum_param<T: Serialize>(value: Option<T>) -> Option<String> {
    value.and_then(|value| match serde_json::to_value(&value) {
        Ok(serde_json::Value::String(text)) => Some(text),
        _ => None,
    })
}

pub async fn list(client: &ApiClient, query: &TaskQuery) -> Result<Vec<Task>, ApiError> {
    client
        .get_json(
            "/tasks",
            &[
                ("assigned_to", query.assigned_to.map(|id| id.to_string())),
                ("status", enum_param(query.status)),
                ("priority", enum_param(query.priority)),
            ],
        )
        .await
}

pub async fn create(client: &ApiClient, request: &TaskCreate) -> Result<Task, ApiError> {
    client.post_json("/tasks", request).await
}

pub async fn update(client: &ApiClient, id: i64, patch: &TaskUpdate) -> Result<Task, ApiError> {
    client.put_json(&format!("/tasks/{id}"), patch).await
}

pub async fn delete(client: &ApiClient, id: i64) -> Result<(), ApiError> {
    client.delete(&format!("/tasks/{id}")).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enum_params_render_as_wire_strings() {
        assert_eq!(
            enum_param(Some(TaskStatus::InProgress)).as_deref(),
            Some("in_progress")
        );
        assert_eq!(
            enum_param(Some(TaskPriority::Urgent)).as_deref(),
            Some("urgent")
        );
        assert_eq!(enum_param::<TaskStatus>(None), None);
    }
}
