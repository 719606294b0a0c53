use std::sync::Arc;
use std::sync::atomic::Ordering;

use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::IntoResponse;
use axum::routing::{get, post, put};
use axum::{Json, Router};
use serde::Deserialize;
use time::OffsetDateTime;

use crewdesk_core::{
    Notification, NotificationKind, Task, TaskPriority, TaskStatus, TokenPair, User,
};

use crate::state::{Claims, MockState};
use crate::ws;

pub fn router(state: Arc<MockState>) -> Router {
    Router::new()
        .route("/auth/login", post(login))
        .route("/auth/refresh", post(refresh))
        .route("/auth/me", get(me))
        .route("/tasks", get(list_tasks).post(create_task))
        .route("/tasks/{id}", put(update_task).delete(delete_task))
        .route("/notifications", get(list_notifications))
        .route("/notifications/{id}/read", put(mark_read))
        .route("/notifications/read-all", put(mark_all_read))
        .route("/ws/chat", get(ws::chat_upgrade))
        .with_state(state)
}

fn authorize(state: &MockState, headers: &HeaderMap) -> Result<Claims, StatusCode> {
    let token = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .ok_or(StatusCode::UNAUTHORIZED)?;
    state.verify_access(token).ok_or(StatusCode::UNAUTHORIZED)
}

#[derive(Debug, Deserialize)]
struct LoginRequest {
    email: String,
    password: String,
}

async fn login(
    State(state): State<Arc<MockState>>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<TokenPair>, StatusCode> {
    state.counters.login_calls.fetch_add(1, Ordering::SeqCst);
    let user = state
        .user_by_credentials(&request.email, &request.password)
        .ok_or(StatusCode::UNAUTHORIZED)?;
    tracing::info!(email = %user.email, "mock login");
    Ok(Json(state.issue_pair(&user).await))
}

#[derive(Debug, Deserialize)]
struct RefreshRequest {
    refresh_token: String,
}

async fn refresh(
    State(state): State<Arc<MockState>>,
    Json(request): Json<RefreshRequest>,
) -> Result<Json<TokenPair>, StatusCode> {
    state.counters.refresh_calls.fetch_add(1, Ordering::SeqCst);
    let user_id = state
        .take_refresh(&request.refresh_token)
        .await
        .ok_or(StatusCode::UNAUTHORIZED)?;
    let user = state.user_by_id(user_id).ok_or(StatusCode::UNAUTHORIZED)?;
    tracing::info!(user_id, "mock token refresh");
    Ok(Json(state.issue_pair(&user).await))
}

async fn me(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
) -> Result<Json<User>, StatusCode> {
    state.counters.me_calls.fetch_add(1, Ordering::SeqCst);
    let claims = authorize(&state, &headers)?;
    let user = state
        .user_by_id(claims.sub)
        .ok_or(StatusCode::UNAUTHORIZED)?;
    Ok(Json(user))
}

#[derive(Debug, Deserialize)]
struct TaskFilter {
    assigned_to: Option<i64>,
    status: Option<TaskStatus>,
}

async fn list_tasks(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
    Query(filter): Query<TaskFilter>,
) -> Result<Json<Vec<Task>>, StatusCode> {
    authorize(&state, &headers)?;
    let tasks = state.tasks.read().await;
    let matching = tasks
        .iter()
        .filter(|task| filter.assigned_to.is_none_or(|id| task.assigned_to == id))
        .filter(|task| filter.status.is_none_or(|status| task.status == status))
        .cloned()
        .collect();
    Ok(Json(matching))
}

#[derive(Debug, Deserialize)]
struct TaskCreateBody {
    title: String,
    description: Option<String>,
    assigned_to: i64,
    priority: TaskPriority,
    due_date: Option<String>,
}

async fn create_task(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
    Json(body): Json<TaskCreateBody>,
) -> Result<(StatusCode, Json<Task>), StatusCode> {
    let claims = authorize(&state, &headers)?;
    let task = Task {
        id: state.next_id(),
        assigned_to: body.assigned_to,
        assignee: state.user_by_id(body.assigned_to),
        created_by: Some(claims.sub),
        created_by_ai: false,
        title: body.title,
        description: body.description,
        priority: body.priority,
        status: TaskStatus::Pending,
        due_date: body.due_date,
        created_at: OffsetDateTime::now_utc(),
    };
    state.tasks.write().await.push(task.clone());
    Ok((StatusCode::CREATED, Json(task)))
}

#[derive(Debug, Deserialize)]
struct TaskUpdateBody {
    title: Option<String>,
    description: Option<String>,
    assigned_to: Option<i64>,
    priority: Option<TaskPriority>,
    status: Option<TaskStatus>,
    due_date: Option<String>,
}

async fn update_task(
    State(state): State<Arc<MockState>>,
    Path(id): Path<i64>,
    headers: HeaderMap,
    Json(body): Json<TaskUpdateBody>,
) -> Result<Json<Task>, StatusCode> {
    authorize(&state, &headers)?;
    let mut tasks = state.tasks.write().await;
    let task = tasks
        .iter_mut()
        .find(|task| task.id == id)
        .ok_or(StatusCode::NOT_FOUND)?;
    if let Some(title) = body.title {
        task.title = title;
    }
    if let Some(description) = body.description {
        task.description = Some(description);
    }
    if let Some(assigned_to) = body.assigned_to {
        task.assigned_to = assigned_to;
        task.assignee = state.user_by_id(assigned_to);
    }
    if let Some(priority) = body.priority {
        task.priority = priority;
    }
    if let Some(status) = body.status {
        task.status = status;
    }
    if let Some(due_date) = body.due_date {
        task.due_date = Some(due_date);
    }
    Ok(Json(task.clone()))
}

async fn delete_task(
    State(state): State<Arc<MockState>>,
    Path(id): Path<i64>,
    headers: HeaderMap,
) -> Result<StatusCode, StatusCode> {
    authorize(&state, &headers)?;
    let mut tasks = state.tasks.write().await;
    let before = tasks.len();
    tasks.retain(|task| task.id != id);
    if tasks.len() == before {
        return Err(StatusCode::NOT_FOUND);
    }
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Deserialize)]
struct NotificationFilter {
    #[serde(rename = "type")]
    kind: Option<NotificationKind>,
}

async fn list_notifications(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
    Query(filter): Query<NotificationFilter>,
) -> Result<Json<Vec<Notification>>, StatusCode> {
    let claims = authorize(&state, &headers)?;
    let notifications = state.notifications.read().await;
    let matching = notifications
        .iter()
        .filter(|notification| notification.user_id == claims.sub)
        .filter(|notification| filter.kind.is_none_or(|kind| notification.kind == kind))
        .cloned()
        .collect();
    Ok(Json(matching))
}

async fn mark_read(
    State(state): State<Arc<MockState>>,
    Path(id): Path<i64>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, StatusCode> {
    authorize(&state, &headers)?;
    let mut notifications = state.notifications.write().await;
    let notification = notifications
        .iter_mut()
        .find(|notification| notification.id == id)
        .ok_or(StatusCode::NOT_FOUND)?;
    notification.is_read = true;
    Ok(StatusCode::OK)
}

async fn mark_all_read(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, StatusCode> {
    let claims = authorize(&state, &headers)?;
    let mut notifications = state.notifications.write().await;
    for notification in notifications
        .iter_mut()
        .filter(|notification| notification.user_id == claims.sub)
    {
        notification.is_read = true;
    }
    Ok(StatusCode::OK)
}
