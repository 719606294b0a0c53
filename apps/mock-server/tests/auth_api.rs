use std::sync::Arc;

use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode};
use tower::ServiceExt;

use crewdesk_core::TokenPair;
use crewdesk_mock_server::{MockState, router};

async fn json_body<T: serde::de::DeserializeOwned>(response: axum::response::Response) -> T {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn login_then_me_round_trip() {
    let state = MockState::new();
    let app = router(Arc::clone(&state));

    let request = Request::builder()
        .method("POST")
        .uri("/auth/login")
        .header("content-type", "application/json")
        .body(Body::from(
            r#"{"email":"owner@example.com","password":"hunter2"}"#,
        ))
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert!(response.status().is_success());
    let pair: TokenPair = json_body(response).await;
    assert_eq!(pair.token_type, "bearer");

    let request = Request::builder()
        .uri("/auth/me")
        .header("authorization", format!("Bearer {}", pair.access_token))
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert!(response.status().is_success());
    let user: crewdesk_core::User = json_body(response).await;
    assert_eq!(user.email, "owner@example.com");
}

#[tokio::test]
async fn wrong_password_is_unauthorized() {
    let state = MockState::new();
    let app = router(state);

    let request = Request::builder()
        .method("POST")
        .uri("/auth/login")
        .header("content-type", "application/json")
        .body(Body::from(
            r#"{"email":"owner@example.com","password":"wrong"}"#,
        ))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn refresh_tokens_are_single_use() {
    let state = MockState::new();
    let app = router(Arc::clone(&state));
    let owner = state.user_by_email("owner@example.com").unwrap();
    let pair = state.issue_pair(&owner).await;

    let refresh = |token: String| {
        Request::builder()
            .method("POST")
            .uri("/auth/refresh")
            .header("content-type", "application/json")
            .body(Body::from(format!(r#"{{"refresh_token":"{token}"}}"#)))
            .unwrap()
    };

    let response = app
        .clone()
        .oneshot(refresh(pair.refresh_token.clone()))
        .await
        .unwrap();
    assert!(response.status().is_success());
    let rotated: TokenPair = json_body(response).await;
    assert_ne!(rotated.refresh_token, pair.refresh_token);

    let response = app.oneshot(refresh(pair.refresh_token)).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn me_rejects_garbage_tokens() {
    let state = MockState::new();
    let app = router(state);

    let request = Request::builder()
        .uri("/auth/me")
        .header("authorization", "Bearer not-a-jwt")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}
