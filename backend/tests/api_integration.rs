//! Backend API Integration Tests
//!
//! Tests for the Axum HTTP endpoints using Router::oneshot pattern.

use std::sync::Arc;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use backend::api::{self, AppState};
use backend::store::MemoryGameStore;
use serde_json::{json, Value};
use sqlx::sqlite::SqlitePoolOptions;
use tower::ServiceExt;

/// Helper to create a test database pool
async fn test_db() -> sqlx::Pool<sqlx::Sqlite> {
    SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("Failed to create test database")
}

/// Helper to create test router
async fn test_router() -> Router {
    let state = AppState::new(test_db().await, Arc::new(MemoryGameStore::new()), "test", 1)
        .await
        .expect("State should build");
    api::router(state)
}

/// Send one request and decode the JSON body (`Null` when empty)
async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", token);
    }
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

async fn register(app: &Router, username: &str) -> String {
    let (status, body) = send(
        app,
        "POST",
        "/user",
        None,
        Some(json!({"username": username, "password": "pw", "email": "x@example.com"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    body["auth_token"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_register_returns_token() {
    let app = test_router().await;

    let (status, body) = send(
        &app,
        "POST",
        "/user",
        None,
        Some(json!({"username": "alice", "password": "pw"})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["username"], "alice");
    assert!(body["auth_token"].as_str().is_some_and(|t| !t.is_empty()));
}

#[tokio::test]
async fn test_register_duplicate_and_empty() {
    let app = test_router().await;
    register(&app, "alice").await;

    let (status, body) = send(
        &app,
        "POST",
        "/user",
        None,
        Some(json!({"username": "alice", "password": "pw2"})),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert!(body["message"].as_str().unwrap().starts_with("Error"));

    let (status, _) = send(
        &app,
        "POST",
        "/user",
        None,
        Some(json!({"username": "", "password": "pw"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_login_and_logout() {
    let app = test_router().await;
    register(&app, "alice").await;

    let (status, _) = send(
        &app,
        "POST",
        "/session",
        None,
        Some(json!({"username": "alice", "password": "nope"})),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = send(
        &app,
        "POST",
        "/session",
        None,
        Some(json!({"username": "alice", "password": "pw"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let token = body["auth_token"].as_str().unwrap().to_string();

    let (status, _) = send(&app, "GET", "/game", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(&app, "DELETE", "/session", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(&app, "GET", "/game", Some(&token), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED, "Logged-out token is dead");

    let (status, _) = send(&app, "DELETE", "/session", Some(&token), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_game_routes_require_auth() {
    let app = test_router().await;

    let (status, _) = send(&app, "GET", "/game", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(
        &app,
        "POST",
        "/game",
        Some("not-a-token"),
        Some(json!({"game_name": "x"})),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_create_and_list_games() {
    let app = test_router().await;
    let token = register(&app, "alice").await;

    let (status, body) = send(
        &app,
        "POST",
        "/game",
        Some(&token),
        Some(json!({"game_name": "friday"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["game_id"], 1);

    let (status, _) = send(
        &app,
        "POST",
        "/game",
        Some(&token),
        Some(json!({"game_name": "   "})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(&app, "GET", "/game", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    let games = body["games"].as_array().unwrap();
    assert_eq!(games.len(), 1);
    assert_eq!(games[0]["game_name"], "friday");
    assert!(games[0]["white_username"].is_null());
    assert!(games[0].get("board").is_none(), "Listing never exposes the board");
}

#[tokio::test]
async fn test_claim_seat() {
    let app = test_router().await;
    let alice = register(&app, "alice").await;
    let bob = register(&app, "bob").await;

    send(
        &app,
        "POST",
        "/game",
        Some(&alice),
        Some(json!({"game_name": "g"})),
    )
    .await;

    let (status, _) = send(
        &app,
        "PUT",
        "/game",
        Some(&alice),
        Some(json!({"player_color": "WHITE", "game_id": 1})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(
        &app,
        "PUT",
        "/game",
        Some(&bob),
        Some(json!({"player_color": "WHITE", "game_id": 1})),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send(
        &app,
        "PUT",
        "/game",
        Some(&bob),
        Some(json!({"game_id": 1})),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "Observing needs no seat");

    let (status, _) = send(
        &app,
        "PUT",
        "/game",
        Some(&bob),
        Some(json!({"player_color": "BLACK", "game_id": 9})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, body) = send(&app, "GET", "/game", Some(&bob), None).await;
    assert_eq!(body["games"][0]["white_username"], "alice");
}

#[tokio::test]
async fn test_clear_db() {
    let app = test_router().await;
    let token = register(&app, "alice").await;
    send(
        &app,
        "POST",
        "/game",
        Some(&token),
        Some(json!({"game_name": "g"})),
    )
    .await;

    let (status, _) = send(&app, "DELETE", "/db", None, None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(&app, "GET", "/game", Some(&token), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED, "Accounts are gone too");

    let token = register(&app, "alice").await;
    let (_, body) = send(&app, "GET", "/game", Some(&token), None).await;
    assert!(body["games"].as_array().unwrap().is_empty());
}
