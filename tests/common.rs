#![allow(dead_code)]

use std::sync::Arc;

use authsession::api::ApiClient;
use authsession::config::ApiConfig;
use authsession::session::AuthStore;
use authsession::storage::{KeyValueStorage, MemoryStorage, TOKEN_KEY};
use mockito::{Mock, ServerGuard};
use serde_json::{json, Value};

pub fn user_json(id: i64, username: &str, role: &str) -> Value {
    json!({
        "id": id,
        "username": username,
        "name": username,
        "email": format!("{}@example.com", username),
        "role": role,
        "is_active": true,
        "created_at": "2024-05-01T10:00:00"
    })
}

/// A store talking to `server`, backed by in-memory storage.
pub fn build_store(server: &ServerGuard) -> (Arc<AuthStore>, Arc<MemoryStorage>) {
    build_store_with(server, MemoryStorage::new())
}

pub fn build_store_with(
    server: &ServerGuard,
    storage: MemoryStorage,
) -> (Arc<AuthStore>, Arc<MemoryStorage>) {
    let api = ApiClient::new(&ApiConfig {
        base_url: server.url(),
        timeout_in_ms: Some(3000),
    })
    .expect("failed to build api client");
    let storage = Arc::new(storage);
    let store = Arc::new(AuthStore::new(Arc::new(api), storage.clone()));
    (store, storage)
}

pub async fn stored_token(storage: &MemoryStorage) -> Option<String> {
    storage.get(TOKEN_KEY).await.expect("memory storage cannot fail")
}

pub async fn mock_login_ok(server: &mut ServerGuard, token: &str, user: Value) -> Mock {
    server
        .mock("POST", "/auth/login")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "access_token": token,
                "token_type": "bearer",
                "user": user
            })
            .to_string(),
        )
        .create_async()
        .await
}

pub async fn mock_me(server: &mut ServerGuard, token: &str, user: Value) -> Mock {
    server
        .mock("GET", "/auth/me")
        .match_header("authorization", format!("Bearer {}", token).as_str())
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(user.to_string())
        .create_async()
        .await
}
