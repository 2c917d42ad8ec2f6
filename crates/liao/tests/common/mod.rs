//! Test utilities and common setup.

use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode, header},
};
use serde_json::{Value, json};
use tower::ServiceExt;

use liao::api::{AppState, create_router};
use liao::config::AppConfig;
use liao::db::Database;

/// Configuration used by the integration tests: in-memory store, no
/// inter-fragment delay, codes echoed in responses.
pub fn test_config() -> AppConfig {
    let mut config = AppConfig::default();
    config.auth.jwt_secret = "test-secret-for-integration-tests-minimum-32-chars".to_string();
    config.stream.fragment_delay_ms = 0;
    config.auth.expose_code = true;
    config
}

/// Create a test application over a fresh in-memory database.
pub async fn test_app() -> Router {
    test_app_with_config(test_config()).await
}

/// Create a test application with a custom configuration.
pub async fn test_app_with_config(config: AppConfig) -> Router {
    let db = Database::in_memory().await.expect("in-memory database");
    create_router(AppState::new(&config, db))
}

/// Issue a JSON request and return status plus parsed body.
pub async fn request(
    app: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let (status, bytes) = request_raw(app, method, uri, token, body).await;
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("JSON response body")
    };
    (status, json)
}

/// Issue a request and return status plus raw body bytes (for SSE).
pub async fn request_raw(
    app: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Vec<u8>) {
    let mut builder = Request::builder().uri(uri).method(method);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }

    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(serde_json::to_string(&body).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
        .await
        .unwrap()
        .to_vec();
    (status, bytes)
}

/// Request a verification code for a phone and return it.
pub async fn send_code(app: &Router, phone: &str) -> String {
    let (status, body) = request(
        app,
        Method::POST,
        "/api/users/send-code",
        None,
        Some(json!({ "phone": phone })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "send-code failed: {body}");
    body["code"].as_str().expect("exposed code").to_string()
}

/// Run the full phone-login flow and return a bearer token.
pub async fn register_and_login(app: &Router, phone: &str, password: &str) -> String {
    let code = send_code(app, phone).await;
    let (status, body) = request(
        app,
        Method::POST,
        "/api/users/phone-login",
        None,
        Some(json!({ "phone": phone, "code": code, "password": password })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "phone-login failed: {body}");
    body["token"].as_str().expect("token").to_string()
}

/// Create a conversation and return its id.
pub async fn create_conversation(app: &Router, token: &str) -> i64 {
    let (status, body) = request(
        app,
        Method::POST,
        "/api/chat/conversations",
        Some(token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK, "create conversation failed: {body}");
    body["id"].as_i64().expect("conversation id")
}

/// Parse an SSE body into its `data:` payloads.
pub fn parse_sse_data(body: &[u8]) -> Vec<String> {
    let text = String::from_utf8(body.to_vec()).expect("UTF-8 SSE body");
    text.split("\n\n")
        .filter_map(|block| {
            let mut data_lines = Vec::new();
            for line in block.lines() {
                if let Some(rest) = line.strip_prefix("data: ") {
                    data_lines.push(rest);
                } else if let Some(rest) = line.strip_prefix("data:") {
                    data_lines.push(rest);
                }
            }
            if data_lines.is_empty() {
                None
            } else {
                Some(data_lines.join("\n"))
            }
        })
        .collect()
}
