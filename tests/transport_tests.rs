//! End-to-end tests of the HTTP endpoint through the axum router.

mod common;

use std::sync::atomic::Ordering;
use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{Request, Response, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use common::*;
use prompt_repo_mcp::auth::StoreKeyVerifier;
use prompt_repo_mcp::dispatcher::Dispatcher;
use prompt_repo_mcp::protocol::codes;
use prompt_repo_mcp::server::{router, AppState};
use prompt_repo_mcp::store::StoreProvider;

const PATH: &str = "/api/mcp";

fn app_with_limit(provider: Arc<dyn StoreProvider>, max_body_bytes: usize) -> Router {
    let verifier = Arc::new(StoreKeyVerifier::new(Arc::clone(&provider)));
    let state = AppState::new(Dispatcher::new(provider), verifier, max_body_bytes).unwrap();
    router(Arc::new(state), PATH)
}

fn app() -> Router {
    let (provider, _) = counting_provider(seeded_store());
    app_with_limit(provider, 1024 * 1024)
}

fn post(body: impl Into<Body>, headers: &[(&str, &str)]) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(PATH)
        .header("content-type", "application/json");
    for (name, value) in headers {
        builder = builder.header(*name, *value);
    }
    builder.body(body.into()).unwrap()
}

fn rpc(id: Value, method: &str, params: Value) -> String {
    json!({ "jsonrpc": "2.0", "id": id, "method": method, "params": params }).to_string()
}

async fn body_json(response: Response<Body>) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn assert_cors(response: &Response<Body>) {
    let headers = response.headers();
    assert_eq!(headers["access-control-allow-origin"], "*");
    assert_eq!(headers["access-control-allow-methods"], "POST, OPTIONS");
    assert_eq!(
        headers["access-control-allow-headers"],
        "Content-Type, Authorization, x-api-key"
    );
}

#[tokio::test]
async fn options_preflight_returns_cors_headers() {
    let request = Request::builder()
        .method("OPTIONS")
        .uri(PATH)
        .body(Body::empty())
        .unwrap();

    let response = app().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_cors(&response);
}

#[tokio::test]
async fn malformed_json_is_parse_error() {
    let response = app().oneshot(post("{not json", &[])).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_cors(&response);

    let body = body_json(response).await;
    assert_eq!(body["jsonrpc"], "2.0");
    assert!(body["id"].is_null());
    assert_eq!(body["error"]["code"], codes::PARSE_ERROR);
    assert_eq!(
        body["error"]["message"],
        "Parse error: request body is not valid JSON."
    );
}

#[tokio::test]
async fn oversized_body_is_parse_error() {
    let (provider, _) = counting_provider(seeded_store());
    let app = app_with_limit(provider, 16);

    let response = app
        .oneshot(post(rpc(json!(1), "prompts/list", json!({})), &[]))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["error"]["code"], codes::PARSE_ERROR);
}

#[tokio::test]
async fn invalid_envelope_recovers_legal_id() {
    let body = json!({ "jsonrpc": "1.0", "id": 7, "method": "initialize" }).to_string();
    let response = app().oneshot(post(body, &[])).await.unwrap();
    let body = body_json(response).await;

    assert_eq!(body["id"], 7);
    assert_eq!(body["error"]["code"], codes::INVALID_REQUEST);
    let message = body["error"]["message"].as_str().unwrap();
    assert!(message.starts_with("Invalid Request: "), "{message}");
}

#[tokio::test]
async fn invalid_envelope_drops_illegal_id() {
    let body = json!({ "jsonrpc": "2.0", "id": { "nested": true } }).to_string();
    let response = app().oneshot(post(body, &[])).await.unwrap();
    let body = body_json(response).await;

    assert!(body["id"].is_null());
    assert_eq!(body["error"]["code"], codes::INVALID_REQUEST);
    assert!(body["error"]["message"].as_str().unwrap().contains("method"));
}

#[tokio::test]
async fn non_object_body_is_invalid_request() {
    let response = app().oneshot(post("[1, 2, 3]", &[])).await.unwrap();
    let body = body_json(response).await;
    assert!(body["id"].is_null());
    assert_eq!(body["error"]["code"], codes::INVALID_REQUEST);
}

#[tokio::test]
async fn anonymous_caller_lists_public_prompts() {
    let response = app()
        .oneshot(post(rpc(json!("req-1"), "prompts/list", json!({})), &[]))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_cors(&response);

    let body = body_json(response).await;
    assert_eq!(body["id"], "req-1");
    let ids: Vec<&str> = body["result"]["prompts"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["id"].as_str().unwrap())
        .collect();
    assert_eq!(ids, vec![PUBLIC_REVIEW, NO_VERSIONS]);
}

#[tokio::test]
async fn bearer_key_identifies_caller() {
    let bearer = format!("Bearer {BOB_KEY}");
    let response = app()
        .oneshot(post(
            rpc(json!(1), "prompts/get", json!({ "prompt_id": BOB_PRIVATE })),
            &[("authorization", bearer.as_str())],
        ))
        .await
        .unwrap();

    let body = body_json(response).await;
    assert_eq!(body["result"]["title"], "Security review");
}

#[tokio::test]
async fn x_api_key_identifies_caller() {
    let response = app()
        .oneshot(post(
            rpc(json!(1), "prompts/get", json!({ "prompt_id": ALICE_PRIVATE })),
            &[("x-api-key", ALICE_KEY)],
        ))
        .await
        .unwrap();

    let body = body_json(response).await;
    assert_eq!(body["result"]["title"], "Standup notes");
}

#[tokio::test]
async fn unknown_key_is_rejected_before_parsing() {
    let response = app()
        .oneshot(post("{not json", &[("authorization", "Bearer wrong-key")]))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_cors(&response);

    let body = body_json(response).await;
    assert!(body["id"].is_null());
    assert_eq!(body["error"]["code"], codes::INVALID_API_KEY);
    assert_eq!(body["error"]["message"], "Invalid API key.");
}

#[tokio::test]
async fn store_outage_during_verification_rejects_key() {
    let (provider, calls) = flaky_provider(usize::MAX);
    let app = app_with_limit(provider, 1024);

    let response = app
        .oneshot(post(
            rpc(json!(1), "initialize", json!({})),
            &[("x-api-key", ALICE_KEY)],
        ))
        .await
        .unwrap();
    assert_eq!(body_json(response).await["error"]["code"], codes::INVALID_API_KEY);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn anonymous_metadata_call_never_opens_store() {
    let (provider, calls) = counting_provider(seeded_store());
    let app = app_with_limit(provider, 1024);

    let response = app
        .oneshot(post(rpc(json!(1), "initialize", Value::Null), &[]))
        .await
        .unwrap();
    assert_eq!(body_json(response).await["result"]["serverInfo"]["name"], "prompt-repo");
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn tools_call_over_http() {
    let call = json!({
        "name": "resolve_prompt",
        "arguments": { "prompt_id": PUBLIC_REVIEW, "variables": { "language": "Go", "focus": "errors" } }
    });
    let response = app()
        .oneshot(post(rpc(json!(3), "tools/call", call), &[]))
        .await
        .unwrap();

    let body = body_json(response).await;
    let text = body["result"]["content"][0]["text"].as_str().unwrap();
    let inner: Value = serde_json::from_str(text).unwrap();
    assert_eq!(
        inner["resolved_content"],
        "Review Go code focusing on errors. Use Go idioms."
    );
    assert_eq!(inner["unresolved_variables"], json!([]));
}
