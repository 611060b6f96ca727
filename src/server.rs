//! HTTP transport for the MCP endpoint.
//!
//! Every reply is HTTP 200: JSON-RPC failures travel inside the envelope.
//! CORS headers are attached to every response, error paths included.

use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::extract::State;
use axum::http::header::{
    ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS, ACCESS_CONTROL_ALLOW_ORIGIN,
};
use axum::http::{HeaderMap, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use jsonschema::Validator;
use serde_json::Value;
use tokio::net::TcpListener;
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;
use tracing::{debug, info};

use crate::auth::{presented_key, KeyVerification, KeyVerifier, StoreKeyVerifier};
use crate::config::ServerConfig;
use crate::dispatcher::Dispatcher;
use crate::protocol::{JsonRpcError, JsonRpcRequest, JsonRpcResponse, RpcId};
use crate::schema::{self, SchemaValidationError};
use crate::store::{LazyStore, PromptStore, SqliteStore, StoreProvider};

/// Shared per-process state handed to every request.
pub struct AppState {
    dispatcher: Dispatcher,
    verifier: Arc<dyn KeyVerifier>,
    envelope: Validator,
    max_body_bytes: usize,
}

impl AppState {
    pub fn new(
        dispatcher: Dispatcher,
        verifier: Arc<dyn KeyVerifier>,
        max_body_bytes: usize,
    ) -> Result<Self, SchemaValidationError> {
        Ok(Self {
            dispatcher,
            verifier,
            envelope: schema::compile(&schema::request_envelope())?,
            max_body_bytes,
        })
    }

    /// Resolve identity, parse, validate and dispatch one request body.
    pub async fn handle(&self, headers: &HeaderMap, body: &[u8]) -> JsonRpcResponse {
        let caller = match presented_key(headers) {
            None => None,
            Some(key) => match self.verifier.verify(&key).await {
                KeyVerification::Valid { user_id } => Some(user_id),
                KeyVerification::Invalid => {
                    debug!("rejected request with invalid API key");
                    return JsonRpcResponse::error(None, JsonRpcError::invalid_api_key());
                }
            },
        };

        let raw: Value = match serde_json::from_slice(body) {
            Ok(v) => v,
            Err(e) => {
                debug!("Parse error: {e}");
                return JsonRpcResponse::error(None, JsonRpcError::parse_error());
            }
        };

        let request = match self.validate_envelope(&raw) {
            Ok(req) => req,
            Err(violations) => {
                let id = raw.get("id").and_then(RpcId::from_value);
                return JsonRpcResponse::error(id, JsonRpcError::invalid_request(&violations));
            }
        };

        self.dispatcher.dispatch(&request, caller.as_deref()).await
    }

    fn validate_envelope(&self, raw: &Value) -> Result<JsonRpcRequest, Vec<String>> {
        let violations = schema::violations(&self.envelope, raw);
        if !violations.is_empty() {
            return Err(violations);
        }
        serde_json::from_value(raw.clone()).map_err(|e| vec![e.to_string()])
    }
}

async fn handle_post(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Body,
) -> Response {
    let response = match to_bytes(body, state.max_body_bytes).await {
        Ok(bytes) => state.handle(&headers, &bytes).await,
        Err(e) => {
            debug!("failed to read request body: {e}");
            JsonRpcResponse::error(None, JsonRpcError::parse_error())
        }
    };
    (StatusCode::OK, Json(response)).into_response()
}

async fn handle_options() -> StatusCode {
    StatusCode::OK
}

/// Router serving the endpoint at `path`.
pub fn router(state: Arc<AppState>, path: &str) -> Router {
    Router::new()
        .route(path, post(handle_post).options(handle_options))
        .layer(SetResponseHeaderLayer::overriding(
            ACCESS_CONTROL_ALLOW_ORIGIN,
            HeaderValue::from_static("*"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            ACCESS_CONTROL_ALLOW_METHODS,
            HeaderValue::from_static("POST, OPTIONS"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            ACCESS_CONTROL_ALLOW_HEADERS,
            HeaderValue::from_static("Content-Type, Authorization, x-api-key"),
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// MCP server bound to the configured address.
pub struct McpServer {
    config: ServerConfig,
}

impl McpServer {
    pub fn new(config: ServerConfig) -> Self {
        Self { config }
    }

    /// Wire the SQLite store, verifier and dispatcher together.
    pub fn build_state(&self) -> Result<Arc<AppState>, SchemaValidationError> {
        let database = self.config.database.clone();
        let stores: Arc<dyn StoreProvider> = Arc::new(LazyStore::new(move || {
            SqliteStore::open(&database).map(|s| Arc::new(s) as Arc<dyn PromptStore>)
        }));

        let verifier = Arc::new(StoreKeyVerifier::new(Arc::clone(&stores)));
        let state = AppState::new(Dispatcher::new(stores), verifier, self.config.max_body_bytes)?;
        Ok(Arc::new(state))
    }

    pub async fn run(&self) -> Result<(), Box<dyn std::error::Error>> {
        let state = self.build_state()?;
        let app = router(state, &self.config.mcp_path);

        let listener = TcpListener::bind(self.config.bind_addr).await?;
        info!(
            "MCP endpoint listening on http://{}{}",
            listener.local_addr()?,
            self.config.mcp_path
        );

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;
        Ok(())
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
    info!("shutting down");
}
