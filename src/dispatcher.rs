//! JSON-RPC method dispatch.
//!
//! Methods are registered once in a static table. Each entry names the kind
//! of handler behind it, so metadata methods never touch the store and the
//! store is only acquired for calls that read prompts.

use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, error};

use crate::handlers;
use crate::protocol::{
    JsonRpcError, JsonRpcRequest, JsonRpcResponse, McpError, ToolCallParams, ToolResult,
};
use crate::store::{PromptStore, StoreProvider};

/// A store-backed data tool, callable directly or through `tools/call`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tool {
    ListPrompts,
    GetPrompt,
    ResolvePrompt,
    SearchPrompts,
}

impl Tool {
    pub const ALL: [Tool; 4] = [
        Tool::ListPrompts,
        Tool::GetPrompt,
        Tool::ResolvePrompt,
        Tool::SearchPrompts,
    ];

    /// Name advertised in `tools/list`.
    pub fn name(self) -> &'static str {
        match self {
            Tool::ListPrompts => "list_prompts",
            Tool::GetPrompt => "get_prompt",
            Tool::ResolvePrompt => "resolve_prompt",
            Tool::SearchPrompts => "search_prompts",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.name() == name)
    }

    pub async fn call(
        self,
        params: Option<&Value>,
        caller: Option<&str>,
        store: &dyn PromptStore,
    ) -> Result<Value, McpError> {
        match self {
            Tool::ListPrompts => to_value(handlers::list_prompts::handle(params, caller, store).await?),
            Tool::GetPrompt => to_value(handlers::get_prompt::handle(params, caller, store).await?),
            Tool::ResolvePrompt => {
                to_value(handlers::resolve_prompt::handle(params, caller, store).await?)
            }
            Tool::SearchPrompts => {
                to_value(handlers::search_prompts::handle(params, caller, store).await?)
            }
        }
    }
}

fn to_value<T: Serialize>(result: T) -> Result<Value, McpError> {
    Ok(serde_json::to_value(result)?)
}

/// What sits behind a method name.
#[derive(Debug, Clone, Copy)]
pub enum MethodHandler {
    /// Static answer; no params, caller or store involved.
    Metadata(fn() -> Value),
    /// A data tool invoked with the request params.
    Tool(Tool),
    /// `tools/call`: route by tool name and wrap the result as a content block.
    ToolCall,
}

/// Method names and their handlers. `prompts/*` are the legacy names of the
/// data tools and stay routable.
const METHODS: &[(&str, MethodHandler)] = &[
    ("initialize", MethodHandler::Metadata(handlers::initialize::handle)),
    ("tools/list", MethodHandler::Metadata(handlers::list_tools::handle)),
    ("tools/call", MethodHandler::ToolCall),
    ("prompts/list", MethodHandler::Tool(Tool::ListPrompts)),
    ("prompts/get", MethodHandler::Tool(Tool::GetPrompt)),
    ("prompts/resolve", MethodHandler::Tool(Tool::ResolvePrompt)),
    ("prompts/search", MethodHandler::Tool(Tool::SearchPrompts)),
];

#[derive(Debug, thiserror::Error)]
#[error("method {0} is registered twice")]
pub struct DuplicateMethod(pub String);

/// Immutable routing table.
#[derive(Debug, Clone)]
pub struct MethodTable {
    routes: HashMap<&'static str, MethodHandler>,
}

impl MethodTable {
    pub fn new(entries: &[(&'static str, MethodHandler)]) -> Result<Self, DuplicateMethod> {
        let mut routes = HashMap::with_capacity(entries.len());
        for (name, handler) in entries {
            if routes.insert(*name, *handler).is_some() {
                return Err(DuplicateMethod((*name).to_string()));
            }
        }
        Ok(Self { routes })
    }

    /// The table of every method this server answers.
    pub fn standard() -> Self {
        Self::new(METHODS).expect("built-in method names must be unique")
    }

    pub fn get(&self, method: &str) -> Option<MethodHandler> {
        self.routes.get(method).copied()
    }

    pub fn methods(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.routes.keys().copied()
    }
}

/// Routes validated requests to handlers and turns every outcome into a
/// response envelope. Never fails.
pub struct Dispatcher {
    table: MethodTable,
    stores: Arc<dyn StoreProvider>,
}

impl Dispatcher {
    pub fn new(stores: Arc<dyn StoreProvider>) -> Self {
        Self::with_table(MethodTable::standard(), stores)
    }

    pub fn with_table(table: MethodTable, stores: Arc<dyn StoreProvider>) -> Self {
        Self { table, stores }
    }

    pub async fn dispatch(&self, req: &JsonRpcRequest, caller: Option<&str>) -> JsonRpcResponse {
        let Some(handler) = self.table.get(&req.method) else {
            let err = JsonRpcError::method_not_found(&req.method);
            return JsonRpcResponse::error(req.id.clone(), err);
        };

        debug!(method = %req.method, anonymous = caller.is_none(), "dispatching");

        let outcome = self.run(handler, req.params.as_ref(), caller).await;
        respond(req, outcome)
    }

    async fn run(
        &self,
        handler: MethodHandler,
        params: Option<&Value>,
        caller: Option<&str>,
    ) -> Result<Value, McpError> {
        match handler {
            MethodHandler::Metadata(handle) => Ok(handle()),
            MethodHandler::Tool(tool) => {
                let store = self.stores.store().await?;
                tool.call(params, caller, store.as_ref()).await
            }
            MethodHandler::ToolCall => self.tool_call(params, caller).await,
        }
    }

    async fn tool_call(
        &self,
        params: Option<&Value>,
        caller: Option<&str>,
    ) -> Result<Value, McpError> {
        let call: ToolCallParams = match params {
            Some(v @ Value::Object(_)) => serde_json::from_value(v.clone())
                .map_err(|e| McpError::invalid_params(&[e.to_string()]))?,
            _ => return Err(McpError::missing_tool_name()),
        };

        let name = call.tool_name().ok_or_else(McpError::missing_tool_name)?;
        let tool = Tool::from_name(&name).ok_or_else(|| McpError::unknown_tool(&name))?;

        let store = self.stores.store().await?;
        let result = tool.call(call.arguments.as_ref(), caller, store.as_ref()).await?;

        let text = serde_json::to_string_pretty(&result)?;
        Ok(serde_json::to_value(ToolResult::text(text))?)
    }
}

/// Wrap a handler outcome in an envelope echoing the request id.
fn respond(req: &JsonRpcRequest, outcome: Result<Value, McpError>) -> JsonRpcResponse {
    match outcome {
        Ok(result) => JsonRpcResponse::success(req.id.clone(), result),
        Err(McpError::Protocol(err)) => JsonRpcResponse::error(req.id.clone(), err),
        Err(err) => {
            error!(method = %req.method, "unexpected error: {err}");
            JsonRpcResponse::error(req.id.clone(), JsonRpcError::internal_error())
        }
    }
}
