use crate::store::StoreError;

use super::response::JsonRpcError;

/// Failure of a method handler.
///
/// Only `Protocol` errors reach the caller as-is; everything else is
/// logged and replaced by an opaque internal error at the dispatcher.
#[derive(Debug, thiserror::Error)]
pub enum McpError {
    #[error("{} ({})", .0.message, .0.code)]
    Protocol(JsonRpcError),
    #[error("backing store failure: {0}")]
    Store(#[from] StoreError),
    #[error("internal failure: {0}")]
    Internal(String),
}

impl McpError {
    pub fn invalid_params(violations: &[String]) -> Self {
        Self::Protocol(JsonRpcError::invalid_params(violations))
    }

    pub fn prompt_not_found() -> Self {
        Self::Protocol(JsonRpcError::prompt_not_found())
    }

    pub fn unknown_tool(name: &str) -> Self {
        Self::Protocol(JsonRpcError::new(
            super::codes::METHOD_NOT_FOUND,
            format!("Unknown tool: {name}"),
        ))
    }

    pub fn missing_tool_name() -> Self {
        Self::Protocol(JsonRpcError::new(
            super::codes::INVALID_PARAMS,
            "tools/call requires a \"name\" parameter.",
        ))
    }
}

impl From<JsonRpcError> for McpError {
    fn from(err: JsonRpcError) -> Self {
        Self::Protocol(err)
    }
}

impl From<serde_json::Error> for McpError {
    fn from(err: serde_json::Error) -> Self {
        Self::Internal(format!("serialization failed: {err}"))
    }
}
