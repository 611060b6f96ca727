pub mod error;
pub mod request;
pub mod response;

pub use error::McpError;
pub use request::{
    GetPromptParams, JsonRpcRequest, ListPromptsParams, ResolvePromptParams, RpcId,
    SearchPromptsParams, ToolCallParams, Validate,
};
pub use response::{
    codes, JsonRpcError, JsonRpcResponse, ToolResult, ToolResultContent, INTERNAL_ERROR_MESSAGE,
};
