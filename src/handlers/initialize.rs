use serde_json::{json, Value};

/// MCP protocol revision this server speaks.
pub const PROTOCOL_VERSION: &str = "2024-11-05";

/// Handle `initialize`: static protocol and server metadata.
pub fn handle() -> Value {
    json!({
        "protocolVersion": PROTOCOL_VERSION,
        "capabilities": {
            "tools": {}
        },
        "serverInfo": {
            "name": "prompt-repo",
            "version": env!("CARGO_PKG_VERSION")
        }
    })
}
