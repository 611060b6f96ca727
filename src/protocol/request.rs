use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// JSON-RPC 2.0 ID: a number or string, echoed back unchanged.
///
/// A `null` id is modelled as `Option::None` on the envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RpcId {
    Number(serde_json::Number),
    Str(String),
}

impl RpcId {
    /// Recover an id from an arbitrary JSON value, if it has a legal id type.
    pub fn from_value(value: &serde_json::Value) -> Option<Self> {
        match value {
            serde_json::Value::Number(n) => Some(Self::Number(n.clone())),
            serde_json::Value::String(s) => Some(Self::Str(s.clone())),
            _ => None,
        }
    }
}

impl From<i64> for RpcId {
    fn from(n: i64) -> Self {
        Self::Number(n.into())
    }
}

impl From<&str> for RpcId {
    fn from(s: &str) -> Self {
        Self::Str(s.to_string())
    }
}

/// JSON-RPC 2.0 request envelope.
#[derive(Debug, Clone, Deserialize)]
pub struct JsonRpcRequest {
    pub jsonrpc: String,
    pub id: Option<RpcId>,
    pub method: String,
    #[serde(default)]
    pub params: Option<serde_json::Value>,
}

impl JsonRpcRequest {
    pub fn new(id: Option<RpcId>, method: impl Into<String>, params: Option<serde_json::Value>) -> Self {
        Self {
            jsonrpc: "2.0".into(),
            id,
            method: method.into(),
            params,
        }
    }
}

/// Rule checks that serde's type checks cannot express.
///
/// Returns one message per violated rule; empty means valid.
pub trait Validate {
    fn violations(&self) -> Vec<String>;
}

/// Parameters for `list_prompts`.
///
/// Numbers are kept as JSON numbers so integral floats like `5.0` pass.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListPromptsParams {
    pub limit: Option<serde_json::Number>,
    pub offset: Option<serde_json::Number>,
}

impl ListPromptsParams {
    pub const DEFAULT_LIMIT: i64 = 20;
    pub const MAX_LIMIT: i64 = 100;

    pub fn limit(&self) -> i64 {
        self.limit.as_ref().and_then(integral).unwrap_or(Self::DEFAULT_LIMIT)
    }

    pub fn offset(&self) -> i64 {
        self.offset.as_ref().and_then(integral).unwrap_or(0)
    }
}

impl Validate for ListPromptsParams {
    fn violations(&self) -> Vec<String> {
        let mut out = Vec::new();
        out.extend(range_violation("limit", self.limit.as_ref(), 1, Self::MAX_LIMIT));
        if let Some(offset) = &self.offset {
            match integral(offset) {
                None => out.push("offset must be an integer".to_string()),
                Some(n) if n < 0 => {
                    out.push("offset must be greater than or equal to 0".to_string())
                }
                Some(_) => {}
            }
        }
        out
    }
}

/// Parameters for `get_prompt`.
#[derive(Debug, Clone, Deserialize)]
pub struct GetPromptParams {
    pub prompt_id: String,
}

impl Validate for GetPromptParams {
    fn violations(&self) -> Vec<String> {
        uuid_violation(&self.prompt_id).into_iter().collect()
    }
}

/// Parameters for `resolve_prompt`.
#[derive(Debug, Clone, Deserialize)]
pub struct ResolvePromptParams {
    pub prompt_id: String,
    #[serde(default)]
    pub variables: Option<HashMap<String, String>>,
}

impl Validate for ResolvePromptParams {
    fn violations(&self) -> Vec<String> {
        uuid_violation(&self.prompt_id).into_iter().collect()
    }
}

/// Parameters for `search_prompts`.
#[derive(Debug, Clone, Deserialize)]
pub struct SearchPromptsParams {
    pub query: String,
    pub limit: Option<serde_json::Number>,
}

impl SearchPromptsParams {
    pub const DEFAULT_LIMIT: i64 = 10;
    pub const MAX_LIMIT: i64 = 50;

    pub fn limit(&self) -> i64 {
        self.limit.as_ref().and_then(integral).unwrap_or(Self::DEFAULT_LIMIT)
    }
}

impl Validate for SearchPromptsParams {
    fn violations(&self) -> Vec<String> {
        let mut out = Vec::new();
        if self.query.is_empty() {
            out.push("query must be at least 1 character".to_string());
        }
        out.extend(range_violation("limit", self.limit.as_ref(), 1, Self::MAX_LIMIT));
        out
    }
}

/// Parameters for `tools/call`.
///
/// `name` is kept raw: a present but non-string name is an unknown tool,
/// not a malformed call.
#[derive(Debug, Clone, Deserialize)]
pub struct ToolCallParams {
    pub name: Option<serde_json::Value>,
    pub arguments: Option<serde_json::Value>,
}

impl ToolCallParams {
    /// Requested tool name. `None` when absent or falsy (`null`, `false`,
    /// `0`, `""`); other non-string values are rendered as JSON text.
    pub fn tool_name(&self) -> Option<String> {
        use serde_json::Value;

        match self.name.as_ref()? {
            Value::Null | Value::Bool(false) => None,
            Value::String(s) if s.is_empty() => None,
            Value::Number(n) if n.as_f64() == Some(0.0) => None,
            Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }
}

/// Integer value of a JSON number, accepting integral floats (`5.0`, `1e1`).
/// Values outside `i64` saturate.
fn integral(n: &serde_json::Number) -> Option<i64> {
    if let Some(i) = n.as_i64() {
        return Some(i);
    }
    if n.is_u64() {
        return Some(i64::MAX);
    }
    let f = n.as_f64()?;
    (f.fract() == 0.0).then_some(f as i64)
}

fn range_violation(
    field: &str,
    value: Option<&serde_json::Number>,
    min: i64,
    max: i64,
) -> Option<String> {
    match integral(value?) {
        Some(n) if (min..=max).contains(&n) => None,
        Some(_) => Some(format!("{field} must be between {min} and {max}")),
        None => Some(format!("{field} must be an integer")),
    }
}

/// Only the canonical 36-character hyphenated form is accepted.
fn uuid_violation(raw: &str) -> Option<String> {
    if raw.len() == 36 && uuid::Uuid::try_parse(raw).is_ok() {
        None
    } else {
        Some("prompt_id must be a valid UUID".to_string())
    }
}
