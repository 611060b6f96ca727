pub mod get_prompt;
pub mod initialize;
pub mod list_prompts;
pub mod list_tools;
pub mod resolve_prompt;
pub mod search_prompts;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::protocol::{McpError, Validate};
use crate::variables::extract_variables;

/// Listing projection shared by `list_prompts` and `search_prompts`.
/// Template content is never included.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PromptEntry {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub variables: Vec<String>,
}

impl PromptEntry {
    pub fn new(id: String, title: String, description: Option<String>, content: &str) -> Self {
        Self {
            id,
            title,
            description,
            variables: extract_variables(content),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PromptList {
    pub prompts: Vec<PromptEntry>,
}

/// Deserialize and rule-check tool params before any store access.
///
/// Params must be a JSON object. When `absent_as_empty` is set, missing or
/// `null` params are read as `{}`.
pub(crate) fn parse_params<T>(params: Option<&Value>, absent_as_empty: bool) -> Result<T, McpError>
where
    T: DeserializeOwned + Validate,
{
    let empty = Value::Object(Default::default());
    let value = match params {
        None | Some(Value::Null) if absent_as_empty => &empty,
        Some(v @ Value::Object(_)) => v,
        _ => return Err(McpError::invalid_params(&["params must be an object".to_string()])),
    };

    let parsed: T = serde_json::from_value(value.clone())
        .map_err(|e| McpError::invalid_params(&[e.to_string()]))?;

    let violations = parsed.violations();
    if violations.is_empty() {
        Ok(parsed)
    } else {
        Err(McpError::invalid_params(&violations))
    }
}
