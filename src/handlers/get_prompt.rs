use serde::Serialize;
use serde_json::Value;

use crate::policy::is_visible;
use crate::protocol::{GetPromptParams, McpError};
use crate::store::{PromptRecord, PromptStore};
use crate::variables::extract_variables;

use super::parse_params;

#[derive(Debug, Clone, Serialize)]
pub struct GetPromptResult {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub content: String,
    pub is_public: bool,
    pub variables: Vec<String>,
    pub version_number: i64,
    pub created_at: String,
    pub updated_at: String,
}

/// Handle `get_prompt`.
///
/// A prompt the caller may not see is reported exactly like a missing one.
/// Archived prompts are still served by id.
pub async fn handle(
    params: Option<&Value>,
    caller: Option<&str>,
    store: &dyn PromptStore,
) -> Result<GetPromptResult, McpError> {
    let params: GetPromptParams = parse_params(params, false)?;
    let prompt = fetch_visible(&params.prompt_id, caller, store).await?;

    let (content, version_number) = match prompt.latest_version() {
        Some(v) => (v.content.clone(), v.version_number),
        None => (String::new(), 0),
    };

    Ok(GetPromptResult {
        variables: extract_variables(&content),
        id: prompt.id,
        title: prompt.title,
        description: prompt.description,
        content,
        is_public: prompt.is_public,
        version_number,
        created_at: prompt.created_at,
        updated_at: prompt.updated_at,
    })
}

/// Fetch a prompt by id, treating invisible prompts as absent.
pub(crate) async fn fetch_visible(
    prompt_id: &str,
    caller: Option<&str>,
    store: &dyn PromptStore,
) -> Result<PromptRecord, McpError> {
    let id = prompt_id.to_ascii_lowercase();
    match store.fetch_prompt(&id).await? {
        Some(prompt) if is_visible(caller, &prompt.user_id, prompt.is_public) => Ok(prompt),
        _ => Err(McpError::prompt_not_found()),
    }
}
