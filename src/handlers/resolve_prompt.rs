use serde::Serialize;
use serde_json::Value;

use crate::protocol::{McpError, ResolvePromptParams};
use crate::store::PromptStore;
use crate::variables::{resolve_prompt, unresolved_variables};

use super::get_prompt::fetch_visible;
use super::parse_params;

#[derive(Debug, Clone, Serialize)]
pub struct ResolvePromptResult {
    pub resolved_content: String,
    pub unresolved_variables: Vec<String>,
}

/// Handle `resolve_prompt`: substitute the supplied values into the latest
/// version of a prompt. Partial resolution is not an error.
pub async fn handle(
    params: Option<&Value>,
    caller: Option<&str>,
    store: &dyn PromptStore,
) -> Result<ResolvePromptResult, McpError> {
    let params: ResolvePromptParams = parse_params(params, false)?;
    let values = params.variables.unwrap_or_default();

    let prompt = fetch_visible(&params.prompt_id, caller, store).await?;
    let content = prompt.latest_content();

    Ok(ResolvePromptResult {
        resolved_content: resolve_prompt(content, &values),
        unresolved_variables: unresolved_variables(content, &values),
    })
}
