use serde_json::Value;

use crate::policy::is_visible;
use crate::protocol::{McpError, SearchPromptsParams};
use crate::store::PromptStore;

use super::{parse_params, PromptEntry, PromptList};

/// Handle `search_prompts`.
///
/// Ranking belongs to the store. Visibility is applied to the ranked hits
/// before truncating to `limit`, so the page only holds visible prompts.
pub async fn handle(
    params: Option<&Value>,
    caller: Option<&str>,
    store: &dyn PromptStore,
) -> Result<PromptList, McpError> {
    let params: SearchPromptsParams = parse_params(params, false)?;
    let limit = params.limit() as usize;

    let query = params.query.trim();
    if query.is_empty() {
        return Ok(PromptList { prompts: Vec::new() });
    }
    let hits = store.search_prompts(query, false).await?;

    let prompts = hits
        .into_iter()
        .filter(|hit| hit.archived_at.is_none() && is_visible(caller, &hit.user_id, hit.is_public))
        .take(limit)
        .map(|hit| PromptEntry::new(hit.id, hit.title, hit.description, &hit.latest_content))
        .collect();

    Ok(PromptList { prompts })
}
