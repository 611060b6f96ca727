use serde_json::Value;

use crate::policy::is_visible;
use crate::protocol::{ListPromptsParams, McpError};
use crate::store::{ListQuery, PromptStore};

use super::{parse_params, PromptEntry, PromptList};

/// Handle `list_prompts`.
///
/// Returns one page of non-archived prompts the caller may see, newest
/// `updated_at` first. Variables come from each prompt's latest version;
/// content itself is not returned.
pub async fn handle(
    params: Option<&Value>,
    caller: Option<&str>,
    store: &dyn PromptStore,
) -> Result<PromptList, McpError> {
    let params: ListPromptsParams = parse_params(params, true)?;

    let query = ListQuery {
        visible_to: caller.map(str::to_string),
        limit: u32::try_from(params.limit()).unwrap_or(u32::MAX),
        offset: u32::try_from(params.offset()).unwrap_or(u32::MAX),
    };
    let rows = store.list_prompts(query).await?;

    let prompts = rows
        .into_iter()
        .filter(|row| row.archived_at.is_none() && is_visible(caller, &row.user_id, row.is_public))
        .map(|row| {
            let content = row.latest_content().to_string();
            PromptEntry::new(row.id, row.title, row.description, &content)
        })
        .collect();

    Ok(PromptList { prompts })
}
