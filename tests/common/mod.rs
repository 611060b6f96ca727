//! Shared fixtures: an in-memory prompt store and store providers that
//! count or fail on demand.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use prompt_repo_mcp::auth::hash_api_key;
use prompt_repo_mcp::store::{
    LazyStore, ListQuery, PromptRecord, PromptStore, SearchHit, StoreError, VersionRecord,
};

pub const ALICE: &str = "user-alice";
pub const BOB: &str = "user-bob";

pub const ALICE_KEY: &str = "alice-secret-key";
pub const BOB_KEY: &str = "bob-secret-key";

/// Alice, public: "Code review".
pub const PUBLIC_REVIEW: &str = "aaaaaaaa-0000-4000-8000-000000000001";
/// Alice, private: "Standup notes".
pub const ALICE_PRIVATE: &str = "aaaaaaaa-0000-4000-8000-000000000002";
/// Bob, public but archived: "Old review".
pub const ARCHIVED_REVIEW: &str = "aaaaaaaa-0000-4000-8000-000000000003";
/// Bob, private: "Security review".
pub const BOB_PRIVATE: &str = "aaaaaaaa-0000-4000-8000-000000000004";
/// Bob, public, no versions: "Empty".
pub const NO_VERSIONS: &str = "aaaaaaaa-0000-4000-8000-000000000005";
/// Valid UUID with no prompt behind it.
pub const MISSING: &str = "bbbbbbbb-0000-4000-8000-000000000000";

fn version(content: &str, version_number: i64) -> VersionRecord {
    VersionRecord {
        content: content.to_string(),
        version_number,
    }
}

fn prompt(
    id: &str,
    user_id: &str,
    title: &str,
    is_public: bool,
    updated_at: &str,
    versions: Vec<VersionRecord>,
) -> PromptRecord {
    PromptRecord {
        id: id.to_string(),
        user_id: user_id.to_string(),
        title: title.to_string(),
        description: Some(format!("{title} description")),
        is_public,
        archived_at: None,
        created_at: "2026-01-01T00:00:00Z".to_string(),
        updated_at: updated_at.to_string(),
        versions,
    }
}

/// In-memory `PromptStore` seeded with a small fixed catalogue.
pub struct FakeStore {
    prompts: Vec<PromptRecord>,
    keys: HashMap<String, String>,
    fail: bool,
}

impl FakeStore {
    pub fn seeded() -> Self {
        let mut archived = prompt(
            ARCHIVED_REVIEW,
            BOB,
            "Old review",
            true,
            "2026-01-06T00:00:00Z",
            vec![version("Deprecated review of {{thing}}", 1)],
        );
        archived.archived_at = Some("2026-01-07T00:00:00Z".to_string());

        let prompts = vec![
            prompt(
                PUBLIC_REVIEW,
                ALICE,
                "Code review",
                true,
                "2026-01-03T00:00:00Z",
                vec![
                    version("Old text {{stale}}", 1),
                    version("Review {{language}} code focusing on {{ focus }}. Use {{language}} idioms.", 2),
                ],
            ),
            prompt(
                ALICE_PRIVATE,
                ALICE,
                "Standup notes",
                false,
                "2026-01-02T00:00:00Z",
                vec![version("Summarize the {{team}} standup", 1)],
            ),
            archived,
            prompt(
                BOB_PRIVATE,
                BOB,
                "Security review",
                false,
                "2026-01-05T00:00:00Z",
                vec![version("Audit {{service}} for review findings", 1)],
            ),
            prompt(NO_VERSIONS, BOB, "Empty", true, "2026-01-01T00:00:00Z", Vec::new()),
        ];

        let keys = HashMap::from([
            (hash_api_key(ALICE_KEY), ALICE.to_string()),
            (hash_api_key(BOB_KEY), BOB.to_string()),
        ]);

        Self {
            prompts,
            keys,
            fail: false,
        }
    }

    /// A store whose every call fails.
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::seeded()
        }
    }

    fn check(&self) -> Result<(), StoreError> {
        if self.fail {
            Err(StoreError::Unavailable("connection refused".to_string()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl PromptStore for FakeStore {
    async fn list_prompts(&self, query: ListQuery) -> Result<Vec<PromptRecord>, StoreError> {
        self.check()?;
        let mut rows: Vec<PromptRecord> = self
            .prompts
            .iter()
            .filter(|p| p.archived_at.is_none())
            .filter(|p| p.is_public || query.visible_to.as_deref() == Some(p.user_id.as_str()))
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(rows
            .into_iter()
            .skip(query.offset as usize)
            .take(query.limit as usize)
            .collect())
    }

    async fn fetch_prompt(&self, id: &str) -> Result<Option<PromptRecord>, StoreError> {
        self.check()?;
        Ok(self.prompts.iter().find(|p| p.id == id).cloned())
    }

    async fn search_prompts(
        &self,
        query_text: &str,
        include_archived: bool,
    ) -> Result<Vec<SearchHit>, StoreError> {
        self.check()?;
        let needle = query_text.to_lowercase();
        let mut hits: Vec<SearchHit> = self
            .prompts
            .iter()
            .filter(|p| include_archived || p.archived_at.is_none())
            .filter_map(|p| {
                let content = p.latest_content().to_string();
                let haystack = format!(
                    "{} {} {}",
                    p.title,
                    p.description.as_deref().unwrap_or(""),
                    content
                )
                .to_lowercase();
                let count = haystack.matches(&needle).count();
                (count > 0).then(|| SearchHit {
                    id: p.id.clone(),
                    user_id: p.user_id.clone(),
                    title: p.title.clone(),
                    description: p.description.clone(),
                    is_public: p.is_public,
                    archived_at: p.archived_at.clone(),
                    latest_content: content,
                    rank: count as f64,
                })
            })
            .collect();
        hits.sort_by(|a, b| b.rank.total_cmp(&a.rank).then_with(|| a.id.cmp(&b.id)));
        Ok(hits)
    }

    async fn api_key_owner(&self, key_hash: &str) -> Result<Option<String>, StoreError> {
        self.check()?;
        Ok(self.keys.get(key_hash).cloned())
    }
}

/// A lazily-built provider over `store`, plus a counter of factory runs.
pub fn counting_provider(store: FakeStore) -> (Arc<LazyStore>, Arc<AtomicUsize>) {
    let calls = Arc::new(AtomicUsize::new(0));
    let store: Arc<dyn PromptStore> = Arc::new(store);
    let counter = Arc::clone(&calls);
    let provider = LazyStore::new(move || {
        counter.fetch_add(1, Ordering::SeqCst);
        Ok(Arc::clone(&store))
    });
    (Arc::new(provider), calls)
}

/// A provider whose factory fails the first `failures` times.
pub fn flaky_provider(failures: usize) -> (Arc<LazyStore>, Arc<AtomicUsize>) {
    let calls = Arc::new(AtomicUsize::new(0));
    let store: Arc<dyn PromptStore> = Arc::new(FakeStore::seeded());
    let counter = Arc::clone(&calls);
    let provider = LazyStore::new(move || {
        let n = counter.fetch_add(1, Ordering::SeqCst);
        if n < failures {
            Err(StoreError::Unavailable("database is starting".to_string()))
        } else {
            Ok(Arc::clone(&store))
        }
    });
    (Arc::new(provider), calls)
}

pub fn seeded_store() -> FakeStore {
    FakeStore::seeded()
}
