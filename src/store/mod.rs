//! Backing-store collaborator.
//!
//! The MCP core only reads from the store. The store is opened with full
//! read access (no per-user row filtering), so callers enforce visibility.

pub mod sqlite;

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::OnceCell;

pub use sqlite::SqliteStore;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("store task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// One version of a prompt's template text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionRecord {
    pub content: String,
    pub version_number: i64,
}

/// A prompt row joined with all of its versions.
#[derive(Debug, Clone, PartialEq)]
pub struct PromptRecord {
    pub id: String,
    pub user_id: String,
    pub title: String,
    pub description: Option<String>,
    pub is_public: bool,
    pub archived_at: Option<String>,
    pub created_at: String,
    pub updated_at: String,
    pub versions: Vec<VersionRecord>,
}

impl PromptRecord {
    /// Highest `version_number`, if the prompt has any version.
    pub fn latest_version(&self) -> Option<&VersionRecord> {
        self.versions.iter().max_by_key(|v| v.version_number)
    }

    /// Template text of the latest version, or empty.
    pub fn latest_content(&self) -> &str {
        self.latest_version().map(|v| v.content.as_str()).unwrap_or("")
    }
}

/// A full-text search match.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchHit {
    pub id: String,
    pub user_id: String,
    pub title: String,
    pub description: Option<String>,
    pub is_public: bool,
    pub archived_at: Option<String>,
    pub latest_content: String,
    pub rank: f64,
}

/// Listing query: non-archived prompts visible to `visible_to`, newest
/// `updated_at` first, paginated after filtering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListQuery {
    pub visible_to: Option<String>,
    pub limit: u32,
    pub offset: u32,
}

#[async_trait]
pub trait PromptStore: Send + Sync {
    async fn list_prompts(&self, query: ListQuery) -> Result<Vec<PromptRecord>, StoreError>;

    /// Fetch one prompt with all its versions. Archived prompts are returned.
    async fn fetch_prompt(&self, id: &str) -> Result<Option<PromptRecord>, StoreError>;

    /// Ranked full-text matches, best first.
    async fn search_prompts(
        &self,
        query_text: &str,
        include_archived: bool,
    ) -> Result<Vec<SearchHit>, StoreError>;

    /// Owner of a non-revoked API key with the given SHA-256 hex hash.
    async fn api_key_owner(&self, key_hash: &str) -> Result<Option<String>, StoreError>;
}

/// Hands out the shared store handle.
#[async_trait]
pub trait StoreProvider: Send + Sync {
    async fn store(&self) -> Result<Arc<dyn PromptStore>, StoreError>;
}

type StoreFactory = Box<dyn Fn() -> Result<Arc<dyn PromptStore>, StoreError> + Send + Sync>;

/// Builds the store on first use and reuses it afterwards.
///
/// A failed build is not cached; the next call retries the factory.
pub struct LazyStore {
    factory: StoreFactory,
    cell: OnceCell<Arc<dyn PromptStore>>,
}

impl LazyStore {
    pub fn new<F>(factory: F) -> Self
    where
        F: Fn() -> Result<Arc<dyn PromptStore>, StoreError> + Send + Sync + 'static,
    {
        Self {
            factory: Box::new(factory),
            cell: OnceCell::new(),
        }
    }

    /// Provider over an already-built store.
    pub fn ready(store: Arc<dyn PromptStore>) -> Self {
        Self {
            factory: Box::new(|| Err(StoreError::Unavailable("factory not used".into()))),
            cell: OnceCell::new_with(Some(store)),
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.cell.initialized()
    }
}

#[async_trait]
impl StoreProvider for LazyStore {
    async fn store(&self) -> Result<Arc<dyn PromptStore>, StoreError> {
        self.cell
            .get_or_try_init(|| async {
                let store = (self.factory)()?;
                tracing::info!("backing store initialized");
                Ok(store)
            })
            .await
            .cloned()
    }
}
