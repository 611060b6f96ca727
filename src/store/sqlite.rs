//! SQLite-backed prompt store with FTS5 full-text search.

use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};
use tracing::debug;

use super::{ListQuery, PromptRecord, PromptStore, SearchHit, StoreError, VersionRecord};

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS prompts (
    id TEXT PRIMARY KEY,
    user_id TEXT NOT NULL,
    title TEXT NOT NULL,
    description TEXT,
    is_public INTEGER NOT NULL DEFAULT 0,
    archived_at TEXT,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_prompts_updated_at ON prompts(updated_at);
CREATE INDEX IF NOT EXISTS idx_prompts_user_id ON prompts(user_id);

CREATE TABLE IF NOT EXISTS prompt_versions (
    id TEXT PRIMARY KEY,
    prompt_id TEXT NOT NULL REFERENCES prompts(id) ON DELETE CASCADE,
    content TEXT NOT NULL,
    version_number INTEGER NOT NULL,
    created_at TEXT NOT NULL,
    UNIQUE (prompt_id, version_number)
);

CREATE TABLE IF NOT EXISTS user_api_keys (
    id TEXT PRIMARY KEY,
    user_id TEXT NOT NULL,
    key_hash TEXT NOT NULL UNIQUE,
    revoked_at TEXT,
    created_at TEXT NOT NULL
);

CREATE VIRTUAL TABLE IF NOT EXISTS prompt_search USING fts5(
    prompt_id UNINDEXED,
    title,
    description,
    content
);

CREATE TRIGGER IF NOT EXISTS prompts_search_insert AFTER INSERT ON prompts BEGIN
    INSERT INTO prompt_search (prompt_id, title, description, content)
    VALUES (new.id, new.title, coalesce(new.description, ''), '');
END;

CREATE TRIGGER IF NOT EXISTS prompts_search_update AFTER UPDATE OF title, description ON prompts BEGIN
    UPDATE prompt_search
    SET title = new.title, description = coalesce(new.description, '')
    WHERE prompt_id = new.id;
END;

CREATE TRIGGER IF NOT EXISTS prompts_search_delete AFTER DELETE ON prompts BEGIN
    DELETE FROM prompt_search WHERE prompt_id = old.id;
END;

CREATE TRIGGER IF NOT EXISTS prompt_versions_search_insert AFTER INSERT ON prompt_versions BEGIN
    UPDATE prompt_search
    SET content = (
        SELECT content FROM prompt_versions
        WHERE prompt_id = new.prompt_id
        ORDER BY version_number DESC LIMIT 1
    )
    WHERE prompt_id = new.prompt_id;
END;

CREATE TRIGGER IF NOT EXISTS prompt_versions_search_update AFTER UPDATE ON prompt_versions BEGIN
    UPDATE prompt_search
    SET content = coalesce((
        SELECT v.content FROM prompt_versions v
        WHERE v.prompt_id = prompt_search.prompt_id
        ORDER BY v.version_number DESC LIMIT 1
    ), '')
    WHERE prompt_id IN (old.prompt_id, new.prompt_id);
END;

CREATE TRIGGER IF NOT EXISTS prompt_versions_search_delete AFTER DELETE ON prompt_versions BEGIN
    UPDATE prompt_search
    SET content = coalesce((
        SELECT content FROM prompt_versions
        WHERE prompt_id = old.prompt_id
        ORDER BY version_number DESC LIMIT 1
    ), '')
    WHERE prompt_id = old.prompt_id;
END;
"#;

const PROMPT_COLUMNS: &str =
    "id, user_id, title, description, is_public, archived_at, created_at, updated_at";

/// Prompt store over a single SQLite connection.
///
/// Queries run on the blocking pool; the connection is shared behind a mutex.
#[derive(Clone)]
pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    /// Open (creating if needed) the database at `path`.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        Self::from_connection(conn)
    }

    pub fn open_in_memory() -> Result<Self, StoreError> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self, StoreError> {
        conn.pragma_update(None, "foreign_keys", "ON")?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    async fn with_conn<T, F>(&self, f: F) -> Result<T, StoreError>
    where
        T: Send + 'static,
        F: FnOnce(&Connection) -> Result<T, StoreError> + Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let guard = conn
                .lock()
                .map_err(|_| StoreError::Unavailable("connection lock poisoned".into()))?;
            f(&guard)
        })
        .await?
    }
}

fn prompt_from_row(row: &Row<'_>) -> rusqlite::Result<PromptRecord> {
    Ok(PromptRecord {
        id: row.get(0)?,
        user_id: row.get(1)?,
        title: row.get(2)?,
        description: row.get(3)?,
        is_public: row.get(4)?,
        archived_at: row.get(5)?,
        created_at: row.get(6)?,
        updated_at: row.get(7)?,
        versions: Vec::new(),
    })
}

/// Attach every version to its prompt in one query.
fn load_versions(conn: &Connection, prompts: &mut [PromptRecord]) -> Result<(), StoreError> {
    if prompts.is_empty() {
        return Ok(());
    }

    let placeholders = vec!["?"; prompts.len()].join(",");
    let sql = format!(
        "SELECT prompt_id, content, version_number FROM prompt_versions WHERE prompt_id IN ({placeholders})"
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params_from_iter(prompts.iter().map(|p| p.id.as_str())), |row| {
        Ok((
            row.get::<_, String>(0)?,
            VersionRecord {
                content: row.get(1)?,
                version_number: row.get(2)?,
            },
        ))
    })?;

    let mut by_prompt: HashMap<String, Vec<VersionRecord>> = HashMap::new();
    for row in rows {
        let (prompt_id, version) = row?;
        by_prompt.entry(prompt_id).or_default().push(version);
    }
    for prompt in prompts.iter_mut() {
        prompt.versions = by_prompt.remove(&prompt.id).unwrap_or_default();
    }
    Ok(())
}

/// Turn free text into an FTS5 query: every whitespace-separated token is
/// quoted, tokens are ANDed. `None` when there is nothing to match.
fn fts_query(text: &str) -> Option<String> {
    let tokens: Vec<String> = text
        .split_whitespace()
        .map(|t| format!("\"{}\"", t.replace('"', "\"\"")))
        .collect();
    if tokens.is_empty() {
        None
    } else {
        Some(tokens.join(" "))
    }
}

#[async_trait]
impl PromptStore for SqliteStore {
    async fn list_prompts(&self, query: ListQuery) -> Result<Vec<PromptRecord>, StoreError> {
        self.with_conn(move |conn| {
            let sql = format!(
                "SELECT {PROMPT_COLUMNS} FROM prompts
                 WHERE archived_at IS NULL
                   AND (is_public = 1 OR (?1 IS NOT NULL AND user_id = ?1))
                 ORDER BY updated_at DESC
                 LIMIT ?2 OFFSET ?3"
            );
            let mut stmt = conn.prepare(&sql)?;
            let mut prompts = stmt
                .query_map(
                    params![query.visible_to, query.limit, query.offset],
                    prompt_from_row,
                )?
                .collect::<Result<Vec<_>, _>>()?;
            load_versions(conn, &mut prompts)?;
            debug!("listed {} prompts", prompts.len());
            Ok(prompts)
        })
        .await
    }

    async fn fetch_prompt(&self, id: &str) -> Result<Option<PromptRecord>, StoreError> {
        let id = id.to_string();
        self.with_conn(move |conn| {
            let sql = format!("SELECT {PROMPT_COLUMNS} FROM prompts WHERE id = ?1");
            let prompt = conn.query_row(&sql, params![id], prompt_from_row).optional()?;
            let Some(prompt) = prompt else {
                return Ok(None);
            };
            let mut found = [prompt];
            load_versions(conn, &mut found)?;
            let [prompt] = found;
            Ok(Some(prompt))
        })
        .await
    }

    async fn search_prompts(
        &self,
        query_text: &str,
        include_archived: bool,
    ) -> Result<Vec<SearchHit>, StoreError> {
        let Some(fts) = fts_query(query_text) else {
            return Ok(Vec::new());
        };
        self.with_conn(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT p.id, p.user_id, p.title, p.description, p.is_public, p.archived_at,
                        coalesce((SELECT v.content FROM prompt_versions v
                                  WHERE v.prompt_id = p.id
                                  ORDER BY v.version_number DESC LIMIT 1), '') AS latest_content,
                        -bm25(prompt_search) AS score
                 FROM prompt_search
                 JOIN prompts p ON p.id = prompt_search.prompt_id
                 WHERE prompt_search MATCH ?1
                   AND (?2 OR p.archived_at IS NULL)
                 ORDER BY score DESC",
            )?;
            let hits = stmt
                .query_map(params![fts, include_archived], |row| {
                    Ok(SearchHit {
                        id: row.get(0)?,
                        user_id: row.get(1)?,
                        title: row.get(2)?,
                        description: row.get(3)?,
                        is_public: row.get(4)?,
                        archived_at: row.get(5)?,
                        latest_content: row.get(6)?,
                        rank: row.get(7)?,
                    })
                })?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(hits)
        })
        .await
    }

    async fn api_key_owner(&self, key_hash: &str) -> Result<Option<String>, StoreError> {
        let key_hash = key_hash.to_string();
        self.with_conn(move |conn| {
            let owner = conn
                .query_row(
                    "SELECT user_id FROM user_api_keys WHERE key_hash = ?1 AND revoked_at IS NULL",
                    params![key_hash],
                    |row| row.get::<_, String>(0),
                )
                .optional()?;
            Ok(owner)
        })
        .await
    }
}
