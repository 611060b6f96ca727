use std::net::SocketAddr;
use std::path::PathBuf;

const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8787";
const DEFAULT_MCP_PATH: &str = "/api/mcp";
/// Default request body cap (1 MiB).
const DEFAULT_MAX_BODY_BYTES: usize = 1024 * 1024;

/// Server configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub database: PathBuf,
    pub bind_addr: SocketAddr,
    pub mcp_path: String,
    pub max_body_bytes: usize,
}

impl ServerConfig {
    /// Load configuration from environment.
    ///
    /// - `PROMPT_REPO_DATABASE` (required): path to the SQLite prompt database
    /// - `PROMPT_REPO_BIND_ADDR` (optional, default `127.0.0.1:8787`)
    /// - `PROMPT_REPO_MCP_PATH` (optional, default `/api/mcp`)
    /// - `PROMPT_REPO_MAX_BODY_BYTES` (optional, default 1048576)
    pub fn from_env() -> Result<Self, String> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) with an explicit variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, String> {
        let database = lookup("PROMPT_REPO_DATABASE")
            .filter(|v| !v.is_empty())
            .map(PathBuf::from)
            .ok_or_else(|| "PROMPT_REPO_DATABASE environment variable is not set".to_string())?;

        let bind_addr = lookup("PROMPT_REPO_BIND_ADDR")
            .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string())
            .parse::<SocketAddr>()
            .map_err(|_| "PROMPT_REPO_BIND_ADDR must be a socket address like 127.0.0.1:8787".to_string())?;

        let mcp_path = lookup("PROMPT_REPO_MCP_PATH").unwrap_or_else(|| DEFAULT_MCP_PATH.to_string());
        if !mcp_path.starts_with('/') {
            return Err("PROMPT_REPO_MCP_PATH must start with '/'".to_string());
        }

        let max_body_bytes = match lookup("PROMPT_REPO_MAX_BODY_BYTES") {
            Some(val) => val
                .parse::<usize>()
                .ok()
                .filter(|n| *n > 0)
                .ok_or_else(|| "PROMPT_REPO_MAX_BODY_BYTES must be a positive integer".to_string())?,
            None => DEFAULT_MAX_BODY_BYTES,
        };

        Ok(Self {
            database,
            bind_addr,
            mcp_path,
            max_body_bytes,
        })
    }
}
