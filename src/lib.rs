//! MCP server for a prompt repository.
//!
//! Exposes `list_prompts`, `get_prompt`, `resolve_prompt` and `search_prompts`
//! over JSON-RPC 2.0 on a single HTTP endpoint. Callers are anonymous or
//! identified by an API key; private prompts are only visible to their owner.

pub mod auth;
pub mod config;
pub mod dispatcher;
pub mod handlers;
pub mod policy;
pub mod protocol;
pub mod server;
pub mod store;
pub mod variables;

pub mod schema;
