//! API-key verification.
//!
//! Keys are stored as SHA-256 hashes; plaintext keys never reach the store
//! and are never logged.

use std::sync::Arc;

use async_trait::async_trait;
use axum::http::HeaderMap;
use sha2::{Digest, Sha256};
use tracing::warn;

use crate::store::StoreProvider;

/// Outcome of verifying a presented key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyVerification {
    Valid { user_id: String },
    Invalid,
}

/// Key verification collaborator. Internal failures are reported as
/// `Invalid`, so callers only ever see a verdict.
#[async_trait]
pub trait KeyVerifier: Send + Sync {
    async fn verify(&self, plaintext: &str) -> KeyVerification;
}

/// SHA-256 of the key as 64 lowercase hex characters.
pub fn hash_api_key(plaintext: &str) -> String {
    hex::encode(Sha256::digest(plaintext.as_bytes()))
}

/// Key presented with the request, if any.
///
/// `Authorization: Bearer <key>` wins over `x-api-key`. A key that is
/// empty after trimming counts as no key.
pub fn presented_key(headers: &HeaderMap) -> Option<String> {
    let bearer = headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "));

    let raw = match bearer {
        Some(key) => key,
        None => headers.get("x-api-key").and_then(|v| v.to_str().ok())?,
    };

    let key = raw.trim();
    if key.is_empty() {
        None
    } else {
        Some(key.to_string())
    }
}

/// Verifies keys against the `user_api_keys` table of the backing store.
pub struct StoreKeyVerifier {
    provider: Arc<dyn StoreProvider>,
}

impl StoreKeyVerifier {
    pub fn new(provider: Arc<dyn StoreProvider>) -> Self {
        Self { provider }
    }
}

#[async_trait]
impl KeyVerifier for StoreKeyVerifier {
    async fn verify(&self, plaintext: &str) -> KeyVerification {
        let store = match self.provider.store().await {
            Ok(store) => store,
            Err(e) => {
                warn!("key verification: store unavailable: {e}");
                return KeyVerification::Invalid;
            }
        };

        match store.api_key_owner(&hash_api_key(plaintext)).await {
            Ok(Some(user_id)) => KeyVerification::Valid { user_id },
            Ok(None) => KeyVerification::Invalid,
            Err(e) => {
                warn!("key verification: lookup failed: {e}");
                KeyVerification::Invalid
            }
        }
    }
}
