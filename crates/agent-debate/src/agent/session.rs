//! Per-role continuation tokens.

use super::Role;
use std::collections::HashMap;
use tokio::sync::RwLock;

/// Holds the opaque session token each backend handed back on its first
/// call, so later calls resume the same conversation.
///
/// Safe to share across the two concurrent round-0 calls.
#[derive(Debug, Default)]
pub struct SessionRegistry {
    tokens: RwLock<HashMap<Role, String>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get(&self, role: Role) -> Option<String> {
        self.tokens.read().await.get(&role).cloned()
    }

    /// Records a token. An existing token for the role is replaced.
    pub async fn set(&self, role: Role, token: impl Into<String>) {
        self.tokens.write().await.insert(role, token.into());
    }

    /// Stores `token` only if the role has none yet. Returns whether it was stored.
    pub async fn set_if_absent(&self, role: Role, token: impl Into<String>) -> bool {
        let mut tokens = self.tokens.write().await;
        if tokens.contains_key(&role) {
            return false;
        }
        tokens.insert(role, token.into());
        true
    }

    pub async fn clear(&self, role: Role) {
        self.tokens.write().await.remove(&role);
    }

    /// Copy of every stored token.
    pub async fn snapshot(&self) -> HashMap<Role, String> {
        self.tokens.read().await.clone()
    }
}
