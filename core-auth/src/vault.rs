//! Secure token vault: a typed facade over the platform secure store.
//!
//! Tokens are addressed by [`TokenKey`], never by raw strings, so the
//! sign-out wipe can enumerate every key the auth layer owns without
//! touching unrelated secrets that share the store.

use std::sync::Arc;

use bridge_traits::storage::SecureStore;
use tracing::{debug, warn};

use crate::error::{AuthError, Result};
use crate::types::ProviderKind;

/// A secret the vault knows how to store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKey {
    /// Per-provider OAuth or session token.
    Provider(ProviderKind),
    /// API key for the poem-generation backend.
    GenerationService,
}

impl TokenKey {
    /// All keys the vault may ever write. The sign-out wipe iterates this
    /// set rather than clearing the whole store.
    pub const ALL: [TokenKey; 5] = [
        TokenKey::Provider(ProviderKind::Password),
        TokenKey::Provider(ProviderKind::Google),
        TokenKey::Provider(ProviderKind::GitHub),
        TokenKey::Provider(ProviderKind::Anonymous),
        TokenKey::GenerationService,
    ];

    fn storage_key(&self) -> String {
        match self {
            TokenKey::Provider(kind) => format!("oauth_token:{}", kind.as_str()),
            TokenKey::GenerationService => "oauth_token:openai".to_string(),
        }
    }
}

/// Stores and retrieves auth secrets through the platform [`SecureStore`].
///
/// Reads degrade: a backend failure or corrupted record is logged and
/// surfaced as `None` so a broken keychain entry can never lock the user
/// out of a fresh sign-in. Writes and deletes propagate their errors.
#[derive(Clone)]
pub struct SecureTokenVault {
    store: Arc<dyn SecureStore>,
}

impl SecureTokenVault {
    pub fn new(store: Arc<dyn SecureStore>) -> Self {
        Self { store }
    }

    /// Persist a secret under `key`, replacing any previous value.
    pub async fn write(&self, key: TokenKey, secret: &str) -> Result<()> {
        let storage_key = key.storage_key();
        self.store
            .set_secret(&storage_key, secret.as_bytes())
            .await
            .map_err(|e| AuthError::Vault(format!("failed to store {}: {}", storage_key, e)))?;
        debug!(key = %storage_key, "Stored secret");
        Ok(())
    }

    /// Fetch a secret, or `None` when absent or unreadable.
    pub async fn read(&self, key: TokenKey) -> Option<String> {
        let storage_key = key.storage_key();
        let bytes = match self.store.get_secret(&storage_key).await {
            Ok(Some(bytes)) => bytes,
            Ok(None) => return None,
            Err(e) => {
                warn!(key = %storage_key, error = %e, "Secure store read failed, treating as absent");
                return None;
            }
        };
        match String::from_utf8(bytes) {
            Ok(secret) => Some(secret),
            Err(_) => {
                warn!(key = %storage_key, "Corrupted secret record, deleting");
                if let Err(e) = self.store.delete_secret(&storage_key).await {
                    warn!(key = %storage_key, error = %e, "Failed to delete corrupted record");
                }
                None
            }
        }
    }

    /// Remove one secret. Deleting an absent key is not an error.
    pub async fn delete(&self, key: TokenKey) -> Result<()> {
        let storage_key = key.storage_key();
        self.store
            .delete_secret(&storage_key)
            .await
            .map_err(|e| AuthError::Vault(format!("failed to delete {}: {}", storage_key, e)))?;
        debug!(key = %storage_key, "Deleted secret");
        Ok(())
    }

    /// Delete every key the vault owns, continuing past individual
    /// failures. Returns the count of keys that could not be removed.
    pub async fn delete_known(&self) -> usize {
        let mut failed = 0;
        for key in TokenKey::ALL {
            if let Err(e) = self.delete(key).await {
                warn!(error = %e, "Wipe could not delete a vault key");
                failed += 1;
            }
        }
        failed
    }
}
