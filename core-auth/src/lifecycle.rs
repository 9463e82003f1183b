//! Account lifecycle: guest conversion, sign-out wipe, account deletion.
//!
//! Wipe ordering is fixed: secrets first, cached profile fields second,
//! usage counters last. Sign-out is best-effort (a failing step is logged
//! and the remaining steps still run); account deletion is remote-first
//! (nothing local is touched until the identity backend confirms).

use std::sync::Arc;

use bridge_traits::storage::SettingsStore;
use tracing::{info, warn};

use crate::error::{AuthError, Result};
use crate::provider::CredentialAdapter;
use crate::types::{ProviderKind, Session, UserId};
use crate::vault::SecureTokenVault;

const KEY_USER_ID: &str = "profile:user_id";
const KEY_PROVIDER: &str = "profile:provider";
const KEY_IS_GUEST: &str = "profile:is_guest";
const KEY_IS_PRO: &str = "profile:is_pro";
const KEY_EMAIL: &str = "profile:email";
const KEY_DISPLAY_NAME: &str = "profile:display_name";
const KEY_EMAIL_VERIFIED: &str = "profile:email_verified";
const KEY_CREATED_AT: &str = "profile:created_at";

const PROFILE_KEYS: [&str; 8] = [
    KEY_USER_ID,
    KEY_PROVIDER,
    KEY_IS_GUEST,
    KEY_IS_PRO,
    KEY_EMAIL,
    KEY_DISPLAY_NAME,
    KEY_EMAIL_VERIFIED,
    KEY_CREATED_AT,
];

fn quota_key(user_id: &UserId) -> String {
    format!("quota:{}", user_id)
}

/// Session profile fields mirrored into the settings store so a session
/// survives an app restart without a network round trip.
///
/// The mirror is advisory: persistence failures are logged, never fatal,
/// and an unreadable mirror restores to no session.
pub(crate) struct ProfileCache {
    settings: Arc<dyn SettingsStore>,
}

impl ProfileCache {
    pub(crate) fn new(settings: Arc<dyn SettingsStore>) -> Self {
        Self { settings }
    }

    pub(crate) async fn save(&self, session: &Session) {
        let result: std::result::Result<(), bridge_traits::error::BridgeError> = async {
            self.settings
                .set_string(KEY_USER_ID, session.user_id.as_str())
                .await?;
            self.settings
                .set_string(KEY_PROVIDER, session.provider.as_str())
                .await?;
            self.settings.set_bool(KEY_IS_GUEST, session.is_guest).await?;
            self.settings.set_bool(KEY_IS_PRO, session.is_pro).await?;
            self.settings
                .set_bool(KEY_EMAIL_VERIFIED, session.email_verified)
                .await?;
            self.settings
                .set_string(KEY_CREATED_AT, &session.created_at.to_rfc3339())
                .await?;
            match &session.email {
                Some(email) => self.settings.set_string(KEY_EMAIL, email).await?,
                None => self.settings.delete(KEY_EMAIL).await?,
            }
            match &session.display_name {
                Some(name) => self.settings.set_string(KEY_DISPLAY_NAME, name).await?,
                None => self.settings.delete(KEY_DISPLAY_NAME).await?,
            }
            Ok(())
        }
        .await;
        if let Err(e) = result {
            warn!(error = %e, "Failed to mirror session profile to settings");
        }
    }

    pub(crate) async fn load(&self) -> Option<Session> {
        let user_id = self.settings.get_string(KEY_USER_ID).await.ok().flatten()?;
        let provider = self
            .settings
            .get_string(KEY_PROVIDER)
            .await
            .ok()
            .flatten()
            .as_deref()
            .and_then(ProviderKind::parse)?;
        let created_at = self
            .settings
            .get_string(KEY_CREATED_AT)
            .await
            .ok()
            .flatten()
            .and_then(|s| chrono::DateTime::parse_from_rfc3339(&s).ok())
            .map(|dt| dt.with_timezone(&chrono::Utc))?;

        Some(Session {
            user_id: UserId::new(user_id),
            provider,
            is_guest: self
                .settings
                .get_bool(KEY_IS_GUEST)
                .await
                .ok()
                .flatten()
                .unwrap_or(provider == ProviderKind::Anonymous),
            is_pro: self
                .settings
                .get_bool(KEY_IS_PRO)
                .await
                .ok()
                .flatten()
                .unwrap_or(false),
            email_verified: self
                .settings
                .get_bool(KEY_EMAIL_VERIFIED)
                .await
                .ok()
                .flatten()
                .unwrap_or(false),
            email: self.settings.get_string(KEY_EMAIL).await.ok().flatten(),
            display_name: self
                .settings
                .get_string(KEY_DISPLAY_NAME)
                .await
                .ok()
                .flatten(),
            created_at,
        })
    }

    /// Delete every mirrored field. Returns the count of keys that could
    /// not be removed.
    pub(crate) async fn clear(&self) -> usize {
        let mut failed = 0;
        for key in PROFILE_KEYS {
            if let Err(e) = self.settings.delete(key).await {
                warn!(key, error = %e, "Failed to delete mirrored profile field");
                failed += 1;
            }
        }
        failed
    }
}

/// Outcome of a best-effort local wipe.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct WipeReport {
    /// Vault keys that could not be deleted
    pub vault_failures: usize,
    /// Settings keys that could not be deleted
    pub settings_failures: usize,
}

impl WipeReport {
    pub fn is_clean(&self) -> bool {
        self.vault_failures == 0 && self.settings_failures == 0
    }
}

/// Drives account state changes that go beyond a plain sign-in.
pub struct AccountLifecycleCoordinator {
    adapter: Arc<CredentialAdapter>,
    vault: SecureTokenVault,
    settings: Arc<dyn SettingsStore>,
}

impl AccountLifecycleCoordinator {
    pub fn new(
        adapter: Arc<CredentialAdapter>,
        vault: SecureTokenVault,
        settings: Arc<dyn SettingsStore>,
    ) -> Self {
        Self {
            adapter,
            vault,
            settings,
        }
    }

    pub(crate) fn profile_cache(&self) -> ProfileCache {
        ProfileCache::new(self.settings.clone())
    }

    /// Upgrade a guest session to a permanent email/password account.
    ///
    /// The identity backend links the credential in place, so the user ID
    /// is unchanged and everything keyed to it (poems, counters) survives.
    /// A backend that hands back a different ID is a contract violation and
    /// the conversion is rejected.
    pub async fn convert_guest_to_permanent(
        &self,
        session: &Session,
        email: &str,
        password: &str,
    ) -> Result<Session> {
        if !session.is_guest {
            return Err(AuthError::AccountConversion(
                "active session is not a guest account".to_string(),
            ));
        }

        let outcome = self
            .adapter
            .link_password(&session.user_id, email, password)
            .await
            .map_err(|e| match e {
                // Conflicts keep their own variant so the UI can offer
                // sign-in with the existing account instead.
                AuthError::ProviderConflict { email } => AuthError::ProviderConflict { email },
                AuthError::InvalidCredential(reason) => AuthError::InvalidCredential(reason),
                other => AuthError::AccountConversion(other.to_string()),
            })?;

        if outcome.credential.provider_user_id != session.user_id {
            return Err(AuthError::AccountConversion(format!(
                "identity backend changed the user ID during linking (was {}, got {})",
                session.user_id, outcome.credential.provider_user_id
            )));
        }

        let converted = Session {
            user_id: session.user_id.clone(),
            provider: ProviderKind::Password,
            is_guest: false,
            is_pro: session.is_pro,
            email_verified: outcome.profile.email_verified,
            email: outcome.profile.email,
            display_name: outcome.profile.display_name.or_else(|| session.display_name.clone()),
            created_at: session.created_at,
        };

        if let Some(token) = &outcome.credential.access_token {
            self.vault
                .write(
                    crate::vault::TokenKey::Provider(ProviderKind::Password),
                    token.secret(),
                )
                .await?;
        }
        self.profile_cache().save(&converted).await;

        info!(user_id = %converted.user_id, "Guest account upgraded in place");
        Ok(converted)
    }

    /// Best-effort local wipe for sign-out.
    ///
    /// Order: vault secrets, mirrored profile fields, the user's usage
    /// counter, then the locally cached Pro flag (already covered by the
    /// profile keys). Failures are logged and the remaining steps run.
    pub async fn sign_out_wipe(&self, session: &Session) -> WipeReport {
        let mut report = WipeReport {
            vault_failures: self.vault.delete_known().await,
            settings_failures: 0,
        };

        report.settings_failures += self.profile_cache().clear().await;

        if let Err(e) = self.settings.delete(&quota_key(&session.user_id)).await {
            warn!(error = %e, "Failed to delete usage counter during wipe");
            report.settings_failures += 1;
        }

        if report.is_clean() {
            info!(user_id = %session.user_id, "Local wipe complete");
        } else {
            warn!(
                user_id = %session.user_id,
                vault_failures = report.vault_failures,
                settings_failures = report.settings_failures,
                "Local wipe finished with failures"
            );
        }
        report
    }

    /// Permanently delete the account.
    ///
    /// Remote deletion must succeed before any local state is touched, so
    /// a network failure leaves the session fully intact and retryable.
    pub async fn delete_account(&self, session: &Session) -> Result<WipeReport> {
        self.adapter
            .delete_account(session.provider, &session.user_id)
            .await?;
        info!(user_id = %session.user_id, "Remote account deletion confirmed");
        Ok(self.sign_out_wipe(session).await)
    }
}
