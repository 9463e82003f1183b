//! Provider registry and credential adaptation.
//!
//! The host builds a [`ProviderRegistry`] at startup, one entry per
//! [`ProviderKind`] it supports. Dispatch is by enum variant; an
//! unregistered kind is a configuration error surfaced as
//! [`AuthError::ProviderUnavailable`], never a silent string miss.

use std::collections::HashMap;
use std::sync::Arc;

use bridge_traits::identity::{AuthIntent, IdentityProvider, ProviderResponse};
use tracing::debug;

use crate::error::{AuthError, Result};
use crate::types::{AuthOutcome, ProviderKind, UserId};

/// Map of provider kinds to their host SDK implementations.
#[derive(Default)]
pub struct ProviderRegistry {
    providers: HashMap<ProviderKind, Arc<dyn IdentityProvider>>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an implementation for a provider kind, replacing any
    /// previous registration.
    pub fn register(mut self, kind: ProviderKind, provider: Arc<dyn IdentityProvider>) -> Self {
        self.providers.insert(kind, provider);
        self
    }

    pub fn get(&self, kind: ProviderKind) -> Option<Arc<dyn IdentityProvider>> {
        self.providers.get(&kind).cloned()
    }

    /// Kinds with a registered implementation.
    pub fn registered(&self) -> Vec<ProviderKind> {
        let mut kinds: Vec<_> = self.providers.keys().copied().collect();
        kinds.sort_by_key(|k| k.as_str());
        kinds
    }
}

/// Adapts the provider SDK surface to the core's credential types.
///
/// Each call resolves the provider, forwards the intent, and normalizes
/// both the identity shape and the error taxonomy. OAuth presentation
/// policy lives in the flow selector, not here.
pub struct CredentialAdapter {
    registry: ProviderRegistry,
}

impl CredentialAdapter {
    pub fn new(registry: ProviderRegistry) -> Self {
        Self { registry }
    }

    /// Look up the SDK implementation for a provider kind.
    pub fn resolve(&self, kind: ProviderKind) -> Result<Arc<dyn IdentityProvider>> {
        self.registry
            .get(kind)
            .ok_or(AuthError::ProviderUnavailable(kind))
    }

    /// Email/password sign-in.
    pub async fn sign_in_password(&self, email: &str, password: &str) -> Result<AuthOutcome> {
        if email.trim().is_empty() || password.is_empty() {
            return Err(AuthError::InvalidCredential(
                "email and password must not be empty".to_string(),
            ));
        }
        let provider = self.resolve(ProviderKind::Password)?;
        debug!(provider = %ProviderKind::Password, "Forwarding password sign-in");
        let response = provider
            .authenticate(AuthIntent::Password {
                email: email.to_string(),
                password: password.to_string(),
            })
            .await
            .map_err(AuthError::from_provider)?;
        Self::expect_completed(ProviderKind::Password, response)
    }

    /// Anonymous guest sign-in.
    pub async fn sign_in_anonymous(&self) -> Result<AuthOutcome> {
        let provider = self.resolve(ProviderKind::Anonymous)?;
        debug!(provider = %ProviderKind::Anonymous, "Forwarding anonymous sign-in");
        let response = provider
            .authenticate(AuthIntent::Anonymous)
            .await
            .map_err(AuthError::from_provider)?;
        Self::expect_completed(ProviderKind::Anonymous, response)
    }

    /// Link an email/password credential onto an existing account,
    /// upgrading it in place. The identity backend keeps the user ID.
    pub async fn link_password(
        &self,
        provider_user_id: &UserId,
        email: &str,
        password: &str,
    ) -> Result<AuthOutcome> {
        if email.trim().is_empty() || password.is_empty() {
            return Err(AuthError::InvalidCredential(
                "email and password must not be empty".to_string(),
            ));
        }
        let provider = self.resolve(ProviderKind::Password)?;
        let identity = provider
            .link_password(provider_user_id.as_str(), email, password)
            .await
            .map_err(AuthError::from_provider)?;
        Ok(AuthOutcome::from_identity(ProviderKind::Password, identity))
    }

    /// Revoke the provider-side session, if the SDK holds one.
    pub async fn revoke(&self, kind: ProviderKind) -> Result<()> {
        let provider = self.resolve(kind)?;
        provider.revoke().await.map_err(AuthError::from_provider)
    }

    /// Permanently delete the account on the identity backend.
    pub async fn delete_account(&self, kind: ProviderKind, user_id: &UserId) -> Result<()> {
        let provider = self.resolve(kind)?;
        provider
            .delete_account(user_id.as_str())
            .await
            .map_err(AuthError::from_provider)
    }

    fn expect_completed(kind: ProviderKind, response: ProviderResponse) -> Result<AuthOutcome> {
        match response {
            ProviderResponse::Completed(identity) => {
                Ok(AuthOutcome::from_identity(kind, identity))
            }
            // Only OAuth strategies may redirect; a redirect here means the
            // host wired the wrong SDK behind this kind.
            ProviderResponse::RedirectPending => Err(AuthError::Provider(format!(
                "{} flow unexpectedly launched a redirect",
                kind
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use bridge_traits::identity::{ProviderFailure, ProviderIdentity};

    struct StubProvider {
        identity: ProviderIdentity,
    }

    impl StubProvider {
        fn new(user_id: &str) -> Self {
            Self {
                identity: ProviderIdentity {
                    provider_user_id: user_id.to_string(),
                    email: Some("dev@example.com".to_string()),
                    display_name: None,
                    email_verified: false,
                    provider_token: None,
                    is_new_user: true,
                },
            }
        }
    }

    #[async_trait]
    impl IdentityProvider for StubProvider {
        async fn authenticate(
            &self,
            _intent: AuthIntent,
        ) -> std::result::Result<ProviderResponse, ProviderFailure> {
            Ok(ProviderResponse::Completed(self.identity.clone()))
        }

        async fn link_password(
            &self,
            provider_user_id: &str,
            email: &str,
            _password: &str,
        ) -> std::result::Result<ProviderIdentity, ProviderFailure> {
            let mut identity = self.identity.clone();
            identity.provider_user_id = provider_user_id.to_string();
            identity.email = Some(email.to_string());
            identity.is_new_user = false;
            Ok(identity)
        }

        async fn delete_account(
            &self,
            _provider_user_id: &str,
        ) -> std::result::Result<(), ProviderFailure> {
            Ok(())
        }
    }

    fn adapter_with_password() -> CredentialAdapter {
        let registry = ProviderRegistry::new()
            .register(ProviderKind::Password, Arc::new(StubProvider::new("uid-1")));
        CredentialAdapter::new(registry)
    }

    #[tokio::test]
    async fn test_unregistered_provider_is_config_error() {
        let adapter = adapter_with_password();
        let err = adapter.sign_in_anonymous().await.unwrap_err();
        assert!(matches!(
            err,
            AuthError::ProviderUnavailable(ProviderKind::Anonymous)
        ));
    }

    #[tokio::test]
    async fn test_password_sign_in_normalizes_identity() {
        let adapter = adapter_with_password();
        let outcome = adapter
            .sign_in_password("dev@example.com", "hunter2")
            .await
            .unwrap();
        assert_eq!(outcome.credential.provider, ProviderKind::Password);
        assert_eq!(outcome.credential.provider_user_id.as_str(), "uid-1");
        assert!(outcome.credential.is_new_account);
    }

    #[tokio::test]
    async fn test_empty_credentials_rejected_locally() {
        let adapter = adapter_with_password();
        assert!(matches!(
            adapter.sign_in_password("", "hunter2").await.unwrap_err(),
            AuthError::InvalidCredential(_)
        ));
        assert!(matches!(
            adapter
                .sign_in_password("dev@example.com", "")
                .await
                .unwrap_err(),
            AuthError::InvalidCredential(_)
        ));
    }

    #[tokio::test]
    async fn test_link_password_keeps_user_id() {
        let adapter = adapter_with_password();
        let user_id = UserId::new("guest-7");
        let outcome = adapter
            .link_password(&user_id, "dev@example.com", "hunter2")
            .await
            .unwrap();
        assert_eq!(outcome.credential.provider_user_id, user_id);
        assert!(!outcome.credential.is_new_account);
    }
}
