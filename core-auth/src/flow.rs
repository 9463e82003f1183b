//! OAuth presentation policy.
//!
//! Each platform has a primary presentation strategy and exactly one
//! fallback. The fallback fires only on the environment-failure signature
//! ([`ProviderFailure::MissingSessionState`]), runs sequentially after the
//! primary attempt, and is never itself retried. Every other failure, user
//! cancellation included, passes through untouched.

use bridge_traits::identity::{
    AuthIntent, FlowStrategy, IdentityProvider, ProviderFailure, ProviderResponse,
};
use tracing::{info, warn};

use crate::error::{AuthError, Result};
use crate::types::{PlatformKind, ProviderKind};

/// Picks and drives the OAuth presentation strategy for one sign-in.
#[derive(Debug, Clone, Copy)]
pub struct OAuthFlowSelector {
    platform: PlatformKind,
}

impl OAuthFlowSelector {
    pub fn new(platform: PlatformKind) -> Self {
        Self { platform }
    }

    pub fn platform(&self) -> PlatformKind {
        self.platform
    }

    /// Strategy tried first on this platform.
    pub fn primary_strategy(&self) -> FlowStrategy {
        match self.platform {
            PlatformKind::Web => FlowStrategy::InAppPopup,
            PlatformKind::Native => FlowStrategy::NativeFlow,
        }
    }

    /// Strategy tried after an environment failure of the primary.
    pub fn fallback_strategy(&self) -> FlowStrategy {
        match self.platform {
            PlatformKind::Web => FlowStrategy::FullRedirect,
            PlatformKind::Native => FlowStrategy::NativeForcedConsent,
        }
    }

    /// Run the OAuth flow against a provider SDK.
    ///
    /// Returns `RedirectPending` unchanged when a strategy launches a
    /// full-page redirect. When both the primary and the fallback fail for
    /// environment reasons, the result is a terminal
    /// [`AuthError::SessionStorageFailure`] carrying remediation text.
    pub async fn run(
        &self,
        kind: ProviderKind,
        provider: &dyn IdentityProvider,
    ) -> Result<ProviderResponse> {
        let primary = self.primary_strategy();
        match provider
            .authenticate(AuthIntent::OAuth { strategy: primary })
            .await
        {
            Ok(response) => Ok(response),
            Err(ProviderFailure::MissingSessionState(reason)) => {
                let fallback = self.fallback_strategy();
                warn!(
                    provider = %kind,
                    %primary,
                    %fallback,
                    %reason,
                    "Sign-in state unavailable, attempting fallback strategy"
                );
                match provider
                    .authenticate(AuthIntent::OAuth { strategy: fallback })
                    .await
                {
                    Ok(response) => {
                        info!(provider = %kind, %fallback, "Fallback strategy succeeded");
                        Ok(response)
                    }
                    Err(failure) => Err(AuthError::from_provider(failure)),
                }
            }
            Err(failure) => Err(AuthError::from_provider(failure)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use bridge_traits::identity::ProviderIdentity;
    use std::sync::Mutex;

    /// Scripted provider: pops the next result off a queue per call and
    /// records which strategy each call used.
    struct ScriptedProvider {
        script: Mutex<Vec<std::result::Result<ProviderResponse, ProviderFailure>>>,
        strategies: Mutex<Vec<FlowStrategy>>,
    }

    impl ScriptedProvider {
        fn new(script: Vec<std::result::Result<ProviderResponse, ProviderFailure>>) -> Self {
            let mut script = script;
            script.reverse();
            Self {
                script: Mutex::new(script),
                strategies: Mutex::new(Vec::new()),
            }
        }

        fn strategies(&self) -> Vec<FlowStrategy> {
            self.strategies.lock().unwrap().clone()
        }
    }

    fn identity() -> ProviderIdentity {
        ProviderIdentity {
            provider_user_id: "uid-1".to_string(),
            email: None,
            display_name: None,
            email_verified: false,
            provider_token: Some("token".to_string()),
            is_new_user: false,
        }
    }

    #[async_trait]
    impl IdentityProvider for ScriptedProvider {
        async fn authenticate(
            &self,
            intent: AuthIntent,
        ) -> std::result::Result<ProviderResponse, ProviderFailure> {
            if let AuthIntent::OAuth { strategy } = intent {
                self.strategies.lock().unwrap().push(strategy);
            }
            self.script
                .lock()
                .unwrap()
                .pop()
                .unwrap_or(Err(ProviderFailure::Sdk("script exhausted".to_string())))
        }

        async fn link_password(
            &self,
            _provider_user_id: &str,
            _email: &str,
            _password: &str,
        ) -> std::result::Result<ProviderIdentity, ProviderFailure> {
            unimplemented!("not exercised")
        }

        async fn delete_account(
            &self,
            _provider_user_id: &str,
        ) -> std::result::Result<(), ProviderFailure> {
            unimplemented!("not exercised")
        }
    }

    #[test]
    fn test_strategy_pairs_per_platform() {
        let web = OAuthFlowSelector::new(PlatformKind::Web);
        assert_eq!(web.primary_strategy(), FlowStrategy::InAppPopup);
        assert_eq!(web.fallback_strategy(), FlowStrategy::FullRedirect);

        let native = OAuthFlowSelector::new(PlatformKind::Native);
        assert_eq!(native.primary_strategy(), FlowStrategy::NativeFlow);
        assert_eq!(native.fallback_strategy(), FlowStrategy::NativeForcedConsent);
    }

    #[tokio::test]
    async fn test_primary_success_never_falls_back() {
        let provider = ScriptedProvider::new(vec![Ok(ProviderResponse::Completed(identity()))]);
        let selector = OAuthFlowSelector::new(PlatformKind::Web);

        let response = selector.run(ProviderKind::Google, &provider).await.unwrap();
        assert!(matches!(response, ProviderResponse::Completed(_)));
        assert_eq!(provider.strategies(), vec![FlowStrategy::InAppPopup]);
    }

    #[tokio::test]
    async fn test_environment_failure_triggers_exactly_one_fallback() {
        let provider = ScriptedProvider::new(vec![
            Err(ProviderFailure::MissingSessionState("blocked".to_string())),
            Ok(ProviderResponse::Completed(identity())),
        ]);
        let selector = OAuthFlowSelector::new(PlatformKind::Web);

        let response = selector.run(ProviderKind::GitHub, &provider).await.unwrap();
        assert!(matches!(response, ProviderResponse::Completed(_)));
        assert_eq!(
            provider.strategies(),
            vec![FlowStrategy::InAppPopup, FlowStrategy::FullRedirect]
        );
    }

    #[tokio::test]
    async fn test_double_environment_failure_is_terminal() {
        let provider = ScriptedProvider::new(vec![
            Err(ProviderFailure::MissingSessionState("blocked".to_string())),
            Err(ProviderFailure::MissingSessionState("still blocked".to_string())),
        ]);
        let selector = OAuthFlowSelector::new(PlatformKind::Native);

        let err = selector
            .run(ProviderKind::Google, &provider)
            .await
            .unwrap_err();
        match err {
            AuthError::SessionStorageFailure { remediation } => {
                assert!(!remediation.is_empty());
            }
            other => panic!("Expected SessionStorageFailure, got {:?}", other),
        }
        // Exactly two attempts: primary plus one fallback, no third try.
        assert_eq!(provider.strategies().len(), 2);
    }

    #[tokio::test]
    async fn test_cancellation_is_never_retried() {
        let provider = ScriptedProvider::new(vec![Err(ProviderFailure::Cancelled)]);
        let selector = OAuthFlowSelector::new(PlatformKind::Web);

        let err = selector
            .run(ProviderKind::Google, &provider)
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::Cancelled));
        assert_eq!(provider.strategies().len(), 1);
    }

    #[tokio::test]
    async fn test_fallback_cancellation_passes_through() {
        let provider = ScriptedProvider::new(vec![
            Err(ProviderFailure::MissingSessionState("blocked".to_string())),
            Err(ProviderFailure::Cancelled),
        ]);
        let selector = OAuthFlowSelector::new(PlatformKind::Native);

        let err = selector
            .run(ProviderKind::GitHub, &provider)
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::Cancelled));
    }

    #[tokio::test]
    async fn test_redirect_pending_propagates() {
        let provider = ScriptedProvider::new(vec![
            Err(ProviderFailure::MissingSessionState("blocked".to_string())),
            Ok(ProviderResponse::RedirectPending),
        ]);
        let selector = OAuthFlowSelector::new(PlatformKind::Web);

        let response = selector.run(ProviderKind::Google, &provider).await.unwrap();
        assert!(matches!(response, ProviderResponse::RedirectPending));
    }
}
