//! Session manager: the single owner of the active session.
//!
//! All mutations of auth state go through this type. The current session is
//! observed through a `watch` channel that replays the latest value to new
//! subscribers; transition notifications go out on the shared [`EventBus`].
//!
//! Exactly one lifecycle operation may run at a time. The guard is checked
//! synchronously at the top of each operation, so a second caller is
//! rejected with [`AuthError::OperationInProgress`] before any provider
//! traffic happens.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use bridge_traits::identity::{ProviderIdentity, ProviderResponse};
use bridge_traits::remote::EntitlementStore;
use bridge_traits::time::Clock;
use core_runtime::config::CoreConfig;
use core_runtime::events::{AuthEvent, CoreEvent, EventBus};
use tokio::sync::{watch, Mutex};
use tracing::{debug, info, instrument, warn};

use crate::error::{AuthError, Result};
use crate::flow::OAuthFlowSelector;
use crate::lifecycle::{AccountLifecycleCoordinator, WipeReport};
use crate::provider::{CredentialAdapter, ProviderRegistry};
use crate::types::{
    AuthOutcome, AuthPhase, PlatformKind, ProviderKind, Session, SignInOutcome, SignInParams,
};
use crate::vault::{SecureTokenVault, TokenKey};

/// Owns the session state machine and the watch channel observers read.
pub struct AuthSessionManager {
    adapter: Arc<CredentialAdapter>,
    flow: OAuthFlowSelector,
    lifecycle: AccountLifecycleCoordinator,
    vault: SecureTokenVault,
    entitlements: Arc<dyn EntitlementStore>,
    clock: Arc<dyn Clock>,
    events: EventBus,
    session_tx: watch::Sender<Option<Session>>,
    guard: Mutex<()>,
    // True only while a sign-in (or redirect completion) is in flight;
    // other lifecycle operations hold the guard without entering
    // `Authenticating`.
    signing_in: AtomicBool,
}

/// Raises the sign-in flag for a scope, lowering it on drop so error
/// paths cannot leave the phase stuck at `Authenticating`.
struct SignInFlag<'a>(&'a AtomicBool);

impl<'a> SignInFlag<'a> {
    fn raise(flag: &'a AtomicBool) -> Self {
        flag.store(true, Ordering::SeqCst);
        Self(flag)
    }
}

impl Drop for SignInFlag<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

impl AuthSessionManager {
    /// Assemble the manager from the composition-root config and the
    /// host's provider registry.
    pub fn new(
        config: &CoreConfig,
        registry: ProviderRegistry,
        platform: PlatformKind,
        events: EventBus,
    ) -> Self {
        let adapter = Arc::new(CredentialAdapter::new(registry));
        let vault = SecureTokenVault::new(config.secure_store.clone());
        let lifecycle = AccountLifecycleCoordinator::new(
            adapter.clone(),
            vault.clone(),
            config.settings_store.clone(),
        );
        let (session_tx, _) = watch::channel(None);

        Self {
            adapter,
            flow: OAuthFlowSelector::new(platform),
            lifecycle,
            vault,
            entitlements: config.entitlements.clone(),
            clock: config.clock.clone(),
            events,
            session_tx,
            guard: Mutex::new(()),
            signing_in: AtomicBool::new(false),
        }
    }

    /// Observe the current session. The receiver immediately holds the
    /// latest value; `changed().await` wakes on every transition.
    pub fn subscribe(&self) -> watch::Receiver<Option<Session>> {
        self.session_tx.subscribe()
    }

    /// Snapshot of the current session.
    pub fn current_session(&self) -> Option<Session> {
        self.session_tx.borrow().clone()
    }

    /// Current phase of the sign-in state machine.
    ///
    /// `Authenticating` is reported only while a sign-in is actually in
    /// flight; sign-out, conversion, and deletion keep the phase derived
    /// from the session they operate on.
    pub fn phase(&self) -> AuthPhase {
        if self.signing_in.load(Ordering::SeqCst) {
            return AuthPhase::Authenticating;
        }
        if self.session_tx.borrow().is_some() {
            AuthPhase::Authenticated
        } else {
            AuthPhase::Idle
        }
    }

    /// Whether any lifecycle operation currently holds the guard.
    pub fn is_busy(&self) -> bool {
        self.guard.try_lock().is_err()
    }

    /// Run a sign-in attempt.
    ///
    /// Rejects synchronously with [`AuthError::OperationInProgress`] while
    /// another lifecycle operation holds the guard. A `RedirectPending`
    /// outcome leaves the session unchanged; the host completes the flow
    /// through [`complete_redirect`](Self::complete_redirect) on the
    /// return trip.
    #[instrument(skip(self, params))]
    pub async fn sign_in(&self, params: SignInParams) -> Result<SignInOutcome> {
        let _held = self
            .guard
            .try_lock()
            .map_err(|_| AuthError::OperationInProgress)?;
        let _in_flight = SignInFlag::raise(&self.signing_in);

        let kind = match &params {
            SignInParams::Password { .. } => ProviderKind::Password,
            SignInParams::OAuth { provider } => *provider,
            SignInParams::Anonymous => ProviderKind::Anonymous,
        };
        self.events
            .emit(CoreEvent::Auth(AuthEvent::SigningIn {
                provider: kind.as_str().to_string(),
            }))
            .ok();

        let result = self.run_sign_in(params).await;
        match &result {
            Ok(SignInOutcome::SignedIn(session)) => {
                info!(user_id = %session.user_id, provider = %session.provider, "Signed in");
                self.events
                    .emit(CoreEvent::Auth(AuthEvent::SignedIn {
                        user_id: session.user_id.to_string(),
                        provider: session.provider.as_str().to_string(),
                        is_guest: session.is_guest,
                    }))
                    .ok();
            }
            Ok(SignInOutcome::RedirectPending) => {
                debug!(provider = %kind, "Redirect launched, awaiting return trip");
            }
            Err(e) => {
                self.events
                    .emit(CoreEvent::Auth(AuthEvent::AuthFailed {
                        provider: kind.as_str().to_string(),
                        message: e.to_string(),
                        recoverable: e.is_recoverable(),
                    }))
                    .ok();
            }
        }
        result
    }

    async fn run_sign_in(&self, params: SignInParams) -> Result<SignInOutcome> {
        let outcome = match params {
            SignInParams::Password { email, password } => {
                self.adapter.sign_in_password(&email, &password).await?
            }
            SignInParams::Anonymous => self.adapter.sign_in_anonymous().await?,
            SignInParams::OAuth { provider } => {
                if !provider.is_oauth() {
                    return Err(AuthError::InvalidCredential(format!(
                        "{} is not an OAuth provider",
                        provider
                    )));
                }
                let sdk = self.adapter.resolve(provider)?;
                match self.flow.run(provider, sdk.as_ref()).await? {
                    ProviderResponse::RedirectPending => {
                        return Ok(SignInOutcome::RedirectPending)
                    }
                    ProviderResponse::Completed(identity) => {
                        AuthOutcome::from_identity(provider, identity)
                    }
                }
            }
        };
        let session = self.establish_session(outcome).await?;
        Ok(SignInOutcome::SignedIn(session))
    }

    /// Complete an OAuth flow that previously returned `RedirectPending`.
    ///
    /// The host calls this with the identity the provider SDK resumed on
    /// the post-redirect page load.
    #[instrument(skip(self, identity), fields(provider = %provider))]
    pub async fn complete_redirect(
        &self,
        provider: ProviderKind,
        identity: ProviderIdentity,
    ) -> Result<Session> {
        let _held = self
            .guard
            .try_lock()
            .map_err(|_| AuthError::OperationInProgress)?;
        let _in_flight = SignInFlag::raise(&self.signing_in);

        let session = self
            .establish_session(AuthOutcome::from_identity(provider, identity))
            .await?;
        info!(user_id = %session.user_id, provider = %provider, "Redirect sign-in completed");
        self.events
            .emit(CoreEvent::Auth(AuthEvent::SignedIn {
                user_id: session.user_id.to_string(),
                provider: provider.as_str().to_string(),
                is_guest: session.is_guest,
            }))
            .ok();
        Ok(session)
    }

    async fn establish_session(&self, outcome: AuthOutcome) -> Result<Session> {
        let AuthOutcome {
            credential,
            profile,
        } = outcome;

        if let Some(token) = &credential.access_token {
            self.vault
                .write(TokenKey::Provider(credential.provider), token.secret())
                .await?;
        }

        // The free tier is the safe default when the entitlement read fails.
        let is_pro = match self
            .entitlements
            .is_pro(credential.provider_user_id.as_str())
            .await
        {
            Ok(is_pro) => is_pro,
            Err(e) => {
                warn!(error = %e, "Entitlement lookup failed, defaulting to free tier");
                false
            }
        };

        let session = Session {
            is_guest: credential.provider == ProviderKind::Anonymous,
            user_id: credential.provider_user_id,
            provider: credential.provider,
            is_pro,
            email_verified: profile.email_verified,
            email: profile.email,
            display_name: profile.display_name,
            created_at: self.clock.now(),
        };

        self.lifecycle.profile_cache().save(&session).await;
        self.session_tx.send_replace(Some(session.clone()));
        Ok(session)
    }

    /// Restore the session mirrored in the settings store, if any.
    ///
    /// Called once at startup, before the UI renders. The cached Pro flag
    /// is refreshed from the entitlement store when reachable.
    #[instrument(skip(self))]
    pub async fn restore(&self) -> Option<Session> {
        let _held = self.guard.try_lock().ok()?;

        let mut session = self.lifecycle.profile_cache().load().await?;
        match self.entitlements.is_pro(session.user_id.as_str()).await {
            Ok(is_pro) => session.is_pro = is_pro,
            Err(e) => {
                warn!(error = %e, "Entitlement refresh failed, keeping cached Pro flag");
            }
        }

        info!(user_id = %session.user_id, "Restored session from local mirror");
        self.session_tx.send_replace(Some(session.clone()));
        Some(session)
    }

    /// Sign out and wipe local state.
    ///
    /// Idempotent: with no active session this is a no-op. The wipe is
    /// best-effort; the session is cleared even when individual wipe steps
    /// fail, and the report says what failed.
    #[instrument(skip(self))]
    pub async fn sign_out(&self) -> Result<WipeReport> {
        let _held = self
            .guard
            .try_lock()
            .map_err(|_| AuthError::OperationInProgress)?;

        let Some(session) = self.session_tx.borrow().clone() else {
            return Ok(WipeReport::default());
        };

        if let Err(e) = self.adapter.revoke(session.provider).await {
            warn!(error = %e, "Provider-side revoke failed, continuing sign-out");
        }
        let report = self.lifecycle.sign_out_wipe(&session).await;
        self.session_tx.send_replace(None);
        self.events
            .emit(CoreEvent::Auth(AuthEvent::SignedOut {
                user_id: session.user_id.to_string(),
            }))
            .ok();
        Ok(report)
    }

    /// Upgrade the active guest session to a permanent account in place.
    #[instrument(skip_all)]
    pub async fn convert_to_permanent(&self, email: &str, password: &str) -> Result<Session> {
        let _held = self
            .guard
            .try_lock()
            .map_err(|_| AuthError::OperationInProgress)?;

        let session = self
            .session_tx
            .borrow()
            .clone()
            .ok_or(AuthError::NoActiveSession)?;

        let converted = self
            .lifecycle
            .convert_guest_to_permanent(&session, email, password)
            .await?;
        self.session_tx.send_replace(Some(converted.clone()));
        self.events
            .emit(CoreEvent::Auth(AuthEvent::GuestConverted {
                user_id: converted.user_id.to_string(),
            }))
            .ok();
        Ok(converted)
    }

    /// Permanently delete the active account.
    ///
    /// Remote deletion happens first; a failure there leaves the session
    /// and all local state untouched so the user can retry.
    #[instrument(skip(self))]
    pub async fn delete_account(&self) -> Result<WipeReport> {
        let _held = self
            .guard
            .try_lock()
            .map_err(|_| AuthError::OperationInProgress)?;

        let session = self
            .session_tx
            .borrow()
            .clone()
            .ok_or(AuthError::NoActiveSession)?;

        let report = self.lifecycle.delete_account(&session).await?;
        self.session_tx.send_replace(None);
        self.events
            .emit(CoreEvent::Auth(AuthEvent::AccountDeleted {
                user_id: session.user_id.to_string(),
            }))
            .ok();
        Ok(report)
    }
}
