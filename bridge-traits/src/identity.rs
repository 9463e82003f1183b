//! Identity Provider Abstractions
//!
//! Contract between the auth core and the host's identity provider SDKs
//! (password, Google OAuth, GitHub OAuth, anonymous). The core never speaks
//! a provider protocol itself; it only adapts the result shape and error
//! surface defined here.

use async_trait::async_trait;
use std::fmt;

/// How an OAuth consent screen is presented to the user.
///
/// The flow selector in the auth core picks a strategy per platform and
/// provider; the host SDK executes it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FlowStrategy {
    /// In-app popup window (web primary)
    InAppPopup,
    /// Full-page redirect away from the app (web fallback)
    FullRedirect,
    /// Native provider SDK flow (mobile/desktop primary)
    NativeFlow,
    /// Native flow with forced consent parameters (native fallback)
    NativeForcedConsent,
}

impl fmt::Display for FlowStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FlowStrategy::InAppPopup => "in_app_popup",
            FlowStrategy::FullRedirect => "full_redirect",
            FlowStrategy::NativeFlow => "native_flow",
            FlowStrategy::NativeForcedConsent => "native_forced_consent",
        };
        write!(f, "{}", s)
    }
}

/// What the caller is asking the provider SDK to do.
#[derive(Debug, Clone)]
pub enum AuthIntent {
    /// Email/password sign-in or sign-up
    Password { email: String, password: String },
    /// Federated OAuth sign-in using the given presentation strategy
    OAuth { strategy: FlowStrategy },
    /// Anonymous guest sign-in
    Anonymous,
}

/// Outcome of a provider authenticate call that did not fail.
///
/// A full-page redirect is a legitimate outcome, not an error: the app is
/// about to navigate away and the identity arrives on the return trip.
#[derive(Debug, Clone)]
pub enum ProviderResponse {
    /// The SDK completed the flow and produced an identity
    Completed(ProviderIdentity),
    /// A redirect flow was launched; no identity is available yet
    RedirectPending,
}

/// Normalized proof of identity returned by a provider SDK.
#[derive(Debug, Clone)]
pub struct ProviderIdentity {
    /// Stable user identifier assigned by the identity backend
    pub provider_user_id: String,
    /// Verified or unverified account email, when known
    pub email: Option<String>,
    /// Display name, when the provider supplies one
    pub display_name: Option<String>,
    /// Whether the email address has been verified
    pub email_verified: bool,
    /// Provider access token, for OAuth providers
    pub provider_token: Option<String>,
    /// True when this authenticate call created the account
    pub is_new_user: bool,
}

/// Normalized error surface of a provider SDK.
///
/// `MissingSessionState` is the environment-failure signature: the SDK
/// could not read or write its transient sign-in state (storage blocked or
/// partitioned). It is the only failure the core's flow selector retries.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ProviderFailure {
    #[error("invalid credential: {0}")]
    InvalidCredential(String),

    #[error("network failure: {0}")]
    Network(String),

    #[error("user cancelled the sign-in")]
    Cancelled,

    #[error("transient sign-in state missing or corrupted: {0}")]
    MissingSessionState(String),

    #[error("account already exists under a different provider")]
    AccountConflict { email: Option<String> },

    #[error("provider SDK error: {0}")]
    Sdk(String),
}

/// Uniform interface over one identity provider SDK.
///
/// The host registers one implementation per provider kind with the
/// composition root. All methods are pass-throughs to the platform SDK;
/// the core owns retry/fallback policy and session state.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Run the provider's authenticate call.
    ///
    /// Cancellation is externally driven (the user dismisses the
    /// provider's UI) and reported as `ProviderFailure::Cancelled`.
    async fn authenticate(
        &self,
        intent: AuthIntent,
    ) -> std::result::Result<ProviderResponse, ProviderFailure>;

    /// Link an email/password credential to an existing (anonymous)
    /// account, upgrading it in place. The returned identity must keep the
    /// same `provider_user_id`.
    async fn link_password(
        &self,
        provider_user_id: &str,
        email: &str,
        password: &str,
    ) -> std::result::Result<ProviderIdentity, ProviderFailure>;

    /// Revoke the provider-side session, if the SDK holds one.
    async fn revoke(&self) -> std::result::Result<(), ProviderFailure> {
        Ok(())
    }

    /// Permanently delete the account on the identity backend.
    async fn delete_account(
        &self,
        provider_user_id: &str,
    ) -> std::result::Result<(), ProviderFailure>;
}
