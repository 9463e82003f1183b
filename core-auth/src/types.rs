use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use bridge_traits::identity::ProviderIdentity;

/// Stable user identifier assigned by the identity backend.
///
/// The same ID survives a guest-to-permanent upgrade, so all locally cached
/// data (poems, counters) stays keyed to it across the conversion.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(String);

impl UserId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for UserId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Supported identity providers.
///
/// Matched exhaustively everywhere; there is no string-keyed provider
/// dispatch in the core.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProviderKind {
    /// Email/password credentials
    Password,
    /// Google OAuth federation
    Google,
    /// GitHub OAuth federation
    GitHub,
    /// Anonymous guest identity
    Anonymous,
}

impl ProviderKind {
    /// Human-readable display name for this provider.
    pub fn display_name(&self) -> &'static str {
        match self {
            ProviderKind::Password => "Email & Password",
            ProviderKind::Google => "Google",
            ProviderKind::GitHub => "GitHub",
            ProviderKind::Anonymous => "Guest",
        }
    }

    /// Stable identifier string, used for storage keys and logging.
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::Password => "password",
            ProviderKind::Google => "google",
            ProviderKind::GitHub => "github",
            ProviderKind::Anonymous => "anonymous",
        }
    }

    /// Parse a provider kind from its stable identifier.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "password" => Some(ProviderKind::Password),
            "google" => Some(ProviderKind::Google),
            "github" => Some(ProviderKind::GitHub),
            "anonymous" => Some(ProviderKind::Anonymous),
            _ => None,
        }
    }

    /// Whether sign-in with this provider runs an OAuth presentation flow.
    pub fn is_oauth(&self) -> bool {
        matches!(self, ProviderKind::Google | ProviderKind::GitHub)
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The platform the app is currently running on, as far as OAuth
/// presentation is concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlatformKind {
    /// Browser-hosted build
    Web,
    /// Mobile or desktop build
    Native,
}

impl fmt::Display for PlatformKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlatformKind::Web => write!(f, "web"),
            PlatformKind::Native => write!(f, "native"),
        }
    }
}

/// An OAuth access token.
///
/// # Security
///
/// The `Debug` implementation redacts the value; tokens are never logged.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessToken(String);

impl AccessToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Expose the raw token value. Callers must not log it.
    pub fn secret(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("AccessToken").field(&"[REDACTED]").finish()
    }
}

/// The provider's proof of identity from a successful authenticate call.
///
/// Ephemeral: consumed to build or update a [`Session`] and to seed the
/// token vault, never persisted itself.
#[derive(Debug, Clone)]
pub struct Credential {
    pub provider: ProviderKind,
    pub provider_user_id: UserId,
    pub access_token: Option<AccessToken>,
    pub is_new_account: bool,
}

/// Profile fields reported by the identity backend alongside a credential.
#[derive(Debug, Clone, Default)]
pub struct Profile {
    pub email: Option<String>,
    pub display_name: Option<String>,
    pub email_verified: bool,
}

/// A credential plus the profile fields needed to build a session.
#[derive(Debug, Clone)]
pub struct AuthOutcome {
    pub credential: Credential,
    pub profile: Profile,
}

impl AuthOutcome {
    /// Normalize a provider SDK identity into the core's shape.
    pub fn from_identity(provider: ProviderKind, identity: ProviderIdentity) -> Self {
        Self {
            credential: Credential {
                provider,
                provider_user_id: UserId::new(identity.provider_user_id),
                access_token: identity.provider_token.map(AccessToken::new),
                is_new_account: identity.is_new_user,
            },
            profile: Profile {
                email: identity.email,
                display_name: identity.display_name,
                email_verified: identity.email_verified,
            },
        }
    }
}

/// The active authentication session.
///
/// At most one session is active per device at any time; it is exclusively
/// owned by the session manager and observed through its watch channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub user_id: UserId,
    pub provider: ProviderKind,
    /// True iff the active identity is anonymous
    pub is_guest: bool,
    pub is_pro: bool,
    pub email_verified: bool,
    pub display_name: Option<String>,
    pub email: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Parameters for a sign-in attempt, by provider family.
#[derive(Debug, Clone)]
pub enum SignInParams {
    /// Email/password sign-in
    Password { email: String, password: String },
    /// Federated OAuth sign-in with the given provider
    OAuth { provider: ProviderKind },
    /// Anonymous guest sign-in
    Anonymous,
}

/// Result of a sign-in call that did not fail.
#[derive(Debug, Clone)]
pub enum SignInOutcome {
    /// The session was established
    SignedIn(Session),
    /// A full-page redirect was launched; the session is unchanged and the
    /// flow completes on the return trip
    RedirectPending,
}

/// Sign-in state machine phase.
///
/// ```text
/// Idle -> Authenticating -> Authenticated
///   ^           |
///   +-----------+  (failure or redirect pending)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuthPhase {
    /// No sign-in running, no session required
    #[default]
    Idle,
    /// A sign-in attempt is in flight
    Authenticating,
    /// A session is active
    Authenticated,
}

impl AuthPhase {
    pub fn is_in_progress(&self) -> bool {
        matches!(self, AuthPhase::Authenticating)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_kind_round_trip() {
        for kind in [
            ProviderKind::Password,
            ProviderKind::Google,
            ProviderKind::GitHub,
            ProviderKind::Anonymous,
        ] {
            assert_eq!(ProviderKind::parse(kind.as_str()), Some(kind));
        }
        assert_eq!(ProviderKind::parse("github.com"), None);
    }

    #[test]
    fn test_provider_kind_oauth_classification() {
        assert!(ProviderKind::Google.is_oauth());
        assert!(ProviderKind::GitHub.is_oauth());
        assert!(!ProviderKind::Password.is_oauth());
        assert!(!ProviderKind::Anonymous.is_oauth());
    }

    #[test]
    fn test_access_token_debug_redacts() {
        let token = AccessToken::new("gho_super_secret_value");
        let debug = format!("{:?}", token);
        assert!(debug.contains("[REDACTED]"));
        assert!(!debug.contains("gho_super_secret_value"));
    }

    #[test]
    fn test_credential_debug_redacts_token() {
        let credential = Credential {
            provider: ProviderKind::GitHub,
            provider_user_id: UserId::new("uid-1"),
            access_token: Some(AccessToken::new("gho_super_secret_value")),
            is_new_account: true,
        };
        let debug = format!("{:?}", credential);
        assert!(!debug.contains("gho_super_secret_value"));
    }

    #[test]
    fn test_auth_outcome_from_identity() {
        let identity = ProviderIdentity {
            provider_user_id: "uid-42".to_string(),
            email: Some("dev@example.com".to_string()),
            display_name: Some("Dev".to_string()),
            email_verified: true,
            provider_token: Some("token".to_string()),
            is_new_user: false,
        };

        let outcome = AuthOutcome::from_identity(ProviderKind::Google, identity);
        assert_eq!(outcome.credential.provider, ProviderKind::Google);
        assert_eq!(outcome.credential.provider_user_id.as_str(), "uid-42");
        assert!(outcome.credential.access_token.is_some());
        assert!(!outcome.credential.is_new_account);
        assert_eq!(outcome.profile.email.as_deref(), Some("dev@example.com"));
        assert!(outcome.profile.email_verified);
    }

    #[test]
    fn test_session_serialization() {
        let session = Session {
            user_id: UserId::new("uid-1"),
            provider: ProviderKind::Anonymous,
            is_guest: true,
            is_pro: false,
            email_verified: false,
            display_name: None,
            email: None,
            created_at: Utc::now(),
        };
        let json = serde_json::to_string(&session).unwrap();
        let back: Session = serde_json::from_str(&json).unwrap();
        assert_eq!(session, back);
    }

    #[test]
    fn test_auth_phase_progress() {
        assert!(!AuthPhase::Idle.is_in_progress());
        assert!(AuthPhase::Authenticating.is_in_progress());
        assert!(!AuthPhase::Authenticated.is_in_progress());
        assert_eq!(AuthPhase::default(), AuthPhase::Idle);
    }
}
