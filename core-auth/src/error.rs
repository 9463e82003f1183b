use crate::types::ProviderKind;
use bridge_traits::identity::ProviderFailure;
use thiserror::Error;

/// Remediation text shown to the user when both OAuth presentation
/// strategies fail for environment reasons.
pub const SESSION_STORAGE_REMEDIATION: &str =
    "Sign-in could not complete because your browser or device blocked \
     temporary sign-in storage. Try again, update or switch your browser, \
     or sign in with a different provider.";

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Invalid credential: {0}")]
    InvalidCredential(String),

    #[error("Network failure: {0}")]
    Network(String),

    #[error("Sign-in was cancelled")]
    Cancelled,

    #[error("An account already exists under a different provider")]
    ProviderConflict { email: Option<String> },

    #[error("Sign-in session storage unavailable: {remediation}")]
    SessionStorageFailure { remediation: String },

    #[error("A sign-in is already in progress")]
    OperationInProgress,

    #[error("No active session")]
    NoActiveSession,

    #[error("No identity provider registered for {0}")]
    ProviderUnavailable(ProviderKind),

    #[error("Account conversion failed: {0}")]
    AccountConversion(String),

    #[error("Provider SDK error: {0}")]
    Provider(String),

    #[error("Token vault error: {0}")]
    Vault(String),
}

impl AuthError {
    /// Map a normalized provider SDK failure onto the core taxonomy.
    ///
    /// `MissingSessionState` maps to the terminal `SessionStorageFailure`;
    /// the one-shot fallback policy in the flow selector intercepts it
    /// before this conversion when a retry is still available.
    pub fn from_provider(failure: ProviderFailure) -> Self {
        match failure {
            ProviderFailure::InvalidCredential(reason) => AuthError::InvalidCredential(reason),
            ProviderFailure::Network(reason) => AuthError::Network(reason),
            ProviderFailure::Cancelled => AuthError::Cancelled,
            ProviderFailure::MissingSessionState(_) => AuthError::SessionStorageFailure {
                remediation: SESSION_STORAGE_REMEDIATION.to_string(),
            },
            ProviderFailure::AccountConflict { email } => AuthError::ProviderConflict { email },
            ProviderFailure::Sdk(reason) => AuthError::Provider(reason),
        }
    }

    /// Whether retrying the same call may succeed without user action.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            AuthError::Network(_)
                | AuthError::SessionStorageFailure { .. }
                | AuthError::OperationInProgress
        )
    }
}

pub type Result<T> = std::result::Result<T, AuthError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_provider_mapping() {
        assert!(matches!(
            AuthError::from_provider(ProviderFailure::Cancelled),
            AuthError::Cancelled
        ));
        assert!(matches!(
            AuthError::from_provider(ProviderFailure::InvalidCredential("bad".into())),
            AuthError::InvalidCredential(_)
        ));
        assert!(matches!(
            AuthError::from_provider(ProviderFailure::AccountConflict { email: None }),
            AuthError::ProviderConflict { email: None }
        ));

        let err = AuthError::from_provider(ProviderFailure::MissingSessionState("blocked".into()));
        match err {
            AuthError::SessionStorageFailure { remediation } => {
                assert_eq!(remediation, SESSION_STORAGE_REMEDIATION);
            }
            other => panic!("Expected SessionStorageFailure, got {:?}", other),
        }
    }

    #[test]
    fn test_recoverability() {
        assert!(AuthError::Network("timeout".into()).is_recoverable());
        assert!(AuthError::OperationInProgress.is_recoverable());
        assert!(!AuthError::Cancelled.is_recoverable());
        assert!(!AuthError::InvalidCredential("bad".into()).is_recoverable());
    }
}
