//! # Auth & Session Core
//!
//! Session lifecycle for the poem-generation app: sign-in across password,
//! Google, GitHub and anonymous guest identities, OAuth presentation
//! fallback, token custody, guest-to-permanent conversion, sign-out wipe
//! and account deletion.
//!
//! The host supplies platform bridges (secure store, settings, identity
//! provider SDKs, entitlements) through `core_runtime::config::CoreConfig`
//! and a [`ProviderRegistry`]; everything here is platform-neutral.

pub mod error;
pub mod flow;
pub mod lifecycle;
pub mod manager;
pub mod provider;
pub mod types;
pub mod vault;

pub use error::{AuthError, Result};
pub use flow::OAuthFlowSelector;
pub use lifecycle::{AccountLifecycleCoordinator, WipeReport};
pub use manager::AuthSessionManager;
pub use provider::{CredentialAdapter, ProviderRegistry};
pub use types::{
    AccessToken, AuthOutcome, AuthPhase, Credential, PlatformKind, Profile, ProviderKind, Session,
    SignInOutcome, SignInParams, UserId,
};
pub use vault::{SecureTokenVault, TokenKey};
