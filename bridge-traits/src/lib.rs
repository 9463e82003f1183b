//! # Host Bridge Traits
//!
//! Platform abstraction traits that must be implemented by each host platform.
//!
//! ## Overview
//!
//! This crate defines the contract between the auth/session core and
//! platform-specific implementations. Each trait represents a capability the
//! core requires but that must be implemented differently per platform
//! (desktop, iOS, Android, web).
//!
//! ## Traits
//!
//! ### Identity
//! - [`IdentityProvider`](identity::IdentityProvider) - Pass-through to a
//!   provider SDK (password, Google, GitHub, anonymous)
//!
//! ### Security & Storage
//! - [`SecureStore`](storage::SecureStore) - Credential persistence
//!   (Keychain/Keystore)
//! - [`SettingsStore`](storage::SettingsStore) - Key-value preferences and
//!   cached profile fields
//! - [`EntitlementStore`](remote::EntitlementStore) - Pro flag in the remote
//!   document store
//!
//! ### Utilities
//! - [`Clock`](time::Clock) - Time source for deterministic testing and
//!   device-local day boundaries
//!
//! ## Error Handling
//!
//! Storage and remote traits use [`BridgeError`](error::BridgeError);
//! identity providers surface the normalized
//! [`ProviderFailure`](identity::ProviderFailure), which the core maps onto
//! its own error taxonomy. Platform implementations should convert
//! platform-specific errors and include actionable context.
//!
//! ## Thread Safety
//!
//! All bridge traits require `Send + Sync` bounds to support safe concurrent
//! usage across async tasks.

pub mod error;
pub mod identity;
pub mod remote;
pub mod storage;
pub mod time;

pub use error::BridgeError;

// Re-export commonly used types
pub use identity::{
    AuthIntent, FlowStrategy, IdentityProvider, ProviderFailure, ProviderIdentity, ProviderResponse,
};
pub use remote::EntitlementStore;
pub use storage::{SecureStore, SettingsStore};
pub use time::{Clock, SystemClock};
