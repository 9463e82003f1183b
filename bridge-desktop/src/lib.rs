//! # Desktop Bridge Implementations
//!
//! Desktop host adapters for the bridge traits:
//! - [`KeyringSecureStore`] - OS keychain-backed secure storage
//! - [`SqliteSettingsStore`] - SQLite-backed key-value settings
//!
//! The desktop platform uses the system clock directly; re-exported here so
//! composition roots only need this crate.

#[cfg(feature = "secure-store")]
pub mod secure_store;
pub mod settings;

#[cfg(feature = "secure-store")]
pub use secure_store::KeyringSecureStore;
pub use settings::SqliteSettingsStore;

pub use bridge_traits::time::SystemClock;
