//! # Core Configuration Module
//!
//! Composition-root configuration for the auth/session core.
//!
//! ## Overview
//!
//! The configuration system uses a builder pattern to construct a
//! [`CoreConfig`] holding all bridge dependencies and settings. Services are
//! explicitly constructed from this config and passed by reference; there is
//! no ambient globally-mutable instance anywhere in the core.
//!
//! Validation is fail-fast: `build()` reports the first missing required
//! bridge with an actionable message instead of deferring the failure to
//! first use.
//!
//! ## Required Dependencies
//!
//! - `SecureStore` - token vault backing store
//! - `SettingsStore` - cached profile fields and usage counters
//! - `EntitlementStore` - remote Pro flag reads
//!
//! ## Optional Dependencies
//!
//! - `Clock` - defaults to [`SystemClock`](bridge_traits::time::SystemClock)
//!
//! ## Usage
//!
//! ```ignore
//! use core_runtime::config::CoreConfig;
//! use std::sync::Arc;
//!
//! let config = CoreConfig::builder()
//!     .secure_store(Arc::new(MySecureStore))
//!     .settings_store(Arc::new(MySettingsStore))
//!     .entitlements(Arc::new(MyEntitlementStore))
//!     .free_poems_per_day(5)
//!     .build()?;
//! ```

use crate::error::{Error, Result};
use bridge_traits::{Clock, EntitlementStore, SecureStore, SettingsStore, SystemClock};
use std::sync::Arc;

/// Default number of free-tier generations per device-local calendar day.
pub const DEFAULT_FREE_POEMS_PER_DAY: u32 = 5;

/// Core configuration for the auth/session core.
///
/// Use [`CoreConfig::builder`] to construct instances.
#[derive(Clone)]
pub struct CoreConfig {
    /// Platform secure store backing the token vault
    pub secure_store: Arc<dyn SecureStore>,

    /// Local persistent key-value cache for profile fields and counters
    pub settings_store: Arc<dyn SettingsStore>,

    /// Remote document store access for the Pro entitlement flag
    pub entitlements: Arc<dyn EntitlementStore>,

    /// Time source; injectable for deterministic tests
    pub clock: Arc<dyn Clock>,

    /// Free-tier daily generation limit
    pub free_poems_per_day: u32,

    /// Event bus channel capacity
    pub event_buffer_size: usize,
}

impl CoreConfig {
    /// Create a new configuration builder
    pub fn builder() -> CoreConfigBuilder {
        CoreConfigBuilder::default()
    }
}

/// Builder for [`CoreConfig`] with fail-fast validation.
#[derive(Default)]
pub struct CoreConfigBuilder {
    secure_store: Option<Arc<dyn SecureStore>>,
    settings_store: Option<Arc<dyn SettingsStore>>,
    entitlements: Option<Arc<dyn EntitlementStore>>,
    clock: Option<Arc<dyn Clock>>,
    free_poems_per_day: Option<u32>,
    event_buffer_size: Option<usize>,
}

impl CoreConfigBuilder {
    pub fn secure_store(mut self, store: Arc<dyn SecureStore>) -> Self {
        self.secure_store = Some(store);
        self
    }

    pub fn settings_store(mut self, store: Arc<dyn SettingsStore>) -> Self {
        self.settings_store = Some(store);
        self
    }

    pub fn entitlements(mut self, store: Arc<dyn EntitlementStore>) -> Self {
        self.entitlements = Some(store);
        self
    }

    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    pub fn free_poems_per_day(mut self, limit: u32) -> Self {
        self.free_poems_per_day = Some(limit);
        self
    }

    pub fn event_buffer_size(mut self, size: usize) -> Self {
        self.event_buffer_size = Some(size);
        self
    }

    /// Validate and construct the config.
    ///
    /// # Errors
    ///
    /// Returns [`Error::CapabilityMissing`] naming the first required bridge
    /// that was not provided.
    pub fn build(self) -> Result<CoreConfig> {
        let secure_store = self.secure_store.ok_or_else(|| Error::CapabilityMissing {
            capability: "SecureStore".to_string(),
            message: "No secure store provided. Desktop: use \
                      bridge_desktop::KeyringSecureStore. Mobile: inject the \
                      platform Keychain/Keystore adapter."
                .to_string(),
        })?;

        let settings_store = self.settings_store.ok_or_else(|| Error::CapabilityMissing {
            capability: "SettingsStore".to_string(),
            message: "No settings store provided. Desktop: use \
                      bridge_desktop::SqliteSettingsStore. Mobile: inject the \
                      platform preferences adapter."
                .to_string(),
        })?;

        let entitlements = self.entitlements.ok_or_else(|| Error::CapabilityMissing {
            capability: "EntitlementStore".to_string(),
            message: "No entitlement store provided. Inject the remote \
                      document store adapter for the Pro flag."
                .to_string(),
        })?;

        let free_poems_per_day = self.free_poems_per_day.unwrap_or(DEFAULT_FREE_POEMS_PER_DAY);
        if free_poems_per_day == 0 {
            return Err(Error::Config(
                "free_poems_per_day must be at least 1".to_string(),
            ));
        }

        Ok(CoreConfig {
            secure_store,
            settings_store,
            entitlements,
            clock: self.clock.unwrap_or_else(|| Arc::new(SystemClock)),
            free_poems_per_day,
            event_buffer_size: self
                .event_buffer_size
                .unwrap_or(crate::events::DEFAULT_EVENT_BUFFER_SIZE),
        })
    }
}
