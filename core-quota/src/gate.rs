//! Device-local daily generation quota.
//!
//! Free-tier users get a fixed number of poem generations per device-local
//! calendar day; Pro sessions are unlimited. The counter lives in the
//! settings store under `quota:<user_id>`, keyed by the stable user ID so
//! it survives a guest-to-permanent conversion unchanged.
//!
//! This is an honesty gate, not an enforcement boundary: the device clock
//! is trusted, and moving it backwards grants a fresh day.

use std::sync::Arc;

use bridge_traits::storage::SettingsStore;
use bridge_traits::time::Clock;
use chrono::{Days, NaiveDate};
use core_auth::Session;
use core_runtime::config::CoreConfig;
use core_runtime::events::{CoreEvent, EventBus, QuotaEvent};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::error::{QuotaError, Result};

/// Units left today.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Remaining {
    /// Pro tier, no daily cap
    Unlimited,
    /// Free tier, this many generations left
    Count(u32),
}

/// Snapshot of a user's quota position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuotaStatus {
    pub remaining: Remaining,
    /// Local calendar day on which the counter resets
    pub resets_at: NaiveDate,
}

/// Persisted counter record, one per user.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
struct StoredCounter {
    date: NaiveDate,
    count: u32,
}

fn counter_key(session: &Session) -> String {
    format!("quota:{}", session.user_id)
}

/// Gates free-tier generations against the daily limit.
pub struct TierGate {
    settings: Arc<dyn SettingsStore>,
    clock: Arc<dyn Clock>,
    events: EventBus,
    free_per_day: u32,
    // Serializes read-modify-write cycles on the counter.
    consume_lock: Mutex<()>,
}

impl TierGate {
    pub fn new(config: &CoreConfig, events: EventBus) -> Self {
        Self {
            settings: config.settings_store.clone(),
            clock: config.clock.clone(),
            events,
            free_per_day: config.free_poems_per_day,
            consume_lock: Mutex::new(()),
        }
    }

    /// Daily limit for free-tier sessions.
    pub fn free_per_day(&self) -> u32 {
        self.free_per_day
    }

    /// Current quota position without consuming anything.
    pub async fn quota(&self, session: &Session) -> Result<QuotaStatus> {
        let today = self.clock.today();
        let resets_at = next_reset(today);

        if session.is_pro {
            return Ok(QuotaStatus {
                remaining: Remaining::Unlimited,
                resets_at,
            });
        }

        let counter = self.load_counter(session, today).await?;
        Ok(QuotaStatus {
            remaining: Remaining::Count(self.free_per_day.saturating_sub(counter.count)),
            resets_at,
        })
    }

    /// Consume one generation unit, or refuse with
    /// [`QuotaError::Exceeded`] when the free tier is at its daily limit.
    pub async fn consume(&self, session: &Session) -> Result<QuotaStatus> {
        let today = self.clock.today();
        let resets_at = next_reset(today);

        if session.is_pro {
            self.events
                .emit(CoreEvent::Quota(QuotaEvent::Consumed {
                    user_id: session.user_id.to_string(),
                    remaining: None,
                }))
                .ok();
            return Ok(QuotaStatus {
                remaining: Remaining::Unlimited,
                resets_at,
            });
        }

        let _held = self.consume_lock.lock().await;

        let mut counter = self.load_counter(session, today).await?;
        if counter.count >= self.free_per_day {
            self.events
                .emit(CoreEvent::Quota(QuotaEvent::Denied {
                    user_id: session.user_id.to_string(),
                }))
                .ok();
            return Err(QuotaError::Exceeded { resets_at });
        }

        counter.count += 1;
        self.store_counter(session, counter).await?;

        let remaining = self.free_per_day - counter.count;
        debug!(user_id = %session.user_id, remaining, "Quota unit consumed");
        self.events
            .emit(CoreEvent::Quota(QuotaEvent::Consumed {
                user_id: session.user_id.to_string(),
                remaining: Some(remaining),
            }))
            .ok();
        Ok(QuotaStatus {
            remaining: Remaining::Count(remaining),
            resets_at,
        })
    }

    /// Load the counter, treating a stale date as a fresh day and a
    /// corrupted record as empty.
    async fn load_counter(&self, session: &Session, today: NaiveDate) -> Result<StoredCounter> {
        let key = counter_key(session);
        let raw = self
            .settings
            .get_string(&key)
            .await
            .map_err(|e| QuotaError::Storage(e.to_string()))?;

        let counter = match raw {
            None => None,
            Some(json) => match serde_json::from_str::<StoredCounter>(&json) {
                Ok(counter) => Some(counter),
                Err(e) => {
                    warn!(key = %key, error = %e, "Corrupted usage counter, resetting");
                    None
                }
            },
        };

        Ok(match counter {
            Some(counter) if counter.date == today => counter,
            _ => StoredCounter {
                date: today,
                count: 0,
            },
        })
    }

    async fn store_counter(&self, session: &Session, counter: StoredCounter) -> Result<()> {
        let json = serde_json::to_string(&counter)
            .map_err(|e| QuotaError::Storage(e.to_string()))?;
        self.settings
            .set_string(&counter_key(session), &json)
            .await
            .map_err(|e| QuotaError::Storage(e.to_string()))
    }
}

fn next_reset(today: NaiveDate) -> NaiveDate {
    today.checked_add_days(Days::new(1)).unwrap_or(today)
}
