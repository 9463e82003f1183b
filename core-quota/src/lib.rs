//! # Tier Gate
//!
//! Device-local daily generation quota for the poem-generation app. Free
//! sessions get `free_poems_per_day` generations per local calendar day;
//! Pro sessions are unlimited. Counters are keyed by user ID so they
//! survive guest-to-permanent conversion and are removed by the sign-out
//! wipe.

pub mod error;
pub mod gate;

pub use error::{QuotaError, Result};
pub use gate::{QuotaStatus, Remaining, TierGate};
