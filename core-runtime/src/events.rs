//! # Event Bus System
//!
//! Event-driven notifications for the core, built on `tokio::sync::broadcast`.
//!
//! Modules emit typed [`CoreEvent`]s; any number of subscribers (UI layers,
//! analytics, tests) receive them independently. Slow subscribers receive
//! `RecvError::Lagged` instead of blocking fast ones.
//!
//! Note that the *current session* is not delivered through this bus: the
//! session manager exposes it through a `watch` channel that replays the
//! latest value to new observers. The bus carries transition notifications.
//!
//! ## Usage
//!
//! ```rust
//! use core_runtime::events::{AuthEvent, CoreEvent, EventBus};
//!
//! let event_bus = EventBus::new(100);
//! let mut rx = event_bus.subscribe();
//!
//! event_bus
//!     .emit(CoreEvent::Auth(AuthEvent::SigningIn {
//!         provider: "github".to_string(),
//!     }))
//!     .ok();
//! ```

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

// Re-export commonly used types
pub use tokio::sync::broadcast::error::{RecvError, SendError};
pub use tokio::sync::broadcast::Receiver;

/// Default buffer size for the event bus channel.
pub const DEFAULT_EVENT_BUFFER_SIZE: usize = 100;

/// Top-level event enum encompassing all event categories.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", content = "payload")]
pub enum CoreEvent {
    /// Authentication-related events
    Auth(AuthEvent),
    /// Daily quota events
    Quota(QuotaEvent),
}

impl CoreEvent {
    /// Returns a human-readable description of the event.
    pub fn description(&self) -> &str {
        match self {
            CoreEvent::Auth(e) => e.description(),
            CoreEvent::Quota(e) => e.description(),
        }
    }

    /// Returns the severity level of the event.
    pub fn severity(&self) -> EventSeverity {
        match self {
            CoreEvent::Auth(AuthEvent::AuthFailed { .. }) => EventSeverity::Error,
            CoreEvent::Auth(AuthEvent::SignedIn { .. }) => EventSeverity::Info,
            CoreEvent::Auth(AuthEvent::AccountDeleted { .. }) => EventSeverity::Info,
            CoreEvent::Quota(QuotaEvent::Denied { .. }) => EventSeverity::Warning,
            _ => EventSeverity::Debug,
        }
    }
}

/// Event severity levels for filtering and logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EventSeverity {
    /// Debug-level events (verbose)
    Debug,
    /// Informational events
    Info,
    /// Warning events
    Warning,
    /// Error events
    Error,
}

/// Events related to authentication and session lifecycle.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "event")]
pub enum AuthEvent {
    /// Authentication flow in progress.
    SigningIn {
        /// The provider being authenticated with (e.g., "github", "google").
        provider: String,
    },
    /// User successfully authenticated.
    SignedIn {
        /// The active user ID.
        user_id: String,
        /// The provider used for authentication.
        provider: String,
        /// Whether the new session is an anonymous guest session.
        is_guest: bool,
    },
    /// User signed out; local data wiped.
    SignedOut {
        /// The user ID that was signed out.
        user_id: String,
    },
    /// A guest session was upgraded to a permanent account in place.
    GuestConverted {
        /// The preserved user ID.
        user_id: String,
    },
    /// The account was permanently deleted.
    AccountDeleted {
        /// The user ID that no longer exists.
        user_id: String,
    },
    /// Authentication error occurred.
    AuthFailed {
        /// The provider involved.
        provider: String,
        /// Human-readable error message.
        message: String,
        /// Whether the error is recoverable (e.g., retry possible).
        recoverable: bool,
    },
}

impl AuthEvent {
    fn description(&self) -> &str {
        match self {
            AuthEvent::SigningIn { .. } => "Authentication in progress",
            AuthEvent::SignedIn { .. } => "User signed in successfully",
            AuthEvent::SignedOut { .. } => "User signed out",
            AuthEvent::GuestConverted { .. } => "Guest account upgraded",
            AuthEvent::AccountDeleted { .. } => "Account deleted",
            AuthEvent::AuthFailed { .. } => "Authentication error",
        }
    }
}

/// Events related to daily generation quota.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "event")]
pub enum QuotaEvent {
    /// A quota unit was consumed.
    Consumed {
        /// The user whose counter was incremented.
        user_id: String,
        /// Units remaining today, or `None` for unlimited tiers.
        remaining: Option<u32>,
    },
    /// A consume attempt was denied.
    Denied {
        /// The user at their daily limit.
        user_id: String,
    },
}

impl QuotaEvent {
    fn description(&self) -> &str {
        match self {
            QuotaEvent::Consumed { .. } => "Quota consumed",
            QuotaEvent::Denied { .. } => "Quota exceeded",
        }
    }
}

/// Central event bus for publishing and subscribing to events.
///
/// Uses `tokio::sync::broadcast` internally:
/// - Multiple producers (clone the `EventBus`)
/// - Multiple consumers (each `subscribe()` creates a new receiver)
/// - Non-blocking sends (events are cloned per subscriber)
/// - Lagging detection (slow subscribers get `RecvError::Lagged`)
#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<CoreEvent>,
}

impl EventBus {
    /// Creates a new event bus with the specified buffer size.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publishes an event to all subscribers.
    ///
    /// Returns the number of subscribers that received the event, or an
    /// error if there are no active subscribers.
    pub fn emit(&self, event: CoreEvent) -> Result<usize, SendError<CoreEvent>> {
        self.sender.send(event)
    }

    /// Creates a new subscriber to receive events.
    ///
    /// Each call creates an independent receiver that will receive all
    /// future events. Past events are not replayed.
    pub fn subscribe(&self) -> Receiver<CoreEvent> {
        self.sender.subscribe()
    }

    /// Number of active subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_EVENT_BUFFER_SIZE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_emit_and_receive() {
        let bus = EventBus::new(8);
        let mut rx = bus.subscribe();

        let event = CoreEvent::Auth(AuthEvent::SignedIn {
            user_id: "user-1".to_string(),
            provider: "google".to_string(),
            is_guest: false,
        });
        bus.emit(event.clone()).unwrap();

        assert_eq!(rx.recv().await.unwrap(), event);
    }

    #[tokio::test]
    async fn test_multiple_subscribers_receive_same_event() {
        let bus = EventBus::new(8);
        let mut rx1 = bus.subscribe();
        let mut rx2 = bus.subscribe();

        bus.emit(CoreEvent::Quota(QuotaEvent::Denied {
            user_id: "user-1".to_string(),
        }))
        .unwrap();

        assert!(matches!(
            rx1.recv().await.unwrap(),
            CoreEvent::Quota(QuotaEvent::Denied { .. })
        ));
        assert!(matches!(
            rx2.recv().await.unwrap(),
            CoreEvent::Quota(QuotaEvent::Denied { .. })
        ));
    }

    #[test]
    fn test_emit_without_subscribers_errors() {
        let bus = EventBus::new(8);
        let result = bus.emit(CoreEvent::Auth(AuthEvent::SigningIn {
            provider: "github".to_string(),
        }));
        assert!(result.is_err());
    }

    #[test]
    fn test_severity_mapping() {
        let err = CoreEvent::Auth(AuthEvent::AuthFailed {
            provider: "github".to_string(),
            message: "boom".to_string(),
            recoverable: true,
        });
        assert_eq!(err.severity(), EventSeverity::Error);

        let denied = CoreEvent::Quota(QuotaEvent::Denied {
            user_id: "u".to_string(),
        });
        assert_eq!(denied.severity(), EventSeverity::Warning);
    }

    #[test]
    fn test_event_serialization() {
        let event = CoreEvent::Auth(AuthEvent::GuestConverted {
            user_id: "user-1".to_string(),
        });
        let json = serde_json::to_string(&event).unwrap();
        let back: CoreEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(event, back);
    }
}
