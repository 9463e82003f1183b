//! Time Abstraction
//!
//! Injectable time source. Quota accounting works on the device-local
//! calendar day, not UTC, so the trait exposes both instants and local
//! dates. Tests substitute a settable clock to simulate day rollovers.

use chrono::{DateTime, Local, NaiveDate, Utc};

/// Time source trait
///
/// # Example
///
/// ```ignore
/// use bridge_traits::time::Clock;
///
/// fn log_timestamp(clock: &dyn Clock) {
///     println!("Current time: {}", clock.now());
/// }
/// ```
pub trait Clock: Send + Sync {
    /// Get current UTC time
    fn now(&self) -> DateTime<Utc>;

    /// Get the current calendar date in the device's local timezone.
    ///
    /// Two calls that straddle local midnight must return different dates
    /// even when the UTC date is unchanged.
    fn today(&self) -> NaiveDate;

    /// Get current Unix timestamp in seconds
    fn unix_timestamp(&self) -> i64 {
        self.now().timestamp()
    }
}

/// System clock implementation using actual system time
#[derive(Debug, Clone)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_clock() {
        let clock = SystemClock;
        let now = clock.now();
        let timestamp = clock.unix_timestamp();

        assert!(timestamp > 0);
        assert_eq!(now.timestamp(), timestamp);
    }

    #[test]
    fn test_today_matches_local_time() {
        let clock = SystemClock;
        assert_eq!(clock.today(), Local::now().date_naive());
    }
}
