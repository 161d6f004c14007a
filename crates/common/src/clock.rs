//! Wall-clock abstraction.
//!
//! Services read the current time through [`Clock`] so timestamps written to
//! the store can be pinned in tests.

use chrono::{DateTime, FixedOffset, Utc};
use std::sync::Arc;

/// Source of the current time.
pub trait Clock: Send + Sync {
    /// Current instant in UTC.
    fn now(&self) -> DateTime<Utc>;

    /// Current instant as stored in timestamptz columns.
    fn now_fixed(&self) -> DateTime<FixedOffset> {
        self.now().into()
    }
}

/// Shared clock handle held by services.
pub type ClockService = Arc<dyn Clock>;

/// Clock backed by the system time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock frozen at a single instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_fixed_clock_is_stable() {
        let instant = Utc.with_ymd_and_hms(2025, 1, 2, 3, 4, 5).single();
        let Some(instant) = instant else {
            panic!("valid timestamp");
        };
        let clock = FixedClock(instant);

        assert_eq!(clock.now(), instant);
        assert_eq!(clock.now_fixed(), clock.now_fixed());
        assert_eq!(clock.now_fixed().offset().local_minus_utc(), 0);
    }

    #[test]
    fn test_system_clock_advances() {
        let clock = SystemClock;
        let a = clock.now();
        let b = clock.now();
        assert!(b >= a);
    }
}
