use chrono::{Local, NaiveDate};
use std::time::Instant;

/// Time source for cache expiry and fallback dates.
pub trait Clock {
    /// Monotonic now, used for TTL arithmetic.
    fn now(&self) -> Instant;
    /// Calendar date on the local wall clock.
    fn today(&self) -> NaiveDate;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}
