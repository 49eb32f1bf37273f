//! Pinned event time for fixtures.

use chrono::{DateTime, Utc};
use streamx_core::clock::Clock;

/// Stamps every event with the same instant, so events built in a test and
/// events echoed back by a mock server compare equal.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl FixedClock {
    /// Pins the clock `secs` seconds after the Unix epoch.
    ///
    /// # Panics
    ///
    /// Panics if `secs` is out of the range `chrono` can represent.
    #[must_use]
    pub fn at_timestamp(secs: i64) -> Self {
        Self(DateTime::from_timestamp(secs, 0).expect("timestamp in range"))
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}
