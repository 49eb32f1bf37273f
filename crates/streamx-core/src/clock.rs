//! Source of event occurrence times.
//!
//! `CloudEventBuilder::build` stamps events that carry no `time` with
//! `SystemClock`; `build_with` takes any `Clock`, which keeps timestamps
//! reproducible in tests.

use chrono::{DateTime, Utc};

/// Supplies the `time` attribute for events built without one.
pub trait Clock: Send + Sync {
    /// The occurrence time to stamp.
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time in UTC.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
