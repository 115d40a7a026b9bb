//! Capture time handling.
//!
//! Every captured event carries two renderings of the same instant: a full
//! precision UTC timestamp for export and detail views, and a short local
//! time for the compact event list.
//!
//! # Example
//!
//! ```
//! use chrono::DateTime;
//! use tag_events::{display_time, iso_timestamp};
//!
//! let instant = DateTime::parse_from_rfc3339("2024-05-01T11:30:05.678+02:00").unwrap();
//! assert_eq!(iso_timestamp(&instant), "2024-05-01T09:30:05.678Z");
//! assert_eq!(display_time(&instant), "11:30:05.67");
//! ```

use chrono::{DateTime, Duration, FixedOffset, Local, NaiveDate, SecondsFormat, Utc};
use std::sync::{Arc, Mutex};

/// Source of capture instants.
///
/// The returned instant keeps the local offset so that the display time can
/// be rendered in the viewer's timezone.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<FixedOffset>;
}

/// Wall clock in the local timezone.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<FixedOffset> {
        Local::now().fixed_offset()
    }
}

impl<C: Clock + ?Sized> Clock for Arc<C> {
    fn now(&self) -> DateTime<FixedOffset> {
        (**self).now()
    }
}

/// Manually driven clock for tests and replays.
///
/// Each read returns the current instant and then advances it by `step`
/// (zero by default).
#[derive(Debug)]
pub struct ManualClock {
    current: Mutex<DateTime<FixedOffset>>,
    step: Duration,
}

impl ManualClock {
    /// Creates a clock frozen at `start`.
    pub fn new(start: DateTime<FixedOffset>) -> Self {
        Self {
            current: Mutex::new(start),
            step: Duration::zero(),
        }
    }

    /// Creates a clock frozen at an RFC 3339 instant, e.g.
    /// `"2024-05-01T09:30:00.000+00:00"`.
    pub fn at(rfc3339: &str) -> Result<Self, chrono::ParseError> {
        DateTime::parse_from_rfc3339(rfc3339).map(Self::new)
    }

    /// Sets the amount the clock advances after every read.
    pub fn with_step(mut self, step: Duration) -> Self {
        self.step = step;
        self
    }

    /// Moves the clock to a new instant.
    pub fn set(&self, instant: DateTime<FixedOffset>) {
        *self.lock() = instant;
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, DateTime<FixedOffset>> {
        self.current.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<FixedOffset> {
        let mut current = self.lock();
        let now = *current;
        *current = now + self.step;
        now
    }
}

/// Formats an instant as ISO-8601 UTC with millisecond precision.
pub fn iso_timestamp(instant: &DateTime<FixedOffset>) -> String {
    instant
        .with_timezone(&Utc)
        .to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Formats an instant as a short local time, `HH:MM:SS.cc`.
pub fn display_time(instant: &DateTime<FixedOffset>) -> String {
    let mut formatted = instant.format("%H:%M:%S%.3f").to_string();
    // Centiseconds are enough for the compact list
    formatted.pop();
    formatted
}

/// Returns the UTC calendar date of an instant, used for export file names.
pub fn export_date(instant: &DateTime<FixedOffset>) -> NaiveDate {
    instant.with_timezone(&Utc).date_naive()
}

/// Serde adapter that keeps exported timestamps at millisecond precision.
pub(crate) mod iso_millis {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(instant: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&instant.to_rfc3339_opts(SecondsFormat::Millis, true))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        DateTime::parse_from_rfc3339(&s)
            .map(|instant| instant.with_timezone(&Utc))
            .map_err(serde::de::Error::custom)
    }
}
