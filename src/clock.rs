//! All things time-related.

pub use chrono::{DateTime, TimeDelta, Utc};

/// Tells time and returns the time.
///
/// Generally you will want to retrieve time using [`SystemClock`],
/// but in tests you may want to implement a `Clock` with a fixed time.
pub trait Clock {
    /// The current time.
    fn now(&self) -> DateTime<Utc>;
}

/// Interacts with the system clock to get the current time.
#[derive(Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Marks a thing that knows when it was created.
pub trait HasAge {
    /// Seconds since the Unix epoch at which the item was created, exactly
    /// as reported by the Reddit API.
    fn created_timestamp(&self) -> f64;

    /// The date the item was created, in UTC.
    ///
    /// Timestamps that cannot be represented fall back to the Unix epoch.
    fn created_utc(&self) -> DateTime<Utc> {
        DateTime::from_timestamp(self.created_timestamp().trunc() as i64, 0).unwrap_or_default()
    }

    /// The creation date formatted for display, e.g., `2023-11-14 22:13:20 UTC`.
    fn created_display(&self) -> String {
        self.created_utc().format("%Y-%m-%d %H:%M:%S UTC").to_string()
    }
}
