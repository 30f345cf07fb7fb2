//! Timestamp value object and calendar-day windows.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Immutable point in time, always UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Creates a timestamp for the current moment.
    pub fn now() -> Self {
        Self(Utc::now())
    }

    /// Creates a timestamp from a DateTime<Utc>.
    pub fn from_datetime(dt: DateTime<Utc>) -> Self {
        Self(dt)
    }

    /// Returns the inner DateTime.
    pub fn as_datetime(&self) -> &DateTime<Utc> {
        &self.0
    }

    /// Midnight UTC at the start of `day`.
    pub fn start_of_day(day: NaiveDate) -> Self {
        Self(day.and_time(chrono::NaiveTime::MIN).and_utc())
    }

    /// Calendar day (UTC) this timestamp falls on.
    pub fn day(&self) -> NaiveDate {
        self.0.date_naive()
    }

    /// Checks if this timestamp is before another.
    pub fn is_before(&self, other: &Timestamp) -> bool {
        self.0 < other.0
    }

    /// Creates a new timestamp by adding the specified number of seconds.
    pub fn plus_secs(&self, secs: i64) -> Self {
        Self(self.0 + Duration::seconds(secs))
    }

    /// RFC 3339 representation with fixed microsecond precision.
    ///
    /// Fixed precision keeps lexical and chronological order aligned when the
    /// value is stored as a string.
    pub fn to_rfc3339(&self) -> String {
        self.0.to_rfc3339_opts(chrono::SecondsFormat::Micros, true)
    }

    /// Parses an RFC 3339 string.
    pub fn parse_rfc3339(value: &str) -> Option<Self> {
        DateTime::parse_from_rfc3339(value)
            .ok()
            .map(|dt| Self(dt.with_timezone(&Utc)))
    }
}

impl Default for Timestamp {
    fn default() -> Self {
        Self::now()
    }
}

/// Half-open interval `[start, end)` covering one UTC calendar day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayWindow {
    day: NaiveDate,
    start: Timestamp,
    end: Timestamp,
}

impl DayWindow {
    /// Window covering `day`.
    pub fn for_day(day: NaiveDate) -> Self {
        let start = Timestamp::start_of_day(day);
        let end = Timestamp(start.0 + Duration::days(1));
        Self { day, start, end }
    }

    pub fn day(&self) -> NaiveDate {
        self.day
    }

    /// Inclusive lower bound.
    pub fn start(&self) -> Timestamp {
        self.start
    }

    /// Exclusive upper bound.
    pub fn end(&self) -> Timestamp {
        self.end
    }

    pub fn contains(&self, ts: &Timestamp) -> bool {
        *ts >= self.start && *ts < self.end
    }
}
