//! Time helpers for calendar expansion.
//!
//! This module provides [`TimeWindow`] for bounding recurrence expansion,
//! and conversions between UTC instants and local wall-clock values in an
//! arbitrary [`TimeZone`].

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, SecondsFormat, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// A time window bounding which occurrences are produced.
///
/// Represents a closed interval `[start, end]` in UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindow {
    /// Start of the window (inclusive).
    pub start: DateTime<Utc>,
    /// End of the window (inclusive).
    pub end: DateTime<Utc>,
}

impl TimeWindow {
    /// Creates a new time window.
    ///
    /// # Panics
    ///
    /// Panics if `start` is after `end`.
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        assert!(start <= end, "TimeWindow start must be <= end");
        Self { start, end }
    }

    /// Creates a window reaching `lookbehind` into the past and `lookahead`
    /// into the future from `now`.
    ///
    /// Bounds past the representable range saturate to
    /// [`DateTime::<Utc>::MIN_UTC`] and [`DateTime::<Utc>::MAX_UTC`].
    pub fn around(now: DateTime<Utc>, lookbehind: Duration, lookahead: Duration) -> Self {
        let start = now
            .checked_sub_signed(lookbehind)
            .unwrap_or(DateTime::<Utc>::MIN_UTC);
        let end = now
            .checked_add_signed(lookahead)
            .unwrap_or(DateTime::<Utc>::MAX_UTC);
        Self::new(start, end)
    }

    /// Returns the duration of this time window.
    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    /// Checks if a datetime falls within this window, both ends included.
    pub fn contains(&self, dt: DateTime<Utc>) -> bool {
        self.start <= dt && dt <= self.end
    }

    /// Returns the window end, pulled in to `until` when that comes first.
    pub fn end_capped_by(&self, until: Option<DateTime<Utc>>) -> DateTime<Utc> {
        match until {
            Some(until) if until < self.end => until,
            _ => self.end,
        }
    }
}

/// Resolves a wall-clock value in `tz` to a UTC instant.
///
/// Ambiguous values (DST fold) map to the earliest instant. Values that do
/// not exist (DST gap) are moved forward by one hour.
pub fn resolve_local<Tz: TimeZone>(tz: &Tz, naive: NaiveDateTime) -> Option<DateTime<Utc>> {
    tz.from_local_datetime(&naive)
        .earliest()
        .or_else(|| {
            let shifted = naive.checked_add_signed(Duration::hours(1))?;
            tz.from_local_datetime(&shifted).earliest()
        })
        .map(|dt| dt.with_timezone(&Utc))
}

/// Returns the wall-clock value of `dt` in `tz`.
pub fn local_naive<Tz: TimeZone>(dt: DateTime<Utc>, tz: &Tz) -> NaiveDateTime {
    dt.with_timezone(tz).naive_local()
}

/// Returns the calendar date of `dt` in `tz`.
pub fn local_date<Tz: TimeZone>(dt: DateTime<Utc>, tz: &Tz) -> NaiveDate {
    dt.with_timezone(tz).date_naive()
}

/// Checks whether two instants fall on the same calendar date in `tz`.
pub fn same_local_date<Tz: TimeZone>(a: DateTime<Utc>, b: DateTime<Utc>, tz: &Tz) -> bool {
    local_date(a, tz) == local_date(b, tz)
}

/// Formats `dt` as `YYYY-MM-DDTHH:MM:SS.mmmZ`.
pub fn iso_millis(dt: DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Millis, true)
}
