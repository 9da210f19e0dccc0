//! Calendar event output type.
//!
//! [`CalendarEvent`] is one concrete occurrence of a calendar entry: a
//! non-recurring event, one instance of an expanded recurrence, or an
//! override that replaced one instance. Widgets consume lists of these.

use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::time::{iso_millis, local_date};

/// A single concrete calendar occurrence.
///
/// The `id` is derived from the iCalendar UID and the occurrence start, so
/// expanding the same document twice yields identical ids.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarEvent {
    /// Occurrence identifier, `{uid}-{start as ISO-8601 with millis}`.
    pub id: String,
    /// The event title (may be empty).
    pub title: String,
    /// When the occurrence starts.
    pub start: DateTime<Utc>,
    /// When the occurrence ends. Not guaranteed to be after `start`.
    pub end: DateTime<Utc>,
    /// Free-form description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Where the event takes place.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    /// Whether the start was given as a date without a time.
    #[serde(default)]
    pub all_day: bool,
}

impl CalendarEvent {
    /// Creates an occurrence of the event identified by `uid` starting at `start`.
    pub fn new(
        uid: &str,
        title: impl Into<String>,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Self {
        Self {
            id: occurrence_id(uid, start),
            title: title.into(),
            start,
            end,
            description: None,
            location: None,
            all_day: false,
        }
    }

    /// Builder method to set the description.
    pub fn with_description(mut self, description: Option<String>) -> Self {
        self.description = description;
        self
    }

    /// Builder method to set the location.
    pub fn with_location(mut self, location: Option<String>) -> Self {
        self.location = location;
        self
    }

    /// Builder method to mark the event as all-day.
    pub fn with_all_day(mut self, all_day: bool) -> Self {
        self.all_day = all_day;
        self
    }

    /// Returns the length of the occurrence.
    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    /// Checks if the occurrence is running at the given time.
    pub fn is_ongoing_at(&self, now: DateTime<Utc>) -> bool {
        self.start <= now && now < self.end
    }

    /// Returns the calendar date the occurrence starts on in `tz`.
    pub fn start_date_in<Tz: TimeZone>(&self, tz: &Tz) -> NaiveDate {
        local_date(self.start, tz)
    }
}

/// Builds the occurrence id for `uid` starting at `start`.
pub fn occurrence_id(uid: &str, start: DateTime<Utc>) -> String {
    format!("{}-{}", uid, iso_millis(start))
}

/// Sorts events by start time, keeping the relative order of ties.
pub fn sort_by_start(events: &mut [CalendarEvent]) {
    events.sort_by_key(|e| e.start);
}
