//! iCalendar parsing and recurrence expansion.
//!
//! This crate turns an RFC 5545 document into a flat, start-sorted list of
//! [`CalendarEvent`] occurrences:
//!
//! - [`parse_ical`] - Parse a document in the local timezone at the current time
//! - [`parse_ical_with`] - Parse with an explicit timezone, "now" and window
//! - [`fetch_calendar_events`] - Download a document over HTTP, then parse it
//! - [`FetchError`] - Error types for the fetch adapter
//!
//! # Architecture
//!
//! ```text
//!   HTTP (fetch)          text
//!        │                 │
//!        └────────┬────────┘
//!                 ▼ tokenize()
//!          ┌──────────────┐
//!          │ EventRecord  │  one per complete VEVENT
//!          └──────┬───────┘
//!                 │
//!                 ▼ expand_events()
//!          ┌──────────────┐
//!          │ CalendarEvent│  one per occurrence in the window
//!          └──────────────┘
//! ```
//!
//! # Example
//!
//! ```
//! use chrono::{TimeZone, Utc};
//! use dashcal_ical::{ExpandOptions, parse_ical_with};
//!
//! let ics = "BEGIN:VEVENT\r\n\
//!            UID:standup\r\n\
//!            SUMMARY:Standup\r\n\
//!            DTSTART:20260105T090000Z\r\n\
//!            DTEND:20260105T091500Z\r\n\
//!            RRULE:FREQ=DAILY;COUNT=3\r\n\
//!            END:VEVENT\r\n";
//! let now = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
//! let events = parse_ical_with(ics, &ExpandOptions::new(Utc, now));
//! assert_eq!(events.len(), 3);
//! assert_eq!(events[0].id, "standup-2026-01-05T09:00:00.000Z");
//! ```

use chrono::TimeZone;

pub mod error;
pub mod expand;
#[cfg(feature = "fetch")]
pub mod fetch;
pub mod property;
pub mod rrule;
pub mod tokenizer;
pub mod working_event;

// Re-export main types at crate root
pub use dashcal_core::CalendarEvent;
pub use error::{FetchError, FetchErrorCode, FetchResult};
pub use expand::{DEFAULT_LOOKAHEAD_DAYS, DEFAULT_LOOKBEHIND_DAYS, ExpandOptions, expand_events};
#[cfg(feature = "fetch")]
pub use fetch::{CalendarFetcher, FetchConfig, fetch_calendar_events};
pub use rrule::{Frequency, RRule};
pub use tokenizer::tokenize;
pub use working_event::EventRecord;

/// Parses an iCalendar document in the local timezone, expanding around now.
///
/// Never fails: malformed content yields fewer events, never an error.
pub fn parse_ical(text: &str) -> Vec<CalendarEvent> {
    parse_ical_with(text, &ExpandOptions::local())
}

/// Parses an iCalendar document with explicit expansion options.
pub fn parse_ical_with<Tz: TimeZone>(text: &str, options: &ExpandOptions<Tz>) -> Vec<CalendarEvent> {
    let records = tokenize(text, &options.tz);
    expand_events(records, options)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_yields_nothing() {
        assert!(parse_ical("").is_empty());
        assert!(parse_ical("not a calendar").is_empty());
        assert!(parse_ical("BEGIN:VCALENDAR\r\nEND:VCALENDAR\r\n").is_empty());
    }
}
