//! Per-VEVENT records produced by the tokenizer.
//!
//! A [`WorkingEvent`] is filled in property by property while its block is
//! being read. Once `END:VEVENT` is reached it is turned into an
//! [`EventRecord`], which only exists if UID, DTSTART and DTEND resolved.

use chrono::{DateTime, Utc};

/// Status value marking an override as a deleted occurrence.
pub const STATUS_CANCELLED: &str = "CANCELLED";

/// An event block that is still being read.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorkingEvent {
    /// The iCalendar UID. Shared by a recurring master and its overrides.
    pub uid: Option<String>,
    pub title: Option<String>,
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
    /// DTSTART was a date without a time.
    pub all_day: bool,
    pub description: Option<String>,
    pub location: Option<String>,
    /// Raw RRULE value, parsed during expansion.
    pub rrule: Option<String>,
    pub exdates: Vec<DateTime<Utc>>,
    pub rdates: Vec<DateTime<Utc>>,
    /// Set on records that replace one occurrence of a recurring master.
    pub recurrence_id: Option<DateTime<Utc>>,
    pub status: Option<String>,
}

impl WorkingEvent {
    /// Finalizes the block, or returns `None` if UID, DTSTART or DTEND is missing.
    pub fn finish(self) -> Option<EventRecord> {
        let (Some(uid), Some(start), Some(end)) = (self.uid, self.start, self.end) else {
            return None;
        };
        Some(EventRecord {
            uid,
            title: self.title,
            start,
            end,
            all_day: self.all_day,
            description: self.description,
            location: self.location,
            rrule: self.rrule,
            exdates: self.exdates,
            rdates: self.rdates,
            recurrence_id: self.recurrence_id,
            status: self.status,
        })
    }
}

/// A complete VEVENT block, ready for grouping and expansion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventRecord {
    pub uid: String,
    pub title: Option<String>,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub all_day: bool,
    pub description: Option<String>,
    pub location: Option<String>,
    pub rrule: Option<String>,
    pub exdates: Vec<DateTime<Utc>>,
    pub rdates: Vec<DateTime<Utc>>,
    pub recurrence_id: Option<DateTime<Utc>>,
    pub status: Option<String>,
}

impl EventRecord {
    /// A record can be a master if it recurs or does not override anything.
    pub fn is_master_candidate(&self) -> bool {
        self.rrule.is_some() || self.recurrence_id.is_none()
    }

    /// Returns true if the record deletes the occurrence it overrides.
    pub fn is_cancelled(&self) -> bool {
        self.status
            .as_deref()
            .is_some_and(|s| s.eq_ignore_ascii_case(STATUS_CANCELLED))
    }

    /// Returns true if `at` is listed in EXDATE.
    pub fn is_excluded(&self, at: DateTime<Utc>) -> bool {
        self.exdates.contains(&at)
    }
}
