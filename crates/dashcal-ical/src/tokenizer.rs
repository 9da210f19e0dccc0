//! Line tokenizer: unfolds content lines and collects VEVENT blocks.
//!
//! Everything outside `BEGIN:VEVENT`/`END:VEVENT` is skipped, VTIMEZONE
//! included. Components nested inside an event (VALARM) are skipped too, so
//! their DESCRIPTION or SUMMARY never leaks into the event.
//!
//! A folded continuation line is trimmed on both sides before it is appended
//! to the value it continues.

use chrono::TimeZone;
use tracing::debug;

use crate::property::{PropertyKey, apply_property, split_content_line};
use crate::working_event::{EventRecord, WorkingEvent};

/// A content line whose value may still grow through folded continuations.
struct PendingProperty {
    key: String,
    value: String,
}

/// Reads an iCalendar document and returns every complete VEVENT block.
///
/// Blocks without UID, DTSTART or DTEND are dropped.
pub fn tokenize<Tz: TimeZone>(text: &str, tz: &Tz) -> Vec<EventRecord> {
    let mut records = Vec::new();
    let mut current: Option<WorkingEvent> = None;
    let mut nested_depth = 0usize;
    let mut pending: Option<PendingProperty> = None;

    for line in text.lines() {
        if let Some(continuation) = line.strip_prefix([' ', '\t']) {
            if let Some(ref mut property) = pending {
                property.value.push_str(continuation.trim());
            }
            continue;
        }

        if let (Some(event), Some(property)) = (current.as_mut(), pending.take()) {
            let key = PropertyKey::parse(&property.key);
            apply_property(event, &key, &property.value, tz);
        }

        let line = line.trim_end();
        if line.is_empty() {
            continue;
        }

        let Some((key, value)) = split_content_line(line) else {
            continue;
        };

        if key.eq_ignore_ascii_case("BEGIN") {
            if value.eq_ignore_ascii_case("VEVENT") {
                if current.is_some() {
                    debug!("Discarding unterminated VEVENT");
                }
                current = Some(WorkingEvent::default());
                nested_depth = 0;
            } else if current.is_some() {
                nested_depth += 1;
            }
            continue;
        }

        if key.eq_ignore_ascii_case("END") {
            if value.eq_ignore_ascii_case("VEVENT") {
                if let Some(event) = current.take() {
                    finish_event(event, &mut records);
                }
            } else if current.is_some() {
                nested_depth = nested_depth.saturating_sub(1);
            }
            continue;
        }

        if current.is_some() && nested_depth == 0 {
            pending = Some(PendingProperty {
                key: key.to_string(),
                value: value.to_string(),
            });
        }
    }

    if let (Some(event), Some(property)) = (current.as_mut(), pending.take()) {
        let key = PropertyKey::parse(&property.key);
        apply_property(event, &key, &property.value, tz);
    }

    records
}

fn finish_event(event: WorkingEvent, records: &mut Vec<EventRecord>) {
    match event.finish() {
        Some(record) => {
            debug!(uid = %record.uid, start = %record.start, "Parsed VEVENT");
            records.push(record);
        }
        None => debug!("Dropping VEVENT without UID, DTSTART or DTEND"),
    }
}
