//! Agenda output.

use chrono::TimeZone;
use dashcal_core::CalendarEvent;

use crate::error::{ClientError, ClientResult};

/// Text shown when there is nothing to list.
pub const NO_EVENTS_TEXT: &str = "No events";

/// Renders one line per event in the given timezone.
///
/// Timed events read `YYYY-MM-DD HH:MM–HH:MM  Title`, all-day events
/// `YYYY-MM-DD (all day)  Title`. A location is appended in parentheses.
pub fn render_text<Tz>(events: &[CalendarEvent], tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    if events.is_empty() {
        return format!("{NO_EVENTS_TEXT}\n");
    }

    let mut out = String::new();
    for event in events {
        let start = event.start.with_timezone(tz);
        let when = if event.all_day {
            format!("{} (all day)", start.format("%Y-%m-%d"))
        } else {
            let end = event.end.with_timezone(tz);
            format!("{}–{}", start.format("%Y-%m-%d %H:%M"), end.format("%H:%M"))
        };
        out.push_str(&when);
        out.push_str("  ");
        out.push_str(&event.title);
        if let Some(location) = event.location.as_deref().filter(|l| !l.is_empty()) {
            out.push_str(&format!(" ({location})"));
        }
        out.push('\n');
    }
    out
}

/// Renders the events as a pretty-printed JSON array.
pub fn render_json(events: &[CalendarEvent]) -> ClientResult<String> {
    serde_json::to_string_pretty(events)
        .map_err(|e| ClientError::Output(format!("failed to serialize events: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, Utc};

    fn event(title: &str, y: i32, m: u32, d: u32, h: u32) -> CalendarEvent {
        let start = Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap();
        CalendarEvent::new(title, title, start, start + chrono::Duration::minutes(45))
    }

    #[test]
    fn text_in_local_zone() {
        let tz = FixedOffset::east_opt(2 * 3600).unwrap();
        let events = vec![
            event("Standup", 2026, 1, 5, 8).with_location(Some("Room 4".to_string())),
            event("Retro", 2026, 1, 5, 22),
        ];
        insta::assert_snapshot!(render_text(&events, &tz), @r"
        2026-01-05 10:00–10:45  Standup (Room 4)
        2026-01-06 00:00–00:45  Retro
        ");
    }

    #[test]
    fn all_day_text() {
        let tz = FixedOffset::west_opt(5 * 3600).unwrap();
        let start = tz
            .with_ymd_and_hms(2026, 3, 1, 0, 0, 0)
            .unwrap()
            .with_timezone(&Utc);
        let holiday = CalendarEvent::new("h", "Holiday", start, start + chrono::Duration::days(1))
            .with_all_day(true);
        assert_eq!(
            render_text(&[holiday], &tz),
            "2026-03-01 (all day)  Holiday\n"
        );
    }

    #[test]
    fn empty_text() {
        assert_eq!(render_text(&[], &Utc), "No events\n");
    }

    #[test]
    fn json_omits_absent_fields() {
        let events = vec![
            event("Standup", 2026, 1, 5, 8).with_description(Some("Daily sync".to_string())),
        ];
        insta::assert_snapshot!(render_json(&events).unwrap(), @r#"
        [
          {
            "id": "Standup-2026-01-05T08:00:00.000Z",
            "title": "Standup",
            "start": "2026-01-05T08:00:00Z",
            "end": "2026-01-05T08:45:00Z",
            "description": "Daily sync",
            "all_day": false
          }
        ]
        "#);
    }
}
