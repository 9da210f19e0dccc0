//! Property interpretation: `KEY;PARAM=VAL:VALUE` lines to event fields.

use std::sync::LazyLock;

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, TimeZone, Utc};
use dashcal_core::resolve_local;
use regex::Regex;
use tracing::{debug, warn};

use crate::working_event::WorkingEvent;

/// `YYYYMMDD[THHMMSS[Z|±HHMM]]`
static DATE_VALUE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d{4})(\d{2})(\d{2})(?:T(\d{2})(\d{2})(\d{2})(Z|[+-]\d{2}:?\d{2})?)?")
        .expect("Invalid date value regex")
});

/// The name and parameters of a content line, e.g. `DTSTART;TZID=Europe/Madrid`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyKey {
    /// Upper-cased property name.
    pub name: String,
    /// Parameters in order of appearance, names upper-cased, quotes stripped.
    pub params: Vec<(String, String)>,
}

impl PropertyKey {
    /// Parses the part of a content line before the value separator.
    pub fn parse(raw: &str) -> Self {
        let mut parts = split_unquoted(raw, ';').into_iter();
        let name = parts.next().unwrap_or_default().trim().to_ascii_uppercase();
        let params = parts
            .filter_map(|param| {
                let (key, value) = param.split_once('=')?;
                Some((
                    key.trim().to_ascii_uppercase(),
                    value.trim().trim_matches('"').to_string(),
                ))
            })
            .collect();
        Self { name, params }
    }

    /// Returns the value of the first parameter named `name`.
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Returns true if `VALUE=DATE` is present.
    pub fn is_date_value(&self) -> bool {
        self.param("VALUE")
            .is_some_and(|v| v.eq_ignore_ascii_case("DATE"))
    }
}

/// A parsed DTSTART/DTEND/EXDATE/... value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateValue {
    /// The resolved instant.
    pub at: DateTime<Utc>,
    /// The value named a calendar date rather than a time of day.
    pub date_only: bool,
}

/// Splits a content line into key and value at the first `:` outside quotes.
///
/// Returns `None` for lines without a separator.
pub fn split_content_line(line: &str) -> Option<(&str, &str)> {
    let mut quoted = false;
    for (idx, c) in line.char_indices() {
        match c {
            '"' => quoted = !quoted,
            ':' if !quoted => return Some((&line[..idx], &line[idx + 1..])),
            _ => {}
        }
    }
    None
}

/// Applies one property to the event being read.
pub fn apply_property<Tz: TimeZone>(
    event: &mut WorkingEvent,
    key: &PropertyKey,
    value: &str,
    tz: &Tz,
) {
    match key.name.as_str() {
        "UID" => event.uid = Some(value.to_string()),
        "SUMMARY" => event.title = Some(unescape(value)),
        "DESCRIPTION" => event.description = Some(unescape(value)),
        "LOCATION" => event.location = Some(unescape(value)),
        "DTSTART" => {
            if let Some(date) = parse_logged(value, key, tz) {
                event.start = Some(date.at);
                event.all_day = date.date_only;
            }
        }
        "DTEND" => event.end = parse_logged(value, key, tz).map(|d| d.at),
        "RECURRENCE-ID" => event.recurrence_id = parse_logged(value, key, tz).map(|d| d.at),
        "RRULE" => event.rrule = Some(value.to_string()),
        "STATUS" => event.status = Some(value.to_string()),
        "EXDATE" => event.exdates.extend(parse_date_list(value, key, tz)),
        "RDATE" => event.rdates.extend(parse_date_list(value, key, tz)),
        _ => {}
    }
}

fn parse_logged<Tz: TimeZone>(value: &str, key: &PropertyKey, tz: &Tz) -> Option<DateValue> {
    let parsed = parse_date(value, key, tz);
    if parsed.is_none() {
        warn!(property = %key.name, value = %value, "Unparseable date value");
    }
    parsed
}

fn parse_date_list<'a, Tz: TimeZone>(
    value: &'a str,
    key: &'a PropertyKey,
    tz: &'a Tz,
) -> impl Iterator<Item = DateTime<Utc>> + 'a {
    value
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .filter_map(move |item| parse_logged(item, key, tz).map(|d| d.at))
}

/// Parses an iCalendar date or date-time value.
///
/// - `YYYYMMDD`, or any value with `VALUE=DATE`: local midnight of that date
/// - `...THHMMSSZ`: UTC
/// - `...THHMMSS±HHMM`: fixed offset from UTC
/// - anything else, including `TZID=` values: wall-clock time in `tz`
pub fn parse_date<Tz: TimeZone>(value: &str, key: &PropertyKey, tz: &Tz) -> Option<DateValue> {
    let caps = DATE_VALUE_REGEX.captures(value.trim())?;
    let number = |i: usize| caps.get(i).and_then(|m| m.as_str().parse::<u32>().ok());

    let year = caps.get(1)?.as_str().parse::<i32>().ok()?;
    let date = NaiveDate::from_ymd_opt(year, number(2)?, number(3)?)?;

    if key.is_date_value() || caps.get(4).is_none() {
        let at = resolve_local(tz, date.and_time(NaiveTime::MIN))?;
        return Some(DateValue { at, date_only: true });
    }

    let naive = date.and_time(NaiveTime::from_hms_opt(number(4)?, number(5)?, number(6)?)?);
    let at = match caps.get(7).map(|m| m.as_str()) {
        Some("Z") => Utc.from_utc_datetime(&naive),
        Some(offset) => {
            let shifted = naive - Duration::minutes(offset_minutes(offset)?);
            Utc.from_utc_datetime(&shifted)
        }
        None => {
            if let Some(tzid) = key.param("TZID") {
                debug!(tzid = %tzid, "Treating TZID time as local wall-clock");
            }
            resolve_local(tz, naive)?
        }
    };
    Some(DateValue {
        at,
        date_only: false,
    })
}

/// `+0130` / `-05:00` to signed minutes.
fn offset_minutes(offset: &str) -> Option<i64> {
    let sign = if offset.starts_with('-') { -1 } else { 1 };
    let digits: String = offset.chars().filter(char::is_ascii_digit).collect();
    let hours = digits.get(..2)?.parse::<i64>().ok()?;
    let minutes = digits.get(2..4)?.parse::<i64>().ok()?;
    Some(sign * (hours * 60 + minutes))
}

/// Unescapes an iCalendar TEXT value in a single left-to-right pass.
///
/// Unknown escapes are kept verbatim.
pub fn unescape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') | Some('N') => out.push('\n'),
            Some(c @ (',' | ';' | '\\')) => out.push(c),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}

fn split_unquoted(s: &str, sep: char) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut quoted = false;
    let mut begin = 0;
    for (idx, c) in s.char_indices() {
        if c == '"' {
            quoted = !quoted;
        } else if c == sep && !quoted {
            parts.push(&s[begin..idx]);
            begin = idx + c.len_utf8();
        }
    }
    parts.push(&s[begin..]);
    parts
}
