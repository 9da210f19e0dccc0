//! RRULE grammar.
//!
//! Only the parts the expander understands are kept: FREQ, INTERVAL, BYDAY,
//! BYMONTHDAY, BYMONTH, COUNT and UNTIL. BYMONTH is parsed but the expander
//! never consults it.

use std::str::FromStr;

use chrono::{DateTime, TimeZone, Utc, Weekday};
use tracing::debug;

use crate::property::{PropertyKey, parse_date};

/// Recurrence frequency.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frequency {
    Daily,
    Weekly,
    Monthly,
    Yearly,
    /// A FREQ value the expander does not generate for (HOURLY, ...).
    Unsupported(String),
}

impl FromStr for Frequency {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.to_ascii_uppercase().as_str() {
            "DAILY" => Self::Daily,
            "WEEKLY" => Self::Weekly,
            "MONTHLY" => Self::Monthly,
            "YEARLY" => Self::Yearly,
            other => Self::Unsupported(other.to_string()),
        })
    }
}

/// A parsed recurrence rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RRule {
    pub freq: Frequency,
    /// Always at least 1.
    pub interval: u32,
    /// Weekdays for WEEKLY rules, in the order given.
    pub byday: Vec<Weekday>,
    /// Days of the month for MONTHLY rules, in the order given.
    pub bymonthday: Vec<i32>,
    pub bymonth: Vec<u32>,
    /// Total number of occurrences, the first one included.
    pub count: Option<u32>,
    /// Last allowed start (inclusive).
    pub until: Option<DateTime<Utc>>,
}

impl RRule {
    /// Parses an RRULE value such as `FREQ=WEEKLY;INTERVAL=2;BYDAY=MO,TH`.
    ///
    /// Returns `None` when no FREQ is present. Unknown parts and unparseable
    /// numbers are skipped. UNTIL follows the DTSTART date grammar, with
    /// floating values read in `tz`.
    pub fn parse<Tz: TimeZone>(raw: &str, tz: &Tz) -> Option<Self> {
        let mut freq = None;
        let mut rule = Self {
            freq: Frequency::Daily,
            interval: 1,
            byday: Vec::new(),
            bymonthday: Vec::new(),
            bymonth: Vec::new(),
            count: None,
            until: None,
        };

        for part in raw.split(';') {
            let Some((name, value)) = part.split_once('=') else {
                continue;
            };
            let value = value.trim();
            match name.trim().to_ascii_uppercase().as_str() {
                "FREQ" => freq = value.parse().ok(),
                "INTERVAL" => {
                    rule.interval = value.parse::<u32>().ok().filter(|i| *i > 0).unwrap_or(1)
                }
                "BYDAY" => rule.byday = value.split(',').filter_map(parse_weekday).collect(),
                "BYMONTHDAY" => rule.bymonthday = parse_list(value),
                "BYMONTH" => rule.bymonth = parse_list(value),
                "COUNT" => rule.count = value.parse().ok(),
                "UNTIL" => {
                    let key = PropertyKey::parse("UNTIL");
                    rule.until = parse_date(value, &key, tz).map(|d| d.at);
                }
                other => debug!(part = %other, "Ignoring RRULE part"),
            }
        }

        rule.freq = freq?;
        Some(rule)
    }
}

/// Parses a two-letter weekday code. Ordinal forms like `2TU` are not
/// supported and yield `None`.
pub fn parse_weekday(code: &str) -> Option<Weekday> {
    match code.trim().to_ascii_uppercase().as_str() {
        "MO" => Some(Weekday::Mon),
        "TU" => Some(Weekday::Tue),
        "WE" => Some(Weekday::Wed),
        "TH" => Some(Weekday::Thu),
        "FR" => Some(Weekday::Fri),
        "SA" => Some(Weekday::Sat),
        "SU" => Some(Weekday::Sun),
        other => {
            debug!(code = %other, "Unsupported BYDAY entry");
            None
        }
    }
}

fn parse_list<T: FromStr>(value: &str) -> Vec<T> {
    value
        .split(',')
        .filter_map(|item| item.trim().parse().ok())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_rule() {
        let rule = RRule::parse(
            "FREQ=WEEKLY;INTERVAL=2;BYDAY=MO,TH;COUNT=10;UNTIL=20261231T235959Z",
            &Utc,
        )
        .unwrap();
        assert_eq!(rule.freq, Frequency::Weekly);
        assert_eq!(rule.interval, 2);
        assert_eq!(rule.byday, vec![Weekday::Mon, Weekday::Thu]);
        assert_eq!(rule.count, Some(10));
        assert_eq!(
            rule.until,
            Some(Utc.with_ymd_and_hms(2026, 12, 31, 23, 59, 59).unwrap())
        );
    }

    #[test]
    fn defaults() {
        let rule = RRule::parse("FREQ=DAILY", &Utc).unwrap();
        assert_eq!(rule.interval, 1);
        assert!(rule.byday.is_empty());
        assert!(rule.bymonthday.is_empty());
        assert!(rule.count.is_none());
        assert!(rule.until.is_none());
    }

    #[test]
    fn missing_freq_is_none() {
        assert!(RRule::parse("INTERVAL=2;COUNT=3", &Utc).is_none());
        assert!(RRule::parse("", &Utc).is_none());
    }

    #[test]
    fn unsupported_freq_still_parses() {
        let rule = RRule::parse("FREQ=HOURLY;INTERVAL=4", &Utc).unwrap();
        assert_eq!(rule.freq, Frequency::Unsupported("HOURLY".to_string()));
        assert_eq!(rule.interval, 4);
    }

    #[test]
    fn zero_or_bad_interval_falls_back_to_one() {
        assert_eq!(RRule::parse("FREQ=DAILY;INTERVAL=0", &Utc).unwrap().interval, 1);
        assert_eq!(RRule::parse("FREQ=DAILY;INTERVAL=x", &Utc).unwrap().interval, 1);
    }

    #[test]
    fn month_lists() {
        let rule = RRule::parse("FREQ=MONTHLY;BYMONTHDAY=1,15,-1;BYMONTH=1,7", &Utc).unwrap();
        assert_eq!(rule.bymonthday, vec![1, 15, -1]);
        assert_eq!(rule.bymonth, vec![1, 7]);
    }

    #[test]
    fn date_only_until() {
        let rule = RRule::parse("FREQ=DAILY;UNTIL=20260110", &Utc).unwrap();
        assert_eq!(
            rule.until,
            Some(Utc.with_ymd_and_hms(2026, 1, 10, 0, 0, 0).unwrap())
        );
    }

    #[test]
    fn weekday_codes() {
        assert_eq!(parse_weekday("su"), Some(Weekday::Sun));
        assert_eq!(parse_weekday("2TU"), None);
        assert_eq!(parse_weekday("XX"), None);
    }
}
