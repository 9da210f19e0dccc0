//! Recurrence expansion.
//!
//! Records sharing a UID form a group: one master (the recurring or plain
//! event) plus any number of RECURRENCE-ID overrides. Each group expands to
//! concrete [`CalendarEvent`]s inside a window around "now":
//!
//! 1. the master start and every RDATE, unless listed in EXDATE
//! 2. RRULE occurrences (DAILY, WEEKLY, MONTHLY, YEARLY), bounded by
//!    UNTIL, COUNT and the window end
//! 3. overrides remove the occurrence they replace (same instant or same
//!    local date) and, unless cancelled, add their own instance
//!
//! The combined list is sorted by start time.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Datelike, Duration, Local, NaiveDate, NaiveDateTime, TimeZone, Utc};
use dashcal_core::{
    CalendarEvent, TimeWindow, local_naive, resolve_local, same_local_date, sort_by_start,
};
use tracing::{debug, warn};

use crate::rrule::{Frequency, RRule};
use crate::working_event::EventRecord;

/// Default number of days before "now" that occurrences are kept.
pub const DEFAULT_LOOKBEHIND_DAYS: i64 = 14;

/// Default number of days after "now" that occurrences are generated.
pub const DEFAULT_LOOKAHEAD_DAYS: i64 = 365;

/// Inputs that are not part of the document: local timezone, current time
/// and the expansion window.
#[derive(Debug, Clone)]
pub struct ExpandOptions<Tz: TimeZone> {
    /// Zone used for floating times, all-day dates and recurrence arithmetic.
    pub tz: Tz,
    /// The instant the window is centred on.
    pub now: DateTime<Utc>,
    /// How far before `now` occurrences are kept.
    pub lookbehind: Duration,
    /// How far after `now` occurrences are generated.
    pub lookahead: Duration,
}

impl ExpandOptions<Local> {
    /// Options for the process-local timezone at the current time.
    pub fn local() -> Self {
        Self::new(Local, Utc::now())
    }
}

impl<Tz: TimeZone> ExpandOptions<Tz> {
    /// Creates options with the default window.
    pub fn new(tz: Tz, now: DateTime<Utc>) -> Self {
        Self {
            tz,
            now,
            lookbehind: Duration::days(DEFAULT_LOOKBEHIND_DAYS),
            lookahead: Duration::days(DEFAULT_LOOKAHEAD_DAYS),
        }
    }

    /// Sets how far before `now` occurrences are kept.
    pub fn with_lookbehind(mut self, lookbehind: Duration) -> Self {
        self.lookbehind = lookbehind;
        self
    }

    /// Sets how far after `now` occurrences are generated.
    pub fn with_lookahead(mut self, lookahead: Duration) -> Self {
        self.lookahead = lookahead;
        self
    }

    /// Returns the expansion window.
    pub fn window(&self) -> TimeWindow {
        TimeWindow::around(self.now, self.lookbehind, self.lookahead)
    }
}

/// Expands parsed records into a start-sorted list of occurrences.
pub fn expand_events<Tz: TimeZone>(
    records: Vec<EventRecord>,
    options: &ExpandOptions<Tz>,
) -> Vec<CalendarEvent> {
    let window = options.window();
    let mut events: Vec<CalendarEvent> = group_by_uid(records)
        .into_iter()
        .flat_map(|(uid, group)| expand_group(&uid, group, &window, &options.tz))
        .collect();
    sort_by_start(&mut events);
    events
}

/// Groups records by UID, keeping groups in order of first appearance.
fn group_by_uid(records: Vec<EventRecord>) -> Vec<(String, Vec<EventRecord>)> {
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut groups: Vec<(String, Vec<EventRecord>)> = Vec::new();
    for record in records {
        match index.get(&record.uid) {
            Some(&i) => groups[i].1.push(record),
            None => {
                index.insert(record.uid.clone(), groups.len());
                groups.push((record.uid.clone(), vec![record]));
            }
        }
    }
    groups
}

fn expand_group<Tz: TimeZone>(
    uid: &str,
    group: Vec<EventRecord>,
    window: &TimeWindow,
    tz: &Tz,
) -> Vec<CalendarEvent> {
    let (candidates, overrides): (Vec<_>, Vec<_>) =
        group.into_iter().partition(EventRecord::is_master_candidate);

    let Some(master) = select_master(candidates) else {
        debug!(uid = %uid, count = overrides.len(), "Group has only overrides");
        return overrides
            .iter()
            .map(|record| standalone_event(uid, record))
            .collect();
    };

    let mut events: Vec<CalendarEvent> = occurrence_starts(&master, window, tz)
        .into_iter()
        .map(|start| master_occurrence(uid, &master, start))
        .collect();
    let generated = events.len();

    for record in &overrides {
        apply_override(uid, &master, record, &mut events, tz);
    }

    debug!(
        uid = %uid,
        generated,
        overrides = overrides.len(),
        total = events.len(),
        "Expanded event group"
    );
    events
}

/// Picks the record with an RRULE, else the earliest non-override record.
fn select_master(candidates: Vec<EventRecord>) -> Option<EventRecord> {
    let mut candidates = candidates.into_iter();
    let first = candidates.next()?;
    let mut best = first;
    for candidate in candidates {
        let better = match (best.rrule.is_some(), candidate.rrule.is_some()) {
            (false, true) => true,
            (true, _) => false,
            (false, false) => candidate.start < best.start,
        };
        if better {
            best = candidate;
        }
    }
    Some(best)
}

/// All starts of the master inside the window: its own start, RDATEs and
/// RRULE occurrences, minus EXDATEs, without duplicates.
fn occurrence_starts<Tz: TimeZone>(
    master: &EventRecord,
    window: &TimeWindow,
    tz: &Tz,
) -> Vec<DateTime<Utc>> {
    let mut starts = Vec::new();
    let mut seen = HashSet::new();
    let mut offer = |start: DateTime<Utc>| {
        if window.contains(start) && !master.is_excluded(start) && seen.insert(start) {
            starts.push(start);
        }
    };

    offer(master.start);
    master.rdates.iter().copied().for_each(&mut offer);

    if let Some(raw) = master.rrule.as_deref() {
        match RRule::parse(raw, tz) {
            Some(rule) => {
                let upper = window.end_capped_by(rule.until);
                generate(master.start, &rule, upper, tz)
                    .into_iter()
                    .for_each(&mut offer);
            }
            None => warn!(uid = %master.uid, rrule = %raw, "RRULE without FREQ, not expanding"),
        }
    }

    starts
}

/// Collects RRULE occurrences after `master_start`, up to `upper`.
struct Generator<'a, Tz: TimeZone> {
    tz: &'a Tz,
    master_start: DateTime<Utc>,
    upper: DateTime<Utc>,
    /// Occurrences still allowed by COUNT; `None` when unbounded.
    remaining: Option<u32>,
    out: Vec<DateTime<Utc>>,
}

impl<Tz: TimeZone> Generator<'_, Tz> {
    /// Offers one candidate; returns false once generation must stop.
    fn offer(&mut self, candidate: NaiveDateTime) -> bool {
        let Some(at) = resolve_local(self.tz, candidate) else {
            return true;
        };
        if at <= self.master_start {
            return true;
        }
        if at > self.upper {
            return false;
        }
        self.out.push(at);
        match self.remaining.as_mut() {
            Some(remaining) => {
                *remaining -= 1;
                *remaining > 0
            }
            None => true,
        }
    }

    fn offer_date(&mut self, date: NaiveDate, anchor: NaiveDateTime) -> bool {
        self.offer(date.and_time(anchor.time()))
    }
}

/// Generates occurrences strictly after the master start.
///
/// COUNT includes the master start, so at most `COUNT - 1` are produced.
/// Every occurrence of the rule counts towards COUNT, whether or not it is
/// later excluded or outside the window.
fn generate<Tz: TimeZone>(
    master_start: DateTime<Utc>,
    rule: &RRule,
    upper: DateTime<Utc>,
    tz: &Tz,
) -> Vec<DateTime<Utc>> {
    let remaining = rule.count.map(|count| count.saturating_sub(1));
    if remaining == Some(0) {
        return Vec::new();
    }

    let anchor = local_naive(master_start, tz);
    let interval = i64::from(rule.interval.max(1));
    let mut generator = Generator {
        tz,
        master_start,
        upper,
        remaining,
        out: Vec::new(),
    };

    match &rule.freq {
        Frequency::Daily => {
            for step in 1.. {
                let Some(candidate) = anchor.checked_add_signed(Duration::days(step * interval))
                else {
                    break;
                };
                if !generator.offer(candidate) {
                    break;
                }
            }
        }
        Frequency::Weekly => {
            let mut days = if rule.byday.is_empty() {
                vec![anchor.weekday()]
            } else {
                rule.byday.clone()
            };
            days.sort_by_key(|d| d.num_days_from_monday());
            days.dedup();

            let week_start = anchor.date()
                - Duration::days(i64::from(anchor.weekday().num_days_from_monday()));
            'weeks: for week in 0.. {
                let Some(monday) =
                    week_start.checked_add_signed(Duration::weeks(week * interval))
                else {
                    break;
                };
                for day in &days {
                    let Some(date) = monday
                        .checked_add_signed(Duration::days(i64::from(day.num_days_from_monday())))
                    else {
                        break 'weeks;
                    };
                    if !generator.offer_date(date, anchor) {
                        break 'weeks;
                    }
                }
            }
        }
        Frequency::Monthly => {
            let mut monthdays: Vec<u32> = if rule.bymonthday.is_empty() {
                vec![anchor.day()]
            } else {
                rule.bymonthday
                    .iter()
                    .filter_map(|d| u32::try_from(*d).ok())
                    .filter(|d| (1..=31).contains(d))
                    .collect()
            };
            monthdays.sort_unstable();
            monthdays.dedup();
            if monthdays.is_empty() {
                debug!("No usable BYMONTHDAY values");
                return generator.out;
            }

            let first_month = i64::from(anchor.year()) * 12 + i64::from(anchor.month0());
            'months: for month in 0.. {
                let Some(first) = first_of_month(first_month + month * interval) else {
                    break;
                };
                for day in &monthdays {
                    let Some(date) = overflowing_day(first, *day) else {
                        break 'months;
                    };
                    if !generator.offer_date(date, anchor) {
                        break 'months;
                    }
                }
            }
        }
        Frequency::Yearly => {
            for year in 1.. {
                let Some(first) = i32::try_from(i64::from(anchor.year()) + year * interval)
                    .ok()
                    .and_then(|y| NaiveDate::from_ymd_opt(y, anchor.month(), 1))
                else {
                    break;
                };
                let Some(date) = overflowing_day(first, anchor.day()) else {
                    break;
                };
                if !generator.offer_date(date, anchor) {
                    break;
                }
            }
        }
        Frequency::Unsupported(freq) => {
            warn!(freq = %freq, "Unsupported RRULE frequency, not expanding");
        }
    }

    generator.out
}

/// First day of the month numbered `year * 12 + month0`.
fn first_of_month(months: i64) -> Option<NaiveDate> {
    let year = i32::try_from(months.div_euclid(12)).ok()?;
    let month = u32::try_from(months.rem_euclid(12)).ok()? + 1;
    NaiveDate::from_ymd_opt(year, month, 1)
}

/// Day `day` of the month starting at `first`; days past the end of the
/// month roll over into the next one (April 31st is May 1st).
fn overflowing_day(first: NaiveDate, day: u32) -> Option<NaiveDate> {
    first.checked_add_signed(Duration::days(i64::from(day) - 1))
}

fn master_occurrence(uid: &str, master: &EventRecord, start: DateTime<Utc>) -> CalendarEvent {
    let duration = master.end - master.start;
    CalendarEvent::new(
        uid,
        master.title.clone().unwrap_or_default(),
        start,
        start
            .checked_add_signed(duration)
            .unwrap_or(DateTime::<Utc>::MAX_UTC),
    )
    .with_description(master.description.clone())
    .with_location(master.location.clone())
    .with_all_day(master.all_day)
}

fn standalone_event(uid: &str, record: &EventRecord) -> CalendarEvent {
    CalendarEvent::new(
        uid,
        record.title.clone().unwrap_or_default(),
        record.start,
        record.end,
    )
    .with_description(record.description.clone())
    .with_location(record.location.clone())
    .with_all_day(record.all_day)
}

/// Replaces (or deletes) the occurrence named by the override's RECURRENCE-ID.
///
/// An occurrence matches when it starts at the RECURRENCE-ID instant or on
/// the same local date.
fn apply_override<Tz: TimeZone>(
    uid: &str,
    master: &EventRecord,
    record: &EventRecord,
    events: &mut Vec<CalendarEvent>,
    tz: &Tz,
) {
    let Some(recurrence_id) = record.recurrence_id else {
        return;
    };
    events.retain(|e| e.start != recurrence_id && !same_local_date(e.start, recurrence_id, tz));

    if record.is_cancelled() {
        debug!(uid = %uid, recurrence_id = %recurrence_id, "Occurrence cancelled");
        return;
    }

    let replacement = CalendarEvent::new(
        uid,
        record
            .title
            .clone()
            .or_else(|| master.title.clone())
            .unwrap_or_default(),
        record.start,
        record.end,
    )
    .with_description(record.description.clone().or_else(|| master.description.clone()))
    .with_location(record.location.clone().or_else(|| master.location.clone()))
    .with_all_day(record.all_day);

    events.retain(|e| e.start != replacement.start);
    events.push(replacement);
}
