//! Core types: calendar events, time windows, tracing setup

pub mod event;
pub mod time;
pub mod tracing;

pub use event::{CalendarEvent, occurrence_id, sort_by_start};
pub use time::{
    TimeWindow, iso_millis, local_date, local_naive, resolve_local, same_local_date,
};
pub use tracing::{TracingConfig, TracingError, TracingOutputFormat, init_tracing};
