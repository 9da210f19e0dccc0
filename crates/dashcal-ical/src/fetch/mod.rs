//! HTTP fetch adapter.
//!
//! Downloads an iCalendar document and hands it to the parser. Requests are
//! bounded by [`FetchConfig::timeout`]; failures surface as [`FetchError`]
//! with no retry.
//!
//! # Example
//!
//! ```ignore
//! use dashcal_ical::fetch_calendar_events;
//!
//! let events = fetch_calendar_events("https://example.com/team.ics").await?;
//! ```
//!
//! [`FetchError`]: crate::FetchError

mod client;
mod config;

pub use client::CalendarFetcher;
pub use config::FetchConfig;

use dashcal_core::CalendarEvent;

use crate::error::{FetchError, FetchResult};

/// Fetches `url` with the default configuration and returns its expanded events.
pub async fn fetch_calendar_events(url: &str) -> FetchResult<Vec<CalendarEvent>> {
    let config = FetchConfig::new(url).map_err(|e| {
        FetchError::configuration(format!("Invalid calendar URL {:?}: {}", url, e)).with_source(e)
    })?;
    CalendarFetcher::new(config)?.fetch_events().await
}
