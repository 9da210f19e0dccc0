//! HTTP client for calendar documents.

use chrono::{Local, TimeZone, Utc};
use dashcal_core::CalendarEvent;
use reqwest::{Client, Response};
use tracing::{debug, trace, warn};

use crate::error::{FetchError, FetchResult};
use crate::expand::ExpandOptions;
use crate::parse_ical_with;

use super::config::FetchConfig;

/// Fetches one iCalendar document over HTTP and expands it.
///
/// A failed request is reported as is; there is no retry.
pub struct CalendarFetcher {
    client: Client,
    config: FetchConfig,
}

impl CalendarFetcher {
    /// Creates a new fetcher with the given configuration.
    pub fn new(config: FetchConfig) -> FetchResult<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(&config.user_agent)
            .build()
            .map_err(|e| {
                FetchError::configuration(format!("Failed to create HTTP client: {}", e))
                    .with_source(e)
            })?;

        Ok(Self { client, config })
    }

    /// Downloads the document body.
    pub async fn fetch_text(&self) -> FetchResult<String> {
        let url = self.config.url_str();
        trace!(url = %url, "Sending request");

        let response = self
            .client
            .get(self.config.url.clone())
            .header("Accept", "text/calendar, text/plain;q=0.9, */*;q=0.8")
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        self.handle_response(response).await
    }

    /// Downloads and expands the calendar in the local timezone.
    pub async fn fetch_events(&self) -> FetchResult<Vec<CalendarEvent>> {
        let options = ExpandOptions::new(Local, Utc::now())
            .with_lookbehind(self.config.lookbehind())
            .with_lookahead(self.config.lookahead());
        self.fetch_events_with(&options).await
    }

    /// Downloads and expands the calendar with explicit options.
    pub async fn fetch_events_with<Tz: TimeZone>(
        &self,
        options: &ExpandOptions<Tz>,
    ) -> FetchResult<Vec<CalendarEvent>> {
        let text = self.fetch_text().await?;
        let events = parse_ical_with(&text, options);
        debug!(
            url = %self.config.url_str(),
            bytes = text.len(),
            events = events.len(),
            "Fetched calendar"
        );
        Ok(events)
    }

    /// Returns the configuration.
    pub fn config(&self) -> &FetchConfig {
        &self.config
    }

    fn transport_error(&self, e: reqwest::Error) -> FetchError {
        if e.is_timeout() {
            FetchError::timeout(format!(
                "No response from {} within {:?}",
                self.config.url_str(),
                self.config.timeout
            ))
            .with_source(e)
        } else {
            FetchError::network(format!("Request failed: {}", e)).with_source(e)
        }
    }

    /// Handles the HTTP response and extracts the body.
    async fn handle_response(&self, response: Response) -> FetchResult<String> {
        let status = response.status();
        trace!(status = %status, "Received response");

        if !status.is_success() {
            let reason = status.canonical_reason().unwrap_or("Unknown status");
            warn!(status = %status, url = %self.config.url_str(), "Calendar fetch failed");
            return Err(FetchError::http(status.as_u16(), reason));
        }

        response.text().await.map_err(|e| {
            if e.is_decode() {
                FetchError::invalid_response(format!("Failed to decode body: {}", e))
                    .with_source(e)
            } else {
                self.transport_error(e)
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn fetcher_creation() {
        let config = FetchConfig::new("https://example.com/calendar.ics")
            .unwrap()
            .with_timeout(Duration::from_secs(5));

        let fetcher = CalendarFetcher::new(config).unwrap();
        assert_eq!(fetcher.config().url_str(), "https://example.com/calendar.ics");
        assert_eq!(fetcher.config().timeout, Duration::from_secs(5));
    }
}
