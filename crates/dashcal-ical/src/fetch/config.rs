//! Fetch adapter configuration.

use std::time::Duration;

use chrono::TimeDelta;
use url::Url;

use crate::expand::{DEFAULT_LOOKAHEAD_DAYS, DEFAULT_LOOKBEHIND_DAYS};

/// Configuration for fetching and expanding a remote calendar.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// Location of the iCalendar document.
    pub url: Url,

    /// The request is abandoned after this long.
    pub timeout: Duration,

    /// User agent string.
    pub user_agent: String,

    /// Days before now that occurrences are kept.
    pub lookbehind_days: u32,

    /// Days after now that occurrences are generated.
    pub lookahead_days: u32,
}

impl FetchConfig {
    /// Default timeout in seconds.
    pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

    /// Creates a new configuration for the given URL.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is invalid.
    pub fn new(url: impl AsRef<str>) -> Result<Self, url::ParseError> {
        let parsed = Url::parse(url.as_ref())?;
        Ok(Self {
            url: parsed,
            timeout: Duration::from_secs(Self::DEFAULT_TIMEOUT_SECS),
            user_agent: format!("dashcal/{}", env!("CARGO_PKG_VERSION")),
            lookbehind_days: DEFAULT_LOOKBEHIND_DAYS as u32,
            lookahead_days: DEFAULT_LOOKAHEAD_DAYS as u32,
        })
    }

    /// Sets the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the user agent string.
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Sets the lookbehind in days.
    pub fn with_lookbehind_days(mut self, days: u32) -> Self {
        self.lookbehind_days = days;
        self
    }

    /// Sets the lookahead in days.
    pub fn with_lookahead_days(mut self, days: u32) -> Self {
        self.lookahead_days = days;
        self
    }

    /// Returns the URL as a string.
    pub fn url_str(&self) -> &str {
        self.url.as_str()
    }

    /// Lookbehind as a chrono duration.
    pub fn lookbehind(&self) -> TimeDelta {
        TimeDelta::days(i64::from(self.lookbehind_days))
    }

    /// Lookahead as a chrono duration.
    pub fn lookahead(&self) -> TimeDelta {
        TimeDelta::days(i64::from(self.lookahead_days))
    }
}
