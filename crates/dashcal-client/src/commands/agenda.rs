//! Default command: load a calendar and print its agenda.

use std::path::Path;
use std::time::Duration;

use chrono::{Local, TimeDelta, Utc};
use dashcal_core::CalendarEvent;
use dashcal_ical::{CalendarFetcher, ExpandOptions, FetchConfig, parse_ical_with};
use tracing::{debug, info};

use crate::cli::Cli;
use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};
use crate::render::{render_json, render_text};

/// Effective agenda settings after CLI flags are applied over the file.
#[derive(Debug, Clone, PartialEq)]
pub struct AgendaSettings {
    pub source: String,
    pub timeout: Duration,
    pub lookbehind_days: u32,
    pub lookahead_days: u32,
    pub limit: Option<usize>,
    pub json: bool,
}

impl AgendaSettings {
    /// Merges CLI flags over configuration values.
    pub fn resolve(cli: &Cli, config: &ClientConfig) -> ClientResult<Self> {
        let source = cli
            .source
            .clone()
            .or_else(|| config.calendar.url.clone())
            .ok_or_else(|| {
                ClientError::Config(
                    "no calendar source: pass a URL or file, or set calendar.url".to_string(),
                )
            })?;

        Ok(Self {
            source,
            timeout: Duration::from_secs(config.calendar.timeout_secs),
            lookbehind_days: cli
                .lookbehind_days
                .unwrap_or(config.calendar.lookbehind_days),
            lookahead_days: cli.lookahead_days.unwrap_or(config.calendar.lookahead_days),
            limit: cli.limit.or(config.display.limit),
            json: cli.json || config.display.json,
        })
    }

    /// Returns true if the source should be fetched over HTTP.
    pub fn is_remote(&self) -> bool {
        let lower = self.source.to_ascii_lowercase();
        lower.starts_with("http://") || lower.starts_with("https://")
    }
}

/// Loads the calendar and prints it to stdout.
pub async fn run(cli: &Cli, config: &ClientConfig) -> ClientResult<()> {
    let settings = AgendaSettings::resolve(cli, config)?;
    let mut events = load_events(&settings).await?;
    if let Some(limit) = settings.limit {
        events.truncate(limit);
    }

    if settings.json {
        println!("{}", render_json(&events)?);
    } else {
        print!("{}", render_text(&events, &Local));
    }
    Ok(())
}

async fn load_events(settings: &AgendaSettings) -> ClientResult<Vec<CalendarEvent>> {
    if settings.is_remote() {
        info!(url = %settings.source, "Fetching calendar");
        let config = FetchConfig::new(&settings.source)
            .map_err(|e| ClientError::Config(format!("invalid calendar URL: {}", e)))?
            .with_timeout(settings.timeout)
            .with_lookbehind_days(settings.lookbehind_days)
            .with_lookahead_days(settings.lookahead_days);
        let fetcher = CalendarFetcher::new(config)?;
        Ok(fetcher.fetch_events().await?)
    } else {
        read_file(Path::new(&settings.source), settings)
    }
}

fn read_file(path: &Path, settings: &AgendaSettings) -> ClientResult<Vec<CalendarEvent>> {
    debug!(path = %path.display(), "Reading calendar file");
    let text = std::fs::read_to_string(path)?;
    let options = ExpandOptions::new(Local, Utc::now())
        .with_lookbehind(TimeDelta::days(i64::from(settings.lookbehind_days)))
        .with_lookahead(TimeDelta::days(i64::from(settings.lookahead_days)));
    Ok(parse_ical_with(&text, &options))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use std::io::Write;

    fn cli(args: &[&str]) -> Cli {
        let mut argv = vec!["dashcal"];
        argv.extend_from_slice(args);
        Cli::try_parse_from(argv).unwrap()
    }

    #[test]
    fn flags_override_config() {
        let mut config = ClientConfig::default();
        config.calendar.url = Some("https://example.com/a.ics".to_string());
        config.display.limit = Some(3);

        let settings = AgendaSettings::resolve(
            &cli(&["--limit", "10", "--lookbehind-days", "0", "b.ics"]),
            &config,
        )
        .unwrap();
        assert_eq!(settings.source, "b.ics");
        assert_eq!(settings.limit, Some(10));
        assert_eq!(settings.lookbehind_days, 0);
        assert_eq!(settings.lookahead_days, 365);
        assert!(!settings.is_remote());
    }

    #[test]
    fn config_url_is_the_fallback_source() {
        let mut config = ClientConfig::default();
        config.calendar.url = Some("HTTPS://example.com/a.ics".to_string());
        config.display.json = true;

        let settings = AgendaSettings::resolve(&cli(&[]), &config).unwrap();
        assert!(settings.is_remote());
        assert!(settings.json);
        assert_eq!(settings.timeout, Duration::from_secs(10));
    }

    #[test]
    fn missing_source_is_a_config_error() {
        let err = AgendaSettings::resolve(&cli(&[]), &ClientConfig::default()).unwrap_err();
        assert!(matches!(err, ClientError::Config(_)));
    }

    #[test]
    fn reads_local_file() {
        let start = Utc::now() + TimeDelta::days(1);
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            "BEGIN:VCALENDAR\r\nBEGIN:VEVENT\r\nUID:local\r\nSUMMARY:From disk\r\n\
             DTSTART:{}\r\nDTEND:{}\r\nEND:VEVENT\r\nEND:VCALENDAR\r\n",
            start.format("%Y%m%dT%H%M%SZ"),
            (start + TimeDelta::hours(1)).format("%Y%m%dT%H%M%SZ"),
        )
        .unwrap();

        let settings = AgendaSettings {
            source: file.path().display().to_string(),
            timeout: Duration::from_secs(1),
            lookbehind_days: 14,
            lookahead_days: 365,
            limit: None,
            json: false,
        };
        let events = read_file(file.path(), &settings).unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].title, "From disk");
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nope.ics");
        let settings = AgendaSettings {
            source: path.display().to_string(),
            timeout: Duration::from_secs(1),
            lookbehind_days: 14,
            lookahead_days: 365,
            limit: None,
            json: false,
        };
        let err = read_file(&path, &settings).unwrap_err();
        assert!(matches!(err, ClientError::Io(_)));
    }
}
