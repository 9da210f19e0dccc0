//! Fetch adapter against a throwaway local HTTP server.
#![cfg(feature = "fetch")]

use std::time::Duration;

use chrono::{TimeZone, Utc};
use dashcal_ical::{
    CalendarFetcher, ExpandOptions, FetchConfig, FetchErrorCode, fetch_calendar_events,
};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

const ICS: &str = "BEGIN:VCALENDAR\r\n\
                   BEGIN:VEVENT\r\n\
                   UID:served\r\n\
                   SUMMARY:Served over HTTP\r\n\
                   DTSTART:20260110T100000Z\r\n\
                   DTEND:20260110T110000Z\r\n\
                   RRULE:FREQ=DAILY;COUNT=2\r\n\
                   END:VEVENT\r\n\
                   END:VCALENDAR\r\n";

/// Answers a single request with `status_line` and `body`, returning the base URL.
async fn serve_once(status_line: &'static str, body: &'static str) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut request = Vec::new();
        let mut buf = [0u8; 1024];
        loop {
            let n = socket.read(&mut buf).await.unwrap();
            if n == 0 {
                break;
            }
            request.extend_from_slice(&buf[..n]);
            if request.windows(4).any(|w| w == b"\r\n\r\n") {
                break;
            }
        }
        let response = format!(
            "HTTP/1.1 {status_line}\r\n\
             Content-Type: text/calendar; charset=utf-8\r\n\
             Content-Length: {}\r\n\
             Connection: close\r\n\r\n{body}",
            body.len()
        );
        socket.write_all(response.as_bytes()).await.unwrap();
        socket.shutdown().await.unwrap();
    });

    format!("http://{addr}/calendar.ics")
}

#[tokio::test]
async fn fetches_and_expands() {
    let url = serve_once("200 OK", ICS).await;
    let fetcher = CalendarFetcher::new(FetchConfig::new(&url).unwrap()).unwrap();
    let options = ExpandOptions::new(Utc, Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap());

    let events = fetcher.fetch_events_with(&options).await.unwrap();

    assert_eq!(events.len(), 2);
    assert_eq!(events[0].title, "Served over HTTP");
    assert_eq!(events[1].id, "served-2026-01-11T10:00:00.000Z");
}

#[tokio::test]
async fn non_success_status_is_an_http_error() {
    let url = serve_once("404 Not Found", "").await;
    let fetcher = CalendarFetcher::new(FetchConfig::new(&url).unwrap()).unwrap();

    let err = fetcher.fetch_text().await.unwrap_err();

    assert_eq!(err.code(), FetchErrorCode::Http);
    assert_eq!(err.status(), Some(404));
    assert!(!err.is_retryable());
}

#[tokio::test]
async fn refused_connection_is_a_network_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let config = FetchConfig::new(&format!("http://{addr}/calendar.ics"))
        .unwrap()
        .with_timeout(Duration::from_secs(2));
    let err = CalendarFetcher::new(config)
        .unwrap()
        .fetch_text()
        .await
        .unwrap_err();

    assert_eq!(err.code(), FetchErrorCode::Network);
    assert!(err.is_retryable());
}

#[tokio::test]
async fn silent_server_times_out() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let (socket, _) = listener.accept().await.unwrap();
        tokio::time::sleep(Duration::from_secs(5)).await;
        drop(socket);
    });

    let config = FetchConfig::new(&format!("http://{addr}/calendar.ics"))
        .unwrap()
        .with_timeout(Duration::from_millis(200));
    let err = CalendarFetcher::new(config)
        .unwrap()
        .fetch_text()
        .await
        .unwrap_err();

    assert_eq!(err.code(), FetchErrorCode::Timeout);
    assert!(err.is_retryable());
}

#[tokio::test]
async fn invalid_url_is_a_configuration_error() {
    let err = fetch_calendar_events("not a url").await.unwrap_err();
    assert_eq!(err.code(), FetchErrorCode::Configuration);
}
