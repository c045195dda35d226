//! # Remote Fetcher
//!
//! Blocking HTTP GET with retry and exponential backoff, used for the GitHub
//! tree, branch and raw-content endpoints.
//!
//! The retry loop is [`retry_with_backoff`], kept independent of the transport
//! so its attempt counting and sleep schedule can be tested without a network.
//! [`HttpFetcher`] plugs a `reqwest` blocking client into it. Components that
//! need remote data depend on the [`RemoteFetcher`] trait, so tests can
//! substitute a recording fake.
//!
//! Only transport failures and non-success HTTP statuses are retried. Decoding
//! the body happens once, after the loop, and decode errors are returned as-is.

use std::collections::BTreeMap;
use std::str::FromStr;
use std::time::Duration;

use log::warn;
use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};

use crate::defaults;
use crate::error::{Error, Result};

/// Shape of a successful response body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResponseFormat {
    #[default]
    Text,
    Json,
    Bytes,
}

impl FromStr for ResponseFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            "bytes" => Ok(Self::Bytes),
            other => Err(Error::UnsupportedFormat {
                format: other.to_string(),
            }),
        }
    }
}

/// A decoded response body.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Text(String),
    Json(serde_json::Value),
    Bytes(Vec<u8>),
}

/// Per-request options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchOptions {
    pub headers: BTreeMap<String, String>,
    pub timeout: Duration,
    /// Total attempts, first one included. Zero behaves like one.
    pub max_retries: u32,
    pub format: ResponseFormat,
}

impl Default for FetchOptions {
    fn default() -> Self {
        let mut headers = BTreeMap::new();
        headers.insert("Accept".to_string(), defaults::ACCEPT_HEADER.to_string());
        headers.insert("User-Agent".to_string(), defaults::USER_AGENT.to_string());
        Self {
            headers,
            timeout: defaults::DEFAULT_TIMEOUT,
            max_retries: defaults::DEFAULT_MAX_RETRIES,
            format: ResponseFormat::Text,
        }
    }
}

impl FetchOptions {
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.insert(name.to_string(), value.to_string());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn with_format(mut self, format: ResponseFormat) -> Self {
        self.format = format;
        self
    }

    fn header_map(&self) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in &self.headers {
            match (
                HeaderName::from_bytes(name.as_bytes()),
                HeaderValue::from_str(value),
            ) {
                (Ok(name), Ok(value)) => {
                    map.insert(name, value);
                }
                _ => warn!("Skipping invalid request header {}: {}", name, value),
            }
        }
        map
    }
}

/// Delay schedule between failed attempts.
pub trait BackoffPolicy {
    /// Delay after failed attempt `attempt` (counted from 1).
    fn delay_for_attempt(&self, attempt: u32) -> Duration;
}

/// `base * 2^(attempt-1)`: 0.5s, 1s, 2s, ... with the default base.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExponentialBackoff {
    pub base_delay: Duration,
}

impl Default for ExponentialBackoff {
    fn default() -> Self {
        Self {
            base_delay: defaults::RETRY_BASE_DELAY,
        }
    }
}

impl BackoffPolicy for ExponentialBackoff {
    fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(31);
        self.base_delay.saturating_mul(1u32 << exponent)
    }
}

/// Run `op` until it succeeds or `max_retries` attempts have failed.
///
/// `sleep` is called with the backoff delay between attempts, never after the
/// last one. A warning is logged before each sleep.
pub fn retry_with_backoff<T, E, F, S>(
    url: &str,
    max_retries: u32,
    backoff: &dyn BackoffPolicy,
    mut sleep: S,
    mut op: F,
) -> Result<T>
where
    E: std::error::Error + Send + Sync + 'static,
    F: FnMut(u32) -> std::result::Result<T, E>,
    S: FnMut(Duration),
{
    let max_attempts = max_retries.max(1);
    let mut attempt = 1;
    loop {
        match op(attempt) {
            Ok(value) => return Ok(value),
            Err(err) if attempt >= max_attempts => {
                return Err(Error::FetchFailed {
                    url: url.to_string(),
                    attempts: attempt,
                    source: Box::new(err),
                });
            }
            Err(err) => {
                let delay = backoff.delay_for_attempt(attempt);
                warn!(
                    "Request to {} failed (attempt {}/{}): {}. Retrying in {:.1}s",
                    url,
                    attempt,
                    max_attempts,
                    err,
                    delay.as_secs_f64()
                );
                sleep(delay);
                attempt += 1;
            }
        }
    }
}

fn decode(url: &str, body: Vec<u8>, format: ResponseFormat) -> Result<Payload> {
    match format {
        ResponseFormat::Text => String::from_utf8(body)
            .map(Payload::Text)
            .map_err(|e| Error::Decode {
                url: url.to_string(),
                message: e.to_string(),
            }),
        ResponseFormat::Json => serde_json::from_slice(&body)
            .map(Payload::Json)
            .map_err(|e| Error::Decode {
                url: url.to_string(),
                message: e.to_string(),
            }),
        ResponseFormat::Bytes => Ok(Payload::Bytes(body)),
    }
}

/// Source of remote data. Implemented by [`HttpFetcher`]; tests provide fakes.
pub trait RemoteFetcher: Send + Sync {
    /// GET `url`, retrying per `options`, and decode the body as
    /// `options.format`.
    fn fetch(&self, url: &str, options: &FetchOptions) -> Result<Payload>;

    /// Fetch and decode a JSON document.
    fn fetch_json(&self, url: &str, options: &FetchOptions) -> Result<serde_json::Value> {
        let options = options.clone().with_format(ResponseFormat::Json);
        match self.fetch(url, &options)? {
            Payload::Json(value) => Ok(value),
            _ => Err(Error::Decode {
                url: url.to_string(),
                message: "expected a JSON payload".to_string(),
            }),
        }
    }

    /// Fetch a body as UTF-8 text.
    fn fetch_text(&self, url: &str, options: &FetchOptions) -> Result<String> {
        let options = options.clone().with_format(ResponseFormat::Text);
        match self.fetch(url, &options)? {
            Payload::Text(text) => Ok(text),
            _ => Err(Error::Decode {
                url: url.to_string(),
                message: "expected a text payload".to_string(),
            }),
        }
    }
}

/// `RemoteFetcher` backed by a blocking `reqwest` client.
pub struct HttpFetcher {
    client: Client,
    backoff: ExponentialBackoff,
}

impl HttpFetcher {
    pub fn new() -> Self {
        Self {
            client: Client::new(),
            backoff: ExponentialBackoff::default(),
        }
    }

    pub fn with_backoff(mut self, backoff: ExponentialBackoff) -> Self {
        self.backoff = backoff;
        self
    }
}

impl Default for HttpFetcher {
    fn default() -> Self {
        Self::new()
    }
}

impl RemoteFetcher for HttpFetcher {
    fn fetch(&self, url: &str, options: &FetchOptions) -> Result<Payload> {
        let headers = options.header_map();
        let body = retry_with_backoff(
            url,
            options.max_retries,
            &self.backoff,
            std::thread::sleep,
            |_attempt| {
                self.client
                    .get(url)
                    .headers(headers.clone())
                    .timeout(options.timeout)
                    .send()
                    .and_then(|response| response.error_for_status())
                    .and_then(|response| response.bytes())
            },
        )?;
        decode(url, body.to_vec(), options.format)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use log::Level;
    use std::io;

    fn failing(_attempt: u32) -> std::result::Result<(), io::Error> {
        Err(io::Error::new(io::ErrorKind::ConnectionRefused, "network down"))
    }

    #[test]
    fn test_response_format_from_str() {
        assert_eq!("text".parse::<ResponseFormat>().unwrap(), ResponseFormat::Text);
        assert_eq!("json".parse::<ResponseFormat>().unwrap(), ResponseFormat::Json);
        assert_eq!("bytes".parse::<ResponseFormat>().unwrap(), ResponseFormat::Bytes);
    }

    #[test]
    fn test_response_format_rejects_unknown() {
        let result = "xml".parse::<ResponseFormat>();
        assert!(matches!(
            result,
            Err(Error::UnsupportedFormat { ref format }) if format == "xml"
        ));
    }

    #[test]
    fn test_exponential_backoff_schedule() {
        let backoff = ExponentialBackoff::default();
        assert_eq!(backoff.delay_for_attempt(1), Duration::from_millis(500));
        assert_eq!(backoff.delay_for_attempt(2), Duration::from_secs(1));
        assert_eq!(backoff.delay_for_attempt(3), Duration::from_secs(2));
    }

    #[test]
    fn test_backoff_saturates_for_large_attempts() {
        let backoff = ExponentialBackoff::default();
        assert!(backoff.delay_for_attempt(200) >= backoff.delay_for_attempt(30));
    }

    #[test]
    fn test_retry_exhaustion_counts_attempts_and_sleeps() {
        let mut attempts = Vec::new();
        let mut sleeps = Vec::new();

        let result = retry_with_backoff(
            "http://example.com",
            2,
            &ExponentialBackoff::default(),
            |delay| sleeps.push(delay),
            |attempt| {
                attempts.push(attempt);
                failing(attempt)
            },
        );

        assert_eq!(attempts, vec![1, 2]);
        // No wait after the final attempt
        assert_eq!(sleeps, vec![Duration::from_millis(500)]);
        match result {
            Err(Error::FetchFailed { url, attempts, .. }) => {
                assert_eq!(url, "http://example.com");
                assert_eq!(attempts, 2);
            }
            other => panic!("expected FetchFailed, got {:?}", other),
        }
    }

    #[test]
    fn test_retry_succeeds_after_transient_failure() {
        let mut sleeps = Vec::new();
        let result = retry_with_backoff(
            "http://example.com",
            3,
            &ExponentialBackoff::default(),
            |delay| sleeps.push(delay),
            |attempt| {
                if attempt < 3 {
                    failing(attempt).map(|_| 0)
                } else {
                    Ok(attempt)
                }
            },
        );

        assert_eq!(result.unwrap(), 3);
        assert_eq!(
            sleeps,
            vec![Duration::from_millis(500), Duration::from_secs(1)]
        );
    }

    #[test]
    fn test_zero_retries_means_single_attempt() {
        let mut calls = 0;
        let result = retry_with_backoff(
            "http://example.com",
            0,
            &ExponentialBackoff::default(),
            |_| panic!("must not sleep"),
            |attempt| {
                calls += 1;
                failing(attempt)
            },
        );
        assert_eq!(calls, 1);
        assert!(matches!(result, Err(Error::FetchFailed { attempts: 1, .. })));
    }

    #[test]
    fn test_retry_logs_warning_before_sleep() {
        testing_logger::setup();
        let _ = retry_with_backoff(
            "http://example.com/tree",
            2,
            &ExponentialBackoff::default(),
            |_| {},
            failing,
        );
        testing_logger::validate(|captured_logs| {
            let warnings: Vec<_> = captured_logs
                .iter()
                .filter(|log| log.level == Level::Warn)
                .collect();
            assert_eq!(warnings.len(), 1);
            assert!(warnings[0].body.contains("http://example.com/tree"));
            assert!(warnings[0].body.contains("attempt 1/2"));
        });
    }

    #[test]
    fn test_decode_text() {
        let payload = decode("u", b"language: c++".to_vec(), ResponseFormat::Text).unwrap();
        assert_eq!(payload, Payload::Text("language: c++".to_string()));
    }

    #[test]
    fn test_decode_json() {
        let payload = decode("u", br#"{"ok": true}"#.to_vec(), ResponseFormat::Json).unwrap();
        assert_eq!(payload, Payload::Json(serde_json::json!({"ok": true})));
    }

    #[test]
    fn test_decode_invalid_json() {
        let result = decode("http://x", b"<html>".to_vec(), ResponseFormat::Json);
        assert!(matches!(result, Err(Error::Decode { ref url, .. }) if url == "http://x"));
    }

    #[test]
    fn test_decode_bytes_passthrough() {
        let payload = decode("u", vec![0, 159, 146], ResponseFormat::Bytes).unwrap();
        assert_eq!(payload, Payload::Bytes(vec![0, 159, 146]));
    }

    #[test]
    fn test_default_options_carry_github_headers() {
        let options = FetchOptions::default();
        assert_eq!(
            options.headers.get("Accept").map(String::as_str),
            Some("application/vnd.github.v3+json")
        );
        assert_eq!(
            options.headers.get("User-Agent").map(String::as_str),
            Some("ossfuzz-kit")
        );
        let map = options.header_map();
        assert_eq!(map.len(), 2);
    }

    #[test]
    fn test_header_map_skips_invalid_headers() {
        let options = FetchOptions::default().with_header("bad header", "x");
        assert_eq!(options.header_map().len(), 2);
    }

    #[test]
    fn test_http_fetcher_reports_refused_connection() {
        let fetcher = HttpFetcher::new();
        let options = FetchOptions::default()
            .with_max_retries(1)
            .with_timeout(Duration::from_secs(5));

        match fetcher.fetch("http://127.0.0.1:1/projects", &options) {
            Err(Error::FetchFailed { url, attempts, .. }) => {
                assert_eq!(url, "http://127.0.0.1:1/projects");
                assert_eq!(attempts, 1);
            }
            other => panic!("expected FetchFailed error, got {:?}", other),
        }
    }
}
