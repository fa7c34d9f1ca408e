//! ECB daily reference-rate feed client
//!
//! This module fetches the ECB's `eurofxref-daily.xml` feed and parses it
//! into a [`RateTable`]. The feed is a `gesmes:Envelope` wrapping three
//! nested `Cube` levels: a bare wrapper, a dated snapshot, and one entry per
//! currency with `currency`/`rate` attributes.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use thiserror::Error;

use super::{RateTable, BASE_CURRENCY};

/// URL of the ECB daily reference-rate feed
pub const ECB_FEED_URL: &str = "https://www.ecb.europa.eu/stats/eurofxref/eurofxref-daily.xml";

/// Upstream request timeout; a hung upstream must not pin a request forever
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Errors that can occur when fetching or parsing the rate feed
///
/// The cache controller treats every variant the same way: one failed
/// attempt. A well-formed HTTP 200 carrying garbage is no more useful to a
/// caller than a connection reset.
#[derive(Debug, Error)]
pub enum FeedError {
    /// HTTP transport failed (connect, TLS, timeout)
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Upstream answered with a non-success status
    #[error("upstream returned status {0}")]
    Status(StatusCode),

    /// Payload did not match the expected feed structure
    #[error("malformed feed: {0}")]
    Malformed(String),
}

/// A source of daily rate tables.
///
/// The cache controller only depends on this trait, so tests can substitute
/// scripted sources for the live ECB endpoint.
#[async_trait]
pub trait RateSource: Send + Sync {
    /// Fetches and parses one daily snapshot.
    async fn fetch(&self) -> Result<RateTable, FeedError>;
}

/// Client for the ECB daily reference-rate feed
#[derive(Debug, Clone)]
pub struct EcbClient {
    client: Client,
    url: String,
}

impl Default for EcbClient {
    fn default() -> Self {
        Self::new()
    }
}

impl EcbClient {
    /// Creates a client against the live ECB feed URL.
    pub fn new() -> Self {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .expect("Failed to construct HTTP client");
        Self {
            client,
            url: ECB_FEED_URL.to_string(),
        }
    }

    /// Creates a client against a custom feed URL.
    #[allow(dead_code)]
    pub fn with_url(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::new()
        }
    }
}

#[async_trait]
impl RateSource for EcbClient {
    async fn fetch(&self) -> Result<RateTable, FeedError> {
        let response = self.client.get(&self.url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FeedError::Status(status));
        }
        let body = response.text().await?;
        parse_feed(&body)
    }
}

// Serde mirror of the envelope. quick-xml ignores the root element's name,
// so the `gesmes:` prefix never needs declaring here.
#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(rename = "Cube")]
    cube: CubeWrapper,
}

#[derive(Debug, Deserialize)]
struct CubeWrapper {
    #[serde(rename = "Cube")]
    snapshot: Option<DailySnapshot>,
}

#[derive(Debug, Deserialize)]
struct DailySnapshot {
    #[serde(rename = "@time")]
    time: String,
    #[serde(rename = "Cube", default)]
    entries: Vec<RateEntry>,
}

#[derive(Debug, Deserialize)]
struct RateEntry {
    #[serde(rename = "@currency")]
    currency: String,
    #[serde(rename = "@rate")]
    rate: String,
}

/// Parses the raw feed XML into a [`RateTable`].
///
/// The base currency is inserted at 1.0; every other rate must be a finite
/// positive number or the whole payload is rejected.
///
/// # Arguments
/// * `xml` - Raw feed body as returned by the upstream
///
/// # Returns
/// * `Ok(RateTable)` - Parsed snapshot with its publication date
/// * `Err(FeedError::Malformed)` - If the structure or any rate is invalid
pub fn parse_feed(xml: &str) -> Result<RateTable, FeedError> {
    let envelope: Envelope = quick_xml::de::from_str(xml)
        .map_err(|e| FeedError::Malformed(format!("unexpected feed structure: {}", e)))?;

    let snapshot = envelope
        .cube
        .snapshot
        .ok_or_else(|| FeedError::Malformed("feed contains no daily snapshot".to_string()))?;

    let as_of = NaiveDate::parse_from_str(&snapshot.time, "%Y-%m-%d")
        .map_err(|e| FeedError::Malformed(format!("bad time attribute '{}': {}", snapshot.time, e)))?;

    let mut rates = HashMap::with_capacity(snapshot.entries.len() + 1);
    rates.insert(BASE_CURRENCY.to_string(), 1.0);
    for entry in snapshot.entries {
        let rate: f64 = entry.rate.parse().map_err(|_| {
            FeedError::Malformed(format!("non-numeric rate '{}' for {}", entry.rate, entry.currency))
        })?;
        if !rate.is_finite() || rate <= 0.0 {
            return Err(FeedError::Malformed(format!(
                "non-positive rate {} for {}",
                rate, entry.currency
            )));
        }
        rates.insert(entry.currency, rate);
    }

    Ok(RateTable { rates, as_of })
}
