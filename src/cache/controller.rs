//! Fetch/cache/retry controller for the daily rate table
//!
//! The ECB publishes one snapshot per day, so the controller serves a cached
//! table for up to 8 hours without touching the network. Past that window it
//! refreshes with up to 3 attempts (1 s apart); if all fail it keeps serving
//! the old table for up to 48 hours after the last successful fetch, flagged
//! stale, before refusing to answer at all.

use std::sync::Arc;
use std::time::Duration as StdDuration;

use chrono::{DateTime, Duration, Utc};
use thiserror::Error;
use tokio::sync::RwLock;

use crate::rates::{FeedError, RateSource, RateTable};

/// How long a fetched table is served without re-fetching
const FRESH_WINDOW_HOURS: i64 = 8;

/// How long a fetched table may still be served as a degraded fallback
const STALE_WINDOW_HOURS: i64 = 48;

/// Upstream fetch attempts per refresh
const MAX_ATTEMPTS: u32 = 3;

/// Fixed delay between failed attempts
const RETRY_BACKOFF: StdDuration = StdDuration::from_secs(1);

/// Error returned when no usable rate table can be produced
#[derive(Debug, Error)]
pub enum CacheError {
    /// Every fetch attempt failed and the cache is empty or past the stale
    /// window. Carries the last attempt's failure for operator logs.
    #[error("could not obtain rates from the ECB and no cached data is available")]
    UpstreamUnavailable(#[source] FeedError),
}

/// Whether a snapshot was fetched within the fresh window or is a fallback
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Freshness {
    Fresh,
    Stale,
}

/// A rate table handed to a request, with its degradation status
#[derive(Debug, Clone)]
pub struct RatesSnapshot {
    pub table: Arc<RateTable>,
    pub freshness: Freshness,
}

impl RatesSnapshot {
    pub fn is_stale(&self) -> bool {
        self.freshness == Freshness::Stale
    }
}

/// The cached table plus the wall-clock time it was obtained.
///
/// Replaced wholesale on every successful fetch; staleness is always
/// measured from `fetched_at`, never from the start of the request that
/// triggered a refresh.
#[derive(Debug, Clone)]
struct CacheEntry {
    table: Arc<RateTable>,
    fetched_at: DateTime<Utc>,
}

/// Process-wide rate cache controller
///
/// One instance lives for the process lifetime, injected into the request
/// path. Readers clone the `Arc<RateTable>` out from under a read lock, so
/// no request can observe a half-updated table; the write lock is held only
/// for the swap itself.
///
/// Concurrent requests that both observe an expired cache each run their own
/// attempt loop (no single-flight coalescing); the last successful writer
/// wins. That can duplicate upstream calls but never produces a wrong
/// answer.
pub struct RateCache {
    source: Arc<dyn RateSource>,
    entry: RwLock<Option<CacheEntry>>,
}

impl RateCache {
    /// Creates an empty cache over the given upstream source.
    pub fn new(source: Arc<dyn RateSource>) -> Self {
        Self {
            source,
            entry: RwLock::new(None),
        }
    }

    /// Creates a cache pre-seeded with a table fetched at `fetched_at`.
    ///
    /// Lets tests position the cache inside or outside the fresh and stale
    /// windows without sleeping.
    pub fn with_entry(
        source: Arc<dyn RateSource>,
        table: RateTable,
        fetched_at: DateTime<Utc>,
    ) -> Self {
        Self {
            source,
            entry: RwLock::new(Some(CacheEntry {
                table: Arc::new(table),
                fetched_at,
            })),
        }
    }

    /// Supplies a rate table for the current request.
    ///
    /// # Returns
    /// * `Ok` with `Freshness::Fresh` - Served from a fresh cache or a
    ///   successful refresh
    /// * `Ok` with `Freshness::Stale` - Refresh failed but the cache is
    ///   within the stale window
    /// * `Err(CacheError::UpstreamUnavailable)` - Refresh failed and no
    ///   usable cache exists
    pub async fn get_rates(&self) -> Result<RatesSnapshot, CacheError> {
        let now = Utc::now();
        if let Some(entry) = self.entry.read().await.as_ref() {
            if now - entry.fetched_at < Duration::hours(FRESH_WINDOW_HOURS) {
                return Ok(RatesSnapshot {
                    table: entry.table.clone(),
                    freshness: Freshness::Fresh,
                });
            }
        }

        match self.refresh().await {
            Ok(table) => Ok(RatesSnapshot {
                table,
                freshness: Freshness::Fresh,
            }),
            Err(last_err) => {
                // Re-read the clock: the attempt loop slept between retries.
                let now = Utc::now();
                if let Some(entry) = self.entry.read().await.as_ref() {
                    if now - entry.fetched_at < Duration::hours(STALE_WINDOW_HOURS) {
                        tracing::warn!(
                            error = %last_err,
                            as_of = %entry.table.as_of,
                            "refresh failed, serving stale rates"
                        );
                        return Ok(RatesSnapshot {
                            table: entry.table.clone(),
                            freshness: Freshness::Stale,
                        });
                    }
                }
                Err(CacheError::UpstreamUnavailable(last_err))
            }
        }
    }

    /// Runs the bounded attempt loop and swaps the cache on first success.
    async fn refresh(&self) -> Result<Arc<RateTable>, FeedError> {
        let mut attempt = 1;
        loop {
            match self.source.fetch().await {
                Ok(table) => {
                    let table = Arc::new(table);
                    let mut entry = self.entry.write().await;
                    *entry = Some(CacheEntry {
                        table: table.clone(),
                        fetched_at: Utc::now(),
                    });
                    tracing::info!(as_of = %table.as_of, attempt, "rate table refreshed");
                    return Ok(table);
                }
                Err(err) => {
                    tracing::warn!(attempt, max = MAX_ATTEMPTS, error = %err, "rate fetch failed");
                    if attempt >= MAX_ATTEMPTS {
                        return Err(err);
                    }
                    // Suspends only this task; concurrent readers keep
                    // serving from the existing cache entry.
                    tokio::time::sleep(RETRY_BACKOFF).await;
                    attempt += 1;
                }
            }
        }
    }
}
