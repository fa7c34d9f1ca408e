//! In-memory rate cache with bounded-retry refresh
//!
//! This module owns the gateway's only shared mutable state: the last
//! successfully fetched rate table. It decides per request whether to serve
//! the cached table, refresh from the upstream feed, or fall back to stale
//! data when the upstream is unavailable.

mod controller;

pub use controller::{CacheError, Freshness, RateCache, RatesSnapshot};
