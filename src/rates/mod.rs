//! Core data model for ECB reference rates
//!
//! The ECB publishes one daily snapshot of reference rates, all expressed
//! against the euro. This module contains the parsed form of that snapshot
//! and the set of currencies the gateway converts to by default.

pub mod feed;

use std::collections::HashMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

pub use feed::{parse_feed, EcbClient, FeedError, RateSource};

/// The reference currency all feed rates are expressed against
pub const BASE_CURRENCY: &str = "EUR";

/// Currencies converted to when the request names no `to_currency`.
///
/// This mirrors the set the ECB publishes daily; it is only a default,
/// requests may name any code present in the fetched table.
pub const SUPPORTED_CURRENCIES: [&str; 31] = [
    "USD", "JPY", "BGN", "CZK", "DKK", "GBP", "HUF", "PLN", "RON", "SEK", "CHF", "ISK", "NOK",
    "TRY", "AUD", "BRL", "CAD", "CNY", "HKD", "IDR", "ILS", "INR", "KRW", "MXN", "MYR", "NZD",
    "PHP", "SGD", "THB", "ZAR", "EUR",
];

/// One parsed daily snapshot of ECB reference rates
///
/// Invariant: `rates[BASE_CURRENCY] == 1.0` is always present (inserted by
/// the feed parser), and every rate is a finite positive number. The table
/// is never mutated after parsing; the cache shares it as `Arc<RateTable>`
/// snapshots.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateTable {
    /// Currency code (3 letters) to units per 1 EUR
    pub rates: HashMap<String, f64>,
    /// Publication date from the feed's `time` attribute, not the fetch time
    pub as_of: NaiveDate,
}

impl RateTable {
    /// Looks up the rate for a currency code.
    pub fn rate(&self, code: &str) -> Option<f64> {
        self.rates.get(code).copied()
    }

    /// Whether the table contains a rate for the given code.
    pub fn contains(&self, code: &str) -> bool {
        self.rates.contains_key(code)
    }
}
