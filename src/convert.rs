//! Cross-rate conversion engine
//!
//! Pure functions over a [`RateTable`]: cross-rate math, the gateway's
//! ceiling rounding policy, and display-date formatting. Nothing here holds
//! state or performs I/O.
//!
//! Rounding is always UP to 2 decimals (`ceil(v * 100) / 100`), never
//! round-to-nearest. A computed rate of 0.9231 is reported as 0.93.

use chrono::NaiveDate;
use serde::Serialize;
use thiserror::Error;

use crate::cache::Freshness;
use crate::rates::RateTable;

/// Suffix appended to the display date when serving stale rates
pub const OUTDATED_MARKER: &str = " (Outdated data)";

/// Errors produced when a requested currency is not in the table
#[derive(Debug, Error)]
pub enum ConvertError {
    /// One or more requested codes are absent from the ECB data
    #[error("currency not available in the ECB data: {}", .0.join(", "))]
    UnknownCurrency(Vec<String>),
}

/// One computed conversion, ready for the response body
#[derive(Debug, Clone, Serialize)]
pub struct Conversion {
    pub to_currency: String,
    pub exchange_rate: f64,
    pub converted_amount: f64,
}

/// Rounds up to 2 decimal places.
pub fn round_up_2dp(value: f64) -> f64 {
    (value * 100.0).ceil() / 100.0
}

/// Computes the raw `from -> to` cross rate.
///
/// Both rates are expressed against the same base, so dividing the target
/// rate by the source rate yields the direct conversion rate.
///
/// # Returns
/// * `Ok(rate)` - Unrounded cross rate
/// * `Err(ConvertError::UnknownCurrency)` - Naming every missing code
pub fn cross_rate(table: &RateTable, from: &str, to: &str) -> Result<f64, ConvertError> {
    let mut missing = Vec::new();
    if !table.contains(from) {
        missing.push(from.to_string());
    }
    if !table.contains(to) && to != from {
        missing.push(to.to_string());
    }
    if !missing.is_empty() {
        return Err(ConvertError::UnknownCurrency(missing));
    }
    // Both lookups are guarded above.
    Ok(table.rates[to] / table.rates[from])
}

/// Converts `amount` of `from` into `to`.
///
/// The converted amount is derived from the unrounded cross rate; rounding
/// is applied once, at the end, to both reported numbers.
pub fn convert(
    table: &RateTable,
    from: &str,
    to: &str,
    amount: f64,
) -> Result<Conversion, ConvertError> {
    let rate = cross_rate(table, from, to)?;
    Ok(Conversion {
        to_currency: to.to_string(),
        exchange_rate: round_up_2dp(rate),
        converted_amount: round_up_2dp(amount * rate),
    })
}

/// Formats the feed's publication date as `DD/MM/YYYY` for the response.
///
/// Stale snapshots carry a marker so clients can tell the data may be
/// outdated.
pub fn format_display_date(as_of: NaiveDate, freshness: Freshness) -> String {
    let mut formatted = as_of.format("%d/%m/%Y").to_string();
    if freshness == Freshness::Stale {
        formatted.push_str(OUTDATED_MARKER);
    }
    formatted
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn sample_table() -> RateTable {
        let mut rates = HashMap::new();
        rates.insert("EUR".to_string(), 1.0);
        rates.insert("USD".to_string(), 1.0850);
        rates.insert("JPY".to_string(), 160.77);
        rates.insert("GBP".to_string(), 0.8592);
        RateTable {
            rates,
            as_of: NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
        }
    }

    #[test]
    fn test_rounding_is_ceiling_not_nearest() {
        assert_eq!(round_up_2dp(0.9231), 0.93);
        assert_eq!(round_up_2dp(0.9299), 0.93);
        assert_eq!(round_up_2dp(1.001), 1.01);
        assert_eq!(round_up_2dp(1.0), 1.0);
    }

    #[test]
    fn test_usd_to_jpy_example() {
        let table = sample_table();
        let conversion = convert(&table, "USD", "JPY", 100.0).unwrap();

        // 160.77 / 1.0850 = 148.17511..., rounded up
        assert_eq!(conversion.to_currency, "JPY");
        assert_eq!(conversion.exchange_rate, 148.18);
        // 100 * 148.17511... = 14817.511..., rounded up
        assert_eq!(conversion.converted_amount, 14817.52);
    }

    #[test]
    fn test_conversion_through_base_currency() {
        let table = sample_table();
        let conversion = convert(&table, "USD", "EUR", 1.0).unwrap();

        // 1.0 / 1.0850 = 0.92165..., rounded up
        assert_eq!(conversion.exchange_rate, 0.93);
        assert_eq!(conversion.converted_amount, 0.93);
    }

    #[test]
    fn test_same_currency_converts_at_one() {
        let table = sample_table();
        for code in ["EUR", "USD", "JPY"] {
            let conversion = convert(&table, code, code, 42.0).unwrap();
            assert_eq!(conversion.exchange_rate, 1.0);
            assert_eq!(conversion.converted_amount, 42.0);
        }
    }

    #[test]
    fn test_inverse_pairs_are_consistent_within_rounding() {
        let table = sample_table();
        let codes = ["EUR", "USD", "JPY", "GBP"];
        for a in codes {
            for b in codes {
                let forward = cross_rate(&table, a, b).unwrap();
                let back = cross_rate(&table, b, a).unwrap();
                assert!(
                    (forward * back - 1.0).abs() < 1e-9,
                    "{}->{} and back drifted: {} * {}",
                    a,
                    b,
                    forward,
                    back
                );
            }
        }
    }

    #[test]
    fn test_unknown_to_currency_is_named() {
        let table = sample_table();
        let err = convert(&table, "USD", "XXX", 1.0).unwrap_err();
        let ConvertError::UnknownCurrency(codes) = err;
        assert_eq!(codes, vec!["XXX".to_string()]);
    }

    #[test]
    fn test_unknown_from_currency_is_named() {
        let table = sample_table();
        let err = convert(&table, "ZZZ", "USD", 1.0).unwrap_err();
        let ConvertError::UnknownCurrency(codes) = err;
        assert_eq!(codes, vec!["ZZZ".to_string()]);
    }

    #[test]
    fn test_both_unknown_currencies_are_named_once_each() {
        let table = sample_table();
        let err = convert(&table, "AAA", "BBB", 1.0).unwrap_err();
        let ConvertError::UnknownCurrency(codes) = err;
        assert_eq!(codes, vec!["AAA".to_string(), "BBB".to_string()]);

        let err = convert(&table, "AAA", "AAA", 1.0).unwrap_err();
        let ConvertError::UnknownCurrency(codes) = err;
        assert_eq!(codes, vec!["AAA".to_string()], "Same missing code listed once");
    }

    #[test]
    fn test_unknown_currency_message_names_codes() {
        let err = ConvertError::UnknownCurrency(vec!["XXX".to_string(), "YYY".to_string()]);
        let msg = err.to_string();
        assert!(msg.contains("XXX"), "{}", msg);
        assert!(msg.contains("YYY"), "{}", msg);
    }

    #[test]
    fn test_display_date_european_format() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
        assert_eq!(format_display_date(date, Freshness::Fresh), "15/01/2024");
    }

    #[test]
    fn test_display_date_stale_carries_marker() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
        assert_eq!(
            format_display_date(date, Freshness::Stale),
            "15/01/2024 (Outdated data)"
        );
    }
}
