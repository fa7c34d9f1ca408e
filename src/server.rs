//! HTTP surface: the `/convert` endpoint
//!
//! Thin axum layer over the cache controller and conversion engine. Query
//! parameters are decoded leniently (the upstream contract predates this
//! service): a missing source currency means USD, a missing target list
//! means the full supported set, and an unusable amount falls back to 1.
//!
//! Every failure is rendered as a uniform 500 JSON envelope
//! `{"error": "<message>"}`; there are no per-error status codes.

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tower_http::trace::TraceLayer;

use crate::cache::{CacheError, RateCache};
use crate::convert::{convert, format_display_date, Conversion, ConvertError};
use crate::rates::SUPPORTED_CURRENCIES;

/// Shared state for the request handlers
pub struct AppState {
    pub cache: RateCache,
}

/// Query parameters accepted by `GET /convert`
#[derive(Debug, Deserialize)]
pub struct ConvertParams {
    /// Source currency; defaults to USD
    pub from_currency: Option<String>,
    /// Comma-separated target codes; defaults to the full supported set
    pub to_currency: Option<String>,
    /// Amount to convert; non-numeric or zero input falls back to 1
    pub amount: Option<String>,
}

#[derive(Debug, Serialize)]
struct ConvertResponse {
    from_currency: String,
    amount: f64,
    date: String,
    conversions: Vec<Conversion>,
}

/// Uniform error envelope: everything surfaces as 500 with a message
struct ApiError(String);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        tracing::error!(error = %self.0, "request failed");
        let body = Json(serde_json::json!({ "error": self.0 }));
        (StatusCode::INTERNAL_SERVER_ERROR, body).into_response()
    }
}

impl From<CacheError> for ApiError {
    fn from(err: CacheError) -> Self {
        ApiError(err.to_string())
    }
}

impl From<ConvertError> for ApiError {
    fn from(err: ConvertError) -> Self {
        ApiError(err.to_string())
    }
}

/// Resolves the target currency list from the raw query value.
///
/// An absent or empty `to_currency` selects the full supported set, matching
/// the original service's handling of empty query values.
fn target_currencies(raw: Option<&str>) -> Vec<String> {
    match raw.filter(|s| !s.is_empty()) {
        Some(list) => list.split(',').map(str::to_string).collect(),
        None => SUPPORTED_CURRENCIES.iter().map(|s| s.to_string()).collect(),
    }
}

/// Parses the requested amount, falling back to 1.
///
/// Mirrors the original `parseFloat(x) || 1` contract: non-numeric,
/// non-finite and zero inputs all convert one unit.
fn parse_amount(raw: Option<&str>) -> f64 {
    raw.and_then(|s| s.parse::<f64>().ok())
        .filter(|a| a.is_finite() && *a != 0.0)
        .unwrap_or(1.0)
}

/// Convert an amount from one currency into one or more others.
async fn get_convert(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ConvertParams>,
) -> Result<Json<ConvertResponse>, ApiError> {
    let from = params.from_currency.unwrap_or_else(|| "USD".to_string());
    let targets = target_currencies(params.to_currency.as_deref());
    let amount = parse_amount(params.amount.as_deref());

    let snapshot = state.cache.get_rates().await?;
    let date = format_display_date(snapshot.table.as_of, snapshot.freshness);

    let conversions = targets
        .iter()
        .map(|to| convert(&snapshot.table, &from, to, amount))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Json(ConvertResponse {
        from_currency: from,
        amount,
        date,
        conversions,
    }))
}

/// Builds the application router.
pub fn app_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/convert", get(get_convert))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
