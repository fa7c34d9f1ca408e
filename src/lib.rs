//! fxgate - currency-conversion gateway over the ECB daily reference rates
//!
//! This module exposes the gateway's components for use in integration tests.

pub mod cache;
pub mod cli;
pub mod convert;
pub mod rates;
pub mod server;
