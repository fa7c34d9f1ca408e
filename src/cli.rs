//! Command-line interface parsing for fxgate
//!
//! The gateway takes a single knob: the listen port. It can come from the
//! `--port` flag or the `PORT` environment variable, in that order.

use clap::Parser;

/// Port used when neither the flag nor the environment names one
pub const DEFAULT_PORT: u16 = 3000;

/// fxgate - currency conversions over the ECB daily reference rates
#[derive(Parser, Debug)]
#[command(name = "fxgate")]
#[command(about = "HTTP gateway serving currency conversions from the ECB daily feed")]
#[command(version)]
pub struct Cli {
    /// Port to listen on (takes precedence over the PORT environment variable)
    #[arg(long, value_name = "PORT")]
    pub port: Option<u16>,
}

/// Resolves the listen port from flag and environment.
///
/// Precedence: `--port` flag, then the `PORT` value, then [`DEFAULT_PORT`].
/// A malformed environment value falls back to the default rather than
/// aborting startup.
pub fn resolve_port(flag: Option<u16>, env_value: Option<&str>) -> u16 {
    flag.or_else(|| env_value.and_then(|v| v.parse().ok()))
        .unwrap_or(DEFAULT_PORT)
}
