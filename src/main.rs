//! fxgate server entrypoint
//!
//! Wires the ECB feed client into the rate cache, mounts the `/convert`
//! route, and serves until the process is stopped.

use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use fxgate::cache::RateCache;
use fxgate::cli::{resolve_port, Cli};
use fxgate::rates::EcbClient;
use fxgate::server::{app_router, AppState};

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    let cli = Cli::parse();
    let port = resolve_port(cli.port, std::env::var("PORT").ok().as_deref());

    let state = Arc::new(AppState {
        cache: RateCache::new(Arc::new(EcbClient::new())),
    });
    let router = app_router(state);

    let addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Listening on {}", addr);
    axum::serve(listener, router).await?;

    Ok(())
}
