//! progpdf HTTP Server Binary
//!
//! Serves the conference programme documents over HTTP. The schedule feed is
//! fetched on the first document request and kept until the process exits.
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin progpdf-server
//!
//! # Offline, from a saved feed
//! SCHEDULE_FILE=programme.json cargo run --bin progpdf-server
//! ```
//!
//! # Environment Variables
//!
//! - `HOST`: Server host (default: 0.0.0.0)
//! - `PORT`: Server port (default: 9999)
//! - `PROGPDF_CONFIG`: Path to the TOML configuration
//! - `SCHEDULE_URL` / `SCHEDULE_FILE`: Override the schedule source
//! - `RUST_LOG`: Log level (default: info)

use std::env;
use std::net::SocketAddr;

use anyhow::Context;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use progpdf::feed::create_feed;
use progpdf::http::{create_router, AppState};
use progpdf::ProgrammeConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    FmtSubscriber::builder()
        .with_max_level(
            env::var("RUST_LOG")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(Level::INFO),
        )
        .with_target(true)
        .with_thread_ids(true)
        .init();

    info!("Starting progpdf HTTP Server");

    let config = ProgrammeConfig::load().context("Failed to load configuration")?;
    let feed = create_feed(&config.feed).context("Failed to create schedule feed")?;
    info!("Schedule feed ready");

    let state = AppState::new(config, feed);
    let app = create_router(state);

    // Determine bind address
    let host = env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port: u16 = env::var("PORT")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(9999);
    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;

    info!("Server listening on http://{}", addr);
    info!("Full programme: http://{}/programme.pdf", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
