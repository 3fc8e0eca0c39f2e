//! progpdf CLI
//!
//! Fetches the schedule once and writes the requested documents into an output
//! directory.
//!
//! # Usage
//!
//! ```bash
//! # programme.pdf and salles.pdf in the current directory
//! progpdf
//!
//! # Every document into out/
//! progpdf out programme salles mini mini-text
//! ```
//!
//! Configuration comes from `programme.toml` (or `PROGPDF_CONFIG`) and the
//! usual environment overrides; logging follows `RUST_LOG`.

use std::env;
use std::fs;
use std::path::PathBuf;

use anyhow::{anyhow, Context};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use progpdf::feed::create_feed;
use progpdf::services::{render_document, DocumentKind, RenderContext};
use progpdf::ProgrammeConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    FmtSubscriber::builder()
        .with_max_level(
            env::var("RUST_LOG")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(Level::INFO),
        )
        .with_target(false)
        .init();

    let mut args = env::args().skip(1);
    let out_dir = PathBuf::from(args.next().unwrap_or_else(|| ".".to_string()));
    let mut kinds = args
        .map(|a| a.parse::<DocumentKind>().map_err(|e| anyhow!(e)))
        .collect::<anyhow::Result<Vec<_>>>()?;
    if kinds.is_empty() {
        kinds = vec![DocumentKind::FullProgramme, DocumentKind::RoomSchedules];
    }

    let config = ProgrammeConfig::load().context("Failed to load configuration")?;
    let feed = create_feed(&config.feed).context("Failed to create schedule feed")?;
    let ctx = RenderContext::load(feed.as_ref(), config)
        .await
        .context("Failed to load the schedule")?;

    fs::create_dir_all(&out_dir)
        .with_context(|| format!("Failed to create {}", out_dir.display()))?;

    for kind in kinds {
        let bytes = render_document(&ctx, kind).with_context(|| format!("Failed to render {}", kind))?;
        let path = out_dir.join(kind.file_name());
        fs::write(&path, &bytes).with_context(|| format!("Failed to write {}", path.display()))?;
        info!("Wrote {} ({} bytes)", path.display(), bytes.len());
    }

    Ok(())
}
