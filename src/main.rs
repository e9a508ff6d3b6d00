//! # Ace Events
//!
//! A scheduled scraping pipeline that turns sports-event listing pages into
//! Ace Stream M3U playlists.
//!
//! ## Pipeline
//!
//! Each configured source goes through one linear pass:
//!
//! 1. **Fetch**: try the source's gateway mirrors in order until one
//!    returns a usable document
//! 2. **Extract**: locate every 40-hex content identifier and recover the
//!    time, date, competition, and display name printed near it
//! 3. **Dedup**: drop repeated (name, date, time, id) occurrences
//! 4. **Serialize**: render a deterministic, sorted M3U playlist
//! 5. **Persist**: write only when content changed, keeping capped
//!    timestamped snapshots under `history/`
//!
//! A source with zero events still produces a valid header-only playlist;
//! a source whose mirrors are all down leaves its previous output intact.
//!
//! ## Usage
//!
//! ```sh
//! ace_events -o ./out --guide
//! ```

use chrono::Local;
use clap::Parser;
use std::error::Error;
use std::path::Path;
use std::time::Duration;
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod cli;
mod config;
mod error;
mod extract;
mod fetch;
mod guide;
mod models;
mod outputs;
mod utils;

use cli::Cli;
use config::{Config, SourceConfig};
use error::ScrapeError;
use fetch::Fetcher;
use models::dedup_records;
use outputs::history::{self, WriteOutcome};
use outputs::{json, playlist};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!("ace_events starting up");

    let args = Cli::parse();

    let mut config = match args.config {
        Some(ref path) => Config::load(path)?,
        None => Config::default(),
    };
    if let Some(secs) = args.timeout_secs {
        config.timeout_secs = secs;
    }
    if let Some(cap) = args.history_cap {
        config.history_cap = cap;
    }
    config.validate()?;
    info!(
        sources = config.sources.len(),
        timeout_secs = config.timeout_secs,
        history_cap = config.history_cap,
        "Configuration loaded"
    );

    tokio::fs::create_dir_all(&args.output_dir).await?;

    let fetcher = Fetcher::new(Duration::from_secs(config.timeout_secs))?;
    let history_dir = args.output_dir.join("history");

    let mut failures = 0usize;
    for source in &config.sources {
        info!(source = %source.name, mirrors = source.mirrors.len(), "Processing source");
        if let Err(e) = run_source(&fetcher, &config, source, &args.output_dir, &history_dir).await
        {
            error!(source = %source.name, error = %e, "Source failed; previous output preserved");
            failures += 1;
        }
    }

    if args.guide {
        match guide::update_channel_index(&fetcher, &config.playlist.guide_urls, &args.output_dir)
            .await
        {
            Ok(outcome) => {
                info!(total = outcome.total, new = outcome.new, "Guide channel index refreshed")
            }
            Err(e) => warn!(error = %e, "Guide channel index update failed"),
        }
    }

    let elapsed = start_time.elapsed();
    info!(
        ?elapsed,
        secs = elapsed.as_secs(),
        failures,
        sources = config.sources.len(),
        "Execution complete"
    );

    if failures > 0 {
        return Err(format!("{failures} of {} sources failed", config.sources.len()).into());
    }
    Ok(())
}

/// One linear pipeline pass for one source.
async fn run_source(
    fetcher: &Fetcher,
    config: &Config,
    source: &SourceConfig,
    output_dir: &Path,
    history_dir: &Path,
) -> Result<(), ScrapeError> {
    let html = fetcher.fetch_first(&source.name, &source.mirrors).await?;

    let records = extract::extract_events(&source.name, &html, &config.extract)?;
    let total = records.len();
    let records = dedup_records(records);
    if records.is_empty() {
        // "no events today" is a normal outcome, not a failure
        warn!(source = %source.name, "No qualifying events; writing header-only playlist");
    } else {
        info!(
            source = %source.name,
            extracted = total,
            unique = records.len(),
            "Events extracted"
        );
    }

    let text = playlist::render_playlist(&records, &config.playlist);
    json::write_records(&records, output_dir, &source.name).await?;

    let target = output_dir.join(format!("{}.m3u", source.name));
    let outcome =
        history::write_with_history(&text, &target, history_dir, config.history_cap, Local::now())
            .await?;
    match outcome {
        WriteOutcome::Unchanged => info!(source = %source.name, "Playlist unchanged"),
        WriteOutcome::Written { snapshot } => {
            info!(source = %source.name, snapshot = %snapshot.display(), "Playlist written")
        }
    }
    Ok(())
}
