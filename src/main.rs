use std::io::Write;

use anyhow::{Context, Result};
use tracing::{info, warn};

use vault_health_narrator::{run_from_env, SystemEnvironment};

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let client = reqwest::Client::new();
    let report = run_from_env(&SystemEnvironment, &client).await?;

    let summary = report.summary();
    info!(
        "Analysis complete: {} section(s) (split: {}), {} of {} bytes analyzed, {} NaN lines dropped, {}ms",
        summary.section_count,
        summary.was_split(),
        summary.sanitized_bytes,
        summary.raw_bytes,
        summary.dropped_lines,
        summary.elapsed_ms
    );
    if summary.raw_fallback_count > 0 {
        warn!(
            "{} narration(s) could not be decoded as JSON and are shown as returned",
            summary.raw_fallback_count
        );
    }

    std::io::stdout()
        .write_all(&report.render())
        .context("Failed to write report")?;
    Ok(())
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}
