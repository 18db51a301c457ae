use std::fmt;

use anyhow::{Context, Result};
use chrono::Utc;
use tracing::info;

use crate::config::{load_config_with_env, EnvironmentProvider};
use crate::narrator::Narrator;
use crate::partition::partition;
use crate::report::HealthReport;
use crate::sanitize::sanitize;
use crate::types::*;
use crate::vault::MetricsFetcher;

/// Pipeline steps that can fail. Sanitizing and partitioning are infallible.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Fetching,
    Narrating(ChunkPosition),
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Fetching => write!(f, "fetching Vault metrics"),
            Stage::Narrating(position) => write!(f, "analyzing {} with LLM", position.describe()),
        }
    }
}

/// Loads configuration and runs the pipeline once.
///
/// Every required variable is checked before any request goes out.
pub async fn run_from_env<E: EnvironmentProvider>(
    env: &E,
    client: &reqwest::Client,
) -> Result<HealthReport> {
    let cfg = load_config_with_env(env).context("Error loading configuration")?;
    info!("vault = {}, llm = {}", cfg.vault_addr, cfg.llm_url);
    HealthPipeline::new(client, &cfg).run().await
}

/// Runs fetch, sanitize, partition and narrate once, in that order.
///
/// The first failing narration aborts the run; later chunks are never sent.
pub struct HealthPipeline<'a> {
    config: &'a Config,
    fetcher: MetricsFetcher<'a>,
    narrator: Narrator<'a>,
}

impl<'a> HealthPipeline<'a> {
    pub fn new(client: &'a reqwest::Client, config: &'a Config) -> Self {
        Self {
            config,
            fetcher: MetricsFetcher::new(client, config),
            narrator: Narrator::new(client, config),
        }
    }

    pub async fn run(&self) -> Result<HealthReport> {
        let mut report = HealthReport::new(Utc::now());

        info!("Fetching Vault metrics...");
        let raw = self
            .fetcher
            .fetch()
            .await
            .with_context(|| format!("Error {}", Stage::Fetching))?;

        let sanitized = sanitize(&raw);
        info!(
            "Sanitized metrics: {} bytes ({} NaN lines dropped)",
            sanitized.len(),
            sanitized.dropped_lines
        );
        report.set_input_stats(&raw, &sanitized);

        let chunks = partition(&sanitized, self.config.chunk_threshold_bytes);
        info!("Partitioned metrics into {} chunk(s)", chunks.len());

        for chunk in &chunks {
            info!("analysis data for {}...", chunk.position.describe());
            let narration = self
                .narrator
                .narrate(chunk)
                .await
                .with_context(|| format!("Error {}", Stage::Narrating(chunk.position)))?;
            report.add_section(chunk.position, narration);
        }

        report.finish(Utc::now());
        Ok(report)
    }
}
