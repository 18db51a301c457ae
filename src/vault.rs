use tracing::{debug, warn};

use crate::error::{ReporterError, Result};
use crate::types::{Config, RawMetrics};

pub const METRICS_PATH: &str = "/v1/sys/metrics?format=prometheus";
pub const VAULT_TOKEN_HEADER: &str = "X-Vault-Token";

pub fn metrics_url(vault_addr: &str) -> String {
    format!("{}{}", vault_addr.trim_end_matches('/'), METRICS_PATH)
}

/// Pulls the Prometheus exposition text from Vault's telemetry endpoint.
pub struct MetricsFetcher<'a> {
    client: &'a reqwest::Client,
    config: &'a Config,
}

impl<'a> MetricsFetcher<'a> {
    pub fn new(client: &'a reqwest::Client, config: &'a Config) -> Self {
        Self { client, config }
    }

    pub async fn fetch(&self) -> Result<RawMetrics> {
        let url = metrics_url(&self.config.vault_addr);
        debug!("GET {}", url);
        let res = self
            .client
            .get(&url)
            .header(VAULT_TOKEN_HEADER, &self.config.vault_token)
            .send()
            .await
            .map_err(|source| ReporterError::Network { endpoint: "Vault metrics", source })?;

        let status = res.status();
        if !status.is_success() {
            warn!("Vault metrics endpoint returned {}", status);
        }
        let body = res
            .bytes()
            .await
            .map_err(|source| ReporterError::Network { endpoint: "Vault metrics", source })?;
        Ok(RawMetrics(body.to_vec()))
    }
}
