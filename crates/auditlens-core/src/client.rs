//! HTTP client for the external analysis service
//!
//! Requires the `client` feature (needs reqwest)

use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use url::Url;

use crate::payload::RawReportPayload;
use crate::request::{AnalyzeRequest, DEFAULT_ENDPOINT, PageType};

/// Analyses of large sites regularly take 30 seconds or more
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

pub const ENDPOINT_ENV: &str = "AUDITLENS_ENDPOINT";
pub const TIMEOUT_ENV: &str = "AUDITLENS_TIMEOUT_SECS";

/// Where and how long to wait for the analysis service
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub endpoint: String,
    pub timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl ClientConfig {
    /// Defaults overridden by `AUDITLENS_ENDPOINT` / `AUDITLENS_TIMEOUT_SECS`
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();

        if let Some(endpoint) = lookup(ENDPOINT_ENV).filter(|value| !value.trim().is_empty()) {
            let endpoint = endpoint.trim();
            Url::parse(endpoint).with_context(|| format!("invalid {ENDPOINT_ENV}: {endpoint}"))?;
            config.endpoint = endpoint.to_string();
        }

        if let Some(timeout) = lookup(TIMEOUT_ENV).filter(|value| !value.trim().is_empty()) {
            let secs: u64 = timeout
                .trim()
                .parse()
                .with_context(|| format!("invalid {TIMEOUT_ENV}: {timeout}"))?;
            config.timeout = Duration::from_secs(secs);
        }

        Ok(config)
    }
}

/// Thin wrapper around one POST to the analysis service
pub struct AnalysisClient {
    http: reqwest::Client,
    config: ClientConfig,
}

impl AnalysisClient {
    pub fn new(config: ClientConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(format!(
                "Mozilla/5.0 (compatible; auditlens-core/{})",
                env!("CARGO_PKG_VERSION")
            ))
            .timeout(config.timeout)
            .build()?;

        Ok(Self { http, config })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Request an audit of `url`.
    ///
    /// Transport failures, non-success statuses and bodies that are not JSON
    /// are returned as errors; no payload is produced for them. No retries.
    pub async fn analyze(&self, url: &Url, page_type: PageType) -> Result<RawReportPayload> {
        let request = AnalyzeRequest::new(url.as_str(), page_type);
        tracing::info!(url = %url, %page_type, endpoint = %self.config.endpoint, "requesting analysis");

        let response = self
            .http
            .post(&self.config.endpoint)
            .json(&request)
            .send()
            .await
            .context("Failed to reach analysis service")?;

        let status = response.status();
        let body = response
            .text()
            .await
            .context("Failed to read analysis response body")?;

        if !status.is_success() {
            tracing::warn!(%status, "analysis service returned an error status");
            return Err(anyhow!(
                "analysis service returned {status}: {}",
                body.chars().take(200).collect::<String>()
            ));
        }

        tracing::debug!(bytes = body.len(), "received analysis response");
        RawReportPayload::from_json_str(&body)
    }
}
