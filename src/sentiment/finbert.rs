use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use crate::config::SentimentConfig;

use super::{SentimentOracle, SentimentScore};

const HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Client for a FinBERT-style inference sidecar.
///
/// The sidecar scores the concatenated batch and replies with a single
/// probability/label pair.
pub struct FinbertClient {
    http_client: reqwest::Client,
    inference_url: String,
}

#[derive(Debug, Serialize)]
struct EstimateRequest<'a> {
    headlines: &'a [String],
}

#[derive(Debug, Deserialize)]
struct EstimateResponse {
    probability: f64,
    label: super::SentimentLabel,
}

impl FinbertClient {
    pub fn new(config: &SentimentConfig) -> Self {
        Self {
            http_client: reqwest::Client::builder()
                .timeout(HTTP_TIMEOUT)
                .build()
                .unwrap_or_default(),
            inference_url: config.inference_url.clone(),
        }
    }
}

#[async_trait]
impl SentimentOracle for FinbertClient {
    async fn estimate(&self, headlines: &[String]) -> Result<SentimentScore> {
        if headlines.is_empty() {
            debug!("No headlines in window, skipping inference");
            return Ok(SentimentScore::neutral());
        }

        let response = self
            .http_client
            .post(&self.inference_url)
            .json(&EstimateRequest { headlines })
            .send()
            .await?;

        if !response.status().is_success() {
            anyhow::bail!("sentiment inference error: {}", response.status());
        }

        let estimate: EstimateResponse = response.json().await?;
        debug!(
            "Sentiment for {} headlines: {:?} ({:.4})",
            headlines.len(),
            estimate.label,
            estimate.probability
        );

        Ok(SentimentScore {
            probability: estimate.probability,
            label: estimate.label,
        })
    }
}
