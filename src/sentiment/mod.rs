pub mod finbert;

pub use finbert::FinbertClient;

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SentimentLabel {
    Positive,
    Negative,
    Neutral,
}

/// One score for a whole batch of headlines, never per headline.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SentimentScore {
    pub probability: f64,
    pub label: SentimentLabel,
}

impl SentimentScore {
    /// The deterministic result for an empty headline batch.
    pub fn neutral() -> Self {
        Self {
            probability: 0.0,
            label: SentimentLabel::Neutral,
        }
    }
}

/// Batch sentiment estimation.
///
/// Implementations must return [`SentimentScore::neutral`] for an empty
/// batch without erroring and without contacting any model.
#[async_trait]
pub trait SentimentOracle: Send + Sync {
    async fn estimate(&self, headlines: &[String]) -> Result<SentimentScore>;
}
