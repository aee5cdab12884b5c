use anyhow::Result;
use async_trait::async_trait;

use crate::sentiment::{SentimentOracle, SentimentScore};

/// Deterministic oracle for backtests and tests: the first rule whose
/// headline appears in the batch decides the score, anything else is
/// neutral.
pub struct ScriptedOracle {
    rules: Vec<(String, SentimentScore)>,
}

impl ScriptedOracle {
    pub fn new(rules: Vec<(String, SentimentScore)>) -> Self {
        Self { rules }
    }
}

#[async_trait]
impl SentimentOracle for ScriptedOracle {
    async fn estimate(&self, headlines: &[String]) -> Result<SentimentScore> {
        if headlines.is_empty() {
            return Ok(SentimentScore::neutral());
        }

        for (text, score) in &self.rules {
            if headlines.iter().any(|h| h == text) {
                return Ok(*score);
            }
        }

        Ok(SentimentScore::neutral())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sentiment::SentimentLabel;

    #[tokio::test]
    async fn empty_batch_is_neutral() {
        let oracle = ScriptedOracle::new(vec![(
            "crash".to_string(),
            SentimentScore {
                probability: 1.0,
                label: SentimentLabel::Negative,
            },
        )]);
        assert_eq!(
            oracle.estimate(&[]).await.unwrap(),
            SentimentScore::neutral()
        );
    }

    #[tokio::test]
    async fn first_matching_rule_wins() {
        let oracle = ScriptedOracle::new(vec![
            (
                "rally".to_string(),
                SentimentScore {
                    probability: 0.9995,
                    label: SentimentLabel::Positive,
                },
            ),
            (
                "crash".to_string(),
                SentimentScore {
                    probability: 0.9995,
                    label: SentimentLabel::Negative,
                },
            ),
        ]);

        let batch = vec!["noise".to_string(), "rally".to_string(), "crash".to_string()];
        let score = oracle.estimate(&batch).await.unwrap();
        assert_eq!(score.label, SentimentLabel::Positive);

        let unknown = vec!["nothing relevant".to_string()];
        assert_eq!(
            oracle.estimate(&unknown).await.unwrap(),
            SentimentScore::neutral()
        );
    }
}
