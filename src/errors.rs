use rust_decimal::Decimal;
use thiserror::Error;

/// Errors that abort a single trading iteration.
///
/// Every variant leaves the agent's trade state exactly as it was before the
/// failing call, except a submission failure after a completed liquidation
/// (the book is flat at that point and the state records it).
#[derive(Debug, Error)]
pub enum AgentError {
    #[error("invalid last price: {0}")]
    InvalidPrice(Decimal),

    #[error("collaborator unavailable ({collaborator}): {source}")]
    CollaboratorUnavailable {
        collaborator: &'static str,
        #[source]
        source: anyhow::Error,
    },
}

impl AgentError {
    pub fn unavailable(collaborator: &'static str, source: anyhow::Error) -> Self {
        Self::CollaboratorUnavailable {
            collaborator,
            source,
        }
    }
}
