use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::broker::{OrderInstruction, OrderSide};
use crate::sentiment::SentimentScore;

/// Direction of the most recent executed trade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LastAction {
    #[default]
    None,
    Buy,
    Sell,
}

/// Trade state threaded through iterations as an explicit value. Mutated
/// only after a successful order submission (or a completed liquidation,
/// which leaves the book flat).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TradeState {
    pub last_action: LastAction,
}

impl TradeState {
    pub fn flat() -> Self {
        Self::default()
    }

    pub fn record(&mut self, side: OrderSide) {
        self.last_action = match side {
            OrderSide::Buy => LastAction::Buy,
            OrderSide::Sell => LastAction::Sell,
        };
    }
}

/// Everything one decision needs, gathered up front by the agent.
#[derive(Debug, Clone)]
pub struct DecisionInputs {
    pub cash: Decimal,
    pub last_price: Decimal,
    pub quantity: u64,
    pub sentiment: SentimentScore,
    pub last_action: LastAction,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HoldReason {
    /// Cannot afford a single share (cash <= last price)
    InsufficientCash,
    /// Sentiment is directional but below the confidence threshold
    BelowThreshold,
    NeutralSentiment,
}

/// Outcome of one decision: at most one order, optionally preceded by a
/// close-all of the opposing position.
#[derive(Debug, Clone, PartialEq)]
pub enum Decision {
    Trade {
        close_existing: bool,
        order: OrderInstruction,
    },
    Hold(HoldReason),
}
