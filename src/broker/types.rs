use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderSide {
    Buy,
    Sell,
}

impl OrderSide {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderSide::Buy => "buy",
            OrderSide::Sell => "sell",
        }
    }
}

/// Only bracket orders are placed by this strategy; the enum keeps the
/// order class explicit on the wire and in logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderKind {
    Bracket,
}

/// A fully-specified order, immutable once constructed. Handed to the
/// execution collaborator and not retained by the strategy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderInstruction {
    pub symbol: String,
    pub quantity: u64,
    pub side: OrderSide,
    pub kind: OrderKind,
    pub take_profit_price: Decimal,
    pub stop_loss_price: Decimal,
}

impl OrderInstruction {
    pub fn bracket(
        symbol: impl Into<String>,
        quantity: u64,
        side: OrderSide,
        take_profit_price: Decimal,
        stop_loss_price: Decimal,
    ) -> Self {
        Self {
            symbol: symbol.into(),
            quantity,
            side,
            kind: OrderKind::Bracket,
            take_profit_price,
            stop_loss_price,
        }
    }
}
