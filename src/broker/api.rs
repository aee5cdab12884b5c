use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;

use super::types::OrderInstruction;

/// Account and pricing queries.
#[async_trait]
pub trait Account: Send + Sync {
    /// Available cash balance
    async fn get_cash(&self) -> Result<Decimal>;

    /// Last traded price for a symbol
    async fn get_last_price(&self, symbol: &str) -> Result<Decimal>;

    /// Current time as the broker sees it (simulated time in backtests)
    async fn get_current_time(&self) -> Result<DateTime<Utc>>;
}

/// Headline retrieval for a symbol over a closed date range.
#[async_trait]
pub trait NewsFeed: Send + Sync {
    /// Headlines published between `start` and `end`, both inclusive
    async fn get_headlines(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<String>>;
}

/// Order routing.
#[async_trait]
pub trait Execution: Send + Sync {
    /// Submit an order, returning the broker's order id
    async fn submit_order(&self, order: &OrderInstruction) -> Result<String>;

    /// Close every open position at market
    async fn liquidate_all_positions(&self) -> Result<()>;
}
