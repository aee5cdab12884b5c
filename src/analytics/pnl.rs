use chrono::NaiveDate;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::broker::OrderSide;

/// Why a round trip ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExitReason {
    TakeProfit,
    StopLoss,
    Liquidation,
    EndOfData,
}

/// A completed round trip.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Trade {
    pub id: String,
    pub symbol: String,
    pub side: OrderSide,
    pub quantity: u64,
    pub entry_price: Decimal,
    pub exit_price: Decimal,
    pub entry_date: NaiveDate,
    pub exit_date: NaiveDate,
    pub exit_reason: ExitReason,
}

impl Trade {
    /// Signed PnL of the round trip. Shorts profit when the exit price is
    /// below the entry.
    pub fn realized_pnl(&self) -> Decimal {
        let quantity = Decimal::from(self.quantity);
        match self.side {
            OrderSide::Buy => (self.exit_price - self.entry_price) * quantity,
            OrderSide::Sell => (self.entry_price - self.exit_price) * quantity,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EquitySnapshot {
    pub date: NaiveDate,
    pub cash: Decimal,
    pub equity: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PnLStats {
    pub initial_cash: Decimal,
    pub final_equity: Decimal,
    pub total_pnl: Decimal,
    pub num_trades: usize,
    pub win_rate: f64,
    pub max_drawdown: f64,
}

/// Collects round trips and daily equity marks for a strategy run.
pub struct PnLTracker {
    initial_cash: Decimal,
    trades: Vec<Trade>,
    snapshots: Vec<EquitySnapshot>,
}

impl PnLTracker {
    pub fn new(initial_cash: Decimal) -> Self {
        Self {
            initial_cash,
            trades: Vec::new(),
            snapshots: Vec::new(),
        }
    }

    pub fn record_trade(&mut self, trade: Trade) {
        self.trades.push(trade);
    }

    pub fn take_snapshot(&mut self, date: NaiveDate, cash: Decimal, equity: Decimal) {
        self.snapshots.push(EquitySnapshot { date, cash, equity });
    }

    pub fn trades(&self) -> &[Trade] {
        &self.trades
    }

    pub fn snapshots(&self) -> &[EquitySnapshot] {
        &self.snapshots
    }

    pub fn stats(&self) -> PnLStats {
        let final_equity = self
            .snapshots
            .last()
            .map(|s| s.equity)
            .unwrap_or(self.initial_cash);

        let wins = self
            .trades
            .iter()
            .filter(|t| t.realized_pnl() > Decimal::ZERO)
            .count();
        let win_rate = if self.trades.is_empty() {
            0.0
        } else {
            wins as f64 / self.trades.len() as f64
        };

        PnLStats {
            initial_cash: self.initial_cash,
            final_equity,
            total_pnl: final_equity - self.initial_cash,
            num_trades: self.trades.len(),
            win_rate,
            max_drawdown: self.max_drawdown(),
        }
    }

    /// Largest peak-to-trough equity decline, as a fraction of the peak.
    fn max_drawdown(&self) -> f64 {
        let mut peak = self.initial_cash;
        let mut max_dd = 0.0f64;

        for snapshot in &self.snapshots {
            if snapshot.equity > peak {
                peak = snapshot.equity;
            }
            if peak > Decimal::ZERO {
                let dd = ((peak - snapshot.equity) / peak).to_f64().unwrap_or(0.0);
                if dd > max_dd {
                    max_dd = dd;
                }
            }
        }

        max_dd
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2023, 1, d).unwrap()
    }

    fn trade(side: OrderSide, entry: i64, exit: i64, quantity: u64) -> Trade {
        Trade {
            id: "t".into(),
            symbol: "SPY".into(),
            side,
            quantity,
            entry_price: Decimal::new(entry, 0),
            exit_price: Decimal::new(exit, 0),
            entry_date: date(2),
            exit_date: date(3),
            exit_reason: ExitReason::TakeProfit,
        }
    }

    #[test]
    fn long_and_short_pnl_are_signed() {
        assert_eq!(
            trade(OrderSide::Buy, 400, 480, 10).realized_pnl(),
            Decimal::new(800, 0)
        );
        assert_eq!(
            trade(OrderSide::Sell, 400, 320, 10).realized_pnl(),
            Decimal::new(800, 0)
        );
        assert_eq!(
            trade(OrderSide::Sell, 400, 420, 10).realized_pnl(),
            Decimal::new(-200, 0)
        );
    }

    #[test]
    fn stats_aggregate_wins_and_drawdown() {
        let mut tracker = PnLTracker::new(Decimal::new(10_000, 0));
        tracker.record_trade(trade(OrderSide::Buy, 400, 480, 10));
        tracker.record_trade(trade(OrderSide::Buy, 400, 380, 10));

        tracker.take_snapshot(date(1), Decimal::new(10_000, 0), Decimal::new(10_000, 0));
        tracker.take_snapshot(date(2), Decimal::new(10_800, 0), Decimal::new(10_800, 0));
        tracker.take_snapshot(date(3), Decimal::new(10_600, 0), Decimal::new(10_600, 0));

        let stats = tracker.stats();
        assert_eq!(stats.num_trades, 2);
        assert!((stats.win_rate - 0.5).abs() < 1e-9);
        assert_eq!(stats.total_pnl, Decimal::new(600, 0));
        // 10800 -> 10600 is a 200/10800 drawdown
        assert!((stats.max_drawdown - 200.0 / 10_800.0).abs() < 1e-9);
    }

    #[test]
    fn empty_run_has_flat_stats() {
        let tracker = PnLTracker::new(Decimal::new(10_000, 0));
        let stats = tracker.stats();
        assert_eq!(stats.total_pnl, Decimal::ZERO);
        assert_eq!(stats.num_trades, 0);
        assert_eq!(stats.win_rate, 0.0);
    }
}
