use std::sync::Arc;
use tracing::{info, warn};

use crate::agent::Agent;
use crate::analytics::{EquitySnapshot, PnLStats, PnLTracker, Trade};
use crate::broker::{Account, Execution, NewsFeed};
use crate::config::StrategyConfig;
use crate::sentiment::SentimentOracle;

use super::broker::BacktestBroker;

#[derive(Debug)]
pub struct BacktestReport {
    pub stats: PnLStats,
    pub trades: Vec<Trade>,
    pub snapshots: Vec<EquitySnapshot>,
}

/// Drives the agent over the broker's bars, one iteration per day.
pub struct Backtester {
    agent: Agent,
    broker: Arc<BacktestBroker>,
    tracker: PnLTracker,
}

impl Backtester {
    pub fn new(
        strategy: &StrategyConfig,
        broker: Arc<BacktestBroker>,
        oracle: Arc<dyn SentimentOracle>,
    ) -> Self {
        let tracker = PnLTracker::new(broker.initial_cash());
        let agent = Agent::new(
            strategy,
            Arc::clone(&broker) as Arc<dyn Account>,
            Arc::clone(&broker) as Arc<dyn NewsFeed>,
            oracle,
            Arc::clone(&broker) as Arc<dyn Execution>,
        );
        Self {
            agent,
            broker,
            tracker,
        }
    }

    pub async fn run(mut self) -> BacktestReport {
        loop {
            if let Err(e) = self.agent.run_iteration().await {
                // A failed day holds; the replay continues on the next bar
                warn!("Backtest iteration failed: {}", e);
            }

            for trade in self.broker.drain_closed() {
                self.tracker.record_trade(trade);
            }
            let (date, cash, equity) = self.broker.mark();
            self.tracker.take_snapshot(date, cash, equity);

            if !self.broker.advance() {
                break;
            }
        }

        // Close whatever is still open at the last bar so the report only
        // carries realized results
        self.broker.finalize();
        for trade in self.broker.drain_closed() {
            self.tracker.record_trade(trade);
        }
        let (date, cash, equity) = self.broker.mark();
        self.tracker.take_snapshot(date, cash, equity);

        let stats = self.tracker.stats();
        info!(
            "Backtest complete: {} trades, pnl {}, final equity {}",
            stats.num_trades, stats.total_pnl, stats.final_equity
        );

        BacktestReport {
            stats,
            trades: self.tracker.trades().to_vec(),
            snapshots: self.tracker.snapshots().to_vec(),
        }
    }
}
