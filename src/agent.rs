use rust_decimal::Decimal;
use std::sync::Arc;
use tokio::time::{interval, Duration};
use tracing::{debug, info, warn};

use crate::broker::{Account, Execution, NewsFeed, OrderInstruction};
use crate::config::StrategyConfig;
use crate::errors::AgentError;
use crate::sentiment::SentimentOracle;
use crate::strategies::{
    decide, news_window, position_size, Decision, DecisionInputs, HoldReason, TradeState,
};

/// What a single iteration did.
#[derive(Debug, Clone)]
pub enum IterationOutcome {
    Held(HoldReason),
    Submitted {
        order_id: String,
        order: OrderInstruction,
    },
}

/// Runs the decision policy against injected collaborators, once per
/// scheduled iteration. Iterations never overlap; the interval loop is the
/// only caller of [`Agent::run_iteration`].
pub struct Agent {
    symbol: String,
    cash_at_risk: Decimal,
    account: Arc<dyn Account>,
    news: Arc<dyn NewsFeed>,
    oracle: Arc<dyn SentimentOracle>,
    execution: Arc<dyn Execution>,
    state: TradeState,
}

fn collab(name: &'static str) -> impl FnOnce(anyhow::Error) -> AgentError {
    move |source| AgentError::unavailable(name, source)
}

impl Agent {
    pub fn new(
        config: &StrategyConfig,
        account: Arc<dyn Account>,
        news: Arc<dyn NewsFeed>,
        oracle: Arc<dyn SentimentOracle>,
        execution: Arc<dyn Execution>,
    ) -> Self {
        Self {
            symbol: config.symbol.clone(),
            cash_at_risk: config.cash_at_risk,
            account,
            news,
            oracle,
            execution,
            state: TradeState::flat(),
        }
    }

    pub fn state(&self) -> TradeState {
        self.state
    }

    /// One trading iteration: gather inputs, decide, execute.
    ///
    /// A collaborator failure aborts the iteration. Nothing is mutated
    /// unless a side effect already happened: once a liquidation completes
    /// the state is reset to flat, so a submission failure right after it
    /// still leaves the recorded state truthful.
    pub async fn run_iteration(&mut self) -> Result<IterationOutcome, AgentError> {
        let cash = self.account.get_cash().await.map_err(collab("account"))?;
        let last_price = self
            .account
            .get_last_price(&self.symbol)
            .await
            .map_err(collab("pricing"))?;
        let now = self
            .account
            .get_current_time()
            .await
            .map_err(collab("clock"))?;

        let (start, end) = news_window(now);
        let headlines = self
            .news
            .get_headlines(&self.symbol, start, end)
            .await
            .map_err(collab("news"))?;
        let sentiment = self
            .oracle
            .estimate(&headlines)
            .await
            .map_err(collab("sentiment"))?;

        let quantity = position_size(cash, self.cash_at_risk, last_price)?;
        let inputs = DecisionInputs {
            cash,
            last_price,
            quantity,
            sentiment,
            last_action: self.state.last_action,
        };

        match decide(&self.symbol, &inputs) {
            Decision::Hold(reason) => {
                debug!(
                    "Holding {} ({:?}): sentiment {:?} ({:.4}), cash {}, price {}",
                    self.symbol, reason, sentiment.label, sentiment.probability, cash, last_price
                );
                Ok(IterationOutcome::Held(reason))
            }
            Decision::Trade {
                close_existing,
                order,
            } => {
                if close_existing {
                    info!("Reversing direction: liquidating open {} position", self.symbol);
                    self.execution
                        .liquidate_all_positions()
                        .await
                        .map_err(collab("execution"))?;
                    // The book is flat from here on; record it before the
                    // submission so a failure below cannot desync the state
                    self.state = TradeState::flat();
                }

                info!(
                    "Submitting {} {} x{} (tp {}, sl {})",
                    order.side.as_str(),
                    order.symbol,
                    order.quantity,
                    order.take_profit_price,
                    order.stop_loss_price
                );
                let order_id = self
                    .execution
                    .submit_order(&order)
                    .await
                    .map_err(collab("execution"))?;

                self.state.record(order.side);
                Ok(IterationOutcome::Submitted { order_id, order })
            }
        }
    }

    /// Live loop: one iteration per tick until the process is stopped.
    pub async fn run(&mut self, iteration_interval_secs: u64) -> anyhow::Result<()> {
        info!(
            "Starting sentiment agent for {} (every {}s)",
            self.symbol, iteration_interval_secs
        );

        let mut tick = interval(Duration::from_secs(iteration_interval_secs));
        tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            tick.tick().await;
            match self.run_iteration().await {
                Ok(IterationOutcome::Submitted { order_id, .. }) => {
                    info!("Iteration complete, order {}", order_id);
                }
                Ok(IterationOutcome::Held(reason)) => {
                    debug!("Iteration complete, held ({:?})", reason);
                }
                Err(e) => {
                    // Iteration-scoped failure; the next tick retries fresh
                    warn!("Iteration failed: {}", e);
                }
            }
        }
    }
}
