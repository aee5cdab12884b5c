use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use rust_decimal::Decimal;
use std::sync::Mutex;
use tracing::{debug, info};

use crate::analytics::{ExitReason, Trade};
use crate::broker::{Account, Execution, NewsFeed, OrderInstruction, OrderSide};

use super::data::{DailyBar, HistoricalData};

#[derive(Debug, Clone)]
struct OpenPosition {
    side: OrderSide,
    quantity: u64,
    entry_price: Decimal,
    entry_date: NaiveDate,
    take_profit: Decimal,
    stop_loss: Decimal,
}

#[derive(Debug)]
struct Ledger {
    cash: Decimal,
    bar_index: usize,
    open_position: Option<OpenPosition>,
    closed: Vec<Trade>,
}

/// Simulated broker replaying daily bars and dated headlines.
///
/// Orders fill immediately at the current close. Advancing to the next bar
/// resolves open brackets against that bar's range; when a single bar spans
/// both exit levels the stop-loss is assumed to fill first.
pub struct BacktestBroker {
    symbol: String,
    bars: Vec<DailyBar>,
    headlines: Vec<super::data::DatedHeadline>,
    initial_cash: Decimal,
    state: Mutex<Ledger>,
}

impl BacktestBroker {
    pub fn new(symbol: impl Into<String>, data: HistoricalData, initial_cash: Decimal) -> Self {
        Self {
            symbol: symbol.into(),
            bars: data.bars,
            headlines: data.headlines,
            initial_cash,
            state: Mutex::new(Ledger {
                cash: initial_cash,
                bar_index: 0,
                open_position: None,
                closed: Vec::new(),
            }),
        }
    }

    pub fn initial_cash(&self) -> Decimal {
        self.initial_cash
    }

    fn bar(&self, index: usize) -> &DailyBar {
        &self.bars[index.min(self.bars.len().saturating_sub(1))]
    }

    /// Move to the next bar and resolve open brackets against it.
    /// Returns false once the data is exhausted.
    pub fn advance(&self) -> bool {
        let mut state = self.state.lock().unwrap();
        if state.bar_index + 1 >= self.bars.len() {
            return false;
        }
        state.bar_index += 1;
        let bar = self.bar(state.bar_index).clone();
        Self::resolve_brackets(&mut state, &bar);
        true
    }

    fn resolve_brackets(state: &mut Ledger, bar: &DailyBar) {
        let Some(position) = state.open_position.clone() else {
            return;
        };

        let exit = match position.side {
            OrderSide::Buy => {
                if bar.low <= position.stop_loss {
                    Some((position.stop_loss, ExitReason::StopLoss))
                } else if bar.high >= position.take_profit {
                    Some((position.take_profit, ExitReason::TakeProfit))
                } else {
                    None
                }
            }
            OrderSide::Sell => {
                if bar.high >= position.stop_loss {
                    Some((position.stop_loss, ExitReason::StopLoss))
                } else if bar.low <= position.take_profit {
                    Some((position.take_profit, ExitReason::TakeProfit))
                } else {
                    None
                }
            }
        };

        if let Some((price, reason)) = exit {
            Self::close(state, &position, price, bar.date, reason);
            state.open_position = None;
        }
    }

    fn close(
        state: &mut Ledger,
        position: &OpenPosition,
        price: Decimal,
        date: NaiveDate,
        reason: ExitReason,
    ) {
        let notional = Decimal::from(position.quantity) * price;
        match position.side {
            OrderSide::Buy => state.cash += notional,
            OrderSide::Sell => state.cash -= notional,
        }

        let trade = Trade {
            id: format!("bt-{}", uuid::Uuid::new_v4()),
            symbol: String::new(),
            side: position.side,
            quantity: position.quantity,
            entry_price: position.entry_price,
            exit_price: price,
            entry_date: position.entry_date,
            exit_date: date,
            exit_reason: reason,
        };
        debug!(
            "Closed {:?} {} @ {} ({:?}, pnl {})",
            trade.side,
            trade.quantity,
            price,
            reason,
            trade.realized_pnl()
        );
        state.closed.push(trade);
    }

    /// Round trips completed since the last call.
    pub fn drain_closed(&self) -> Vec<Trade> {
        let mut state = self.state.lock().unwrap();
        let mut closed = std::mem::take(&mut state.closed);
        for trade in &mut closed {
            trade.symbol = self.symbol.clone();
        }
        closed
    }

    /// (date, cash, equity) at the current bar close.
    pub fn mark(&self) -> (NaiveDate, Decimal, Decimal) {
        let state = self.state.lock().unwrap();
        let bar = self.bar(state.bar_index);
        let equity = match &state.open_position {
            Some(p) => {
                let notional = Decimal::from(p.quantity) * bar.close;
                match p.side {
                    OrderSide::Buy => state.cash + notional,
                    OrderSide::Sell => state.cash - notional,
                }
            }
            None => state.cash,
        };
        (bar.date, state.cash, equity)
    }

    /// Close any remaining position at the last available close.
    pub fn finalize(&self) {
        let mut state = self.state.lock().unwrap();
        let bar = self.bar(state.bar_index).clone();
        if let Some(position) = state.open_position.take() {
            Self::close(&mut state, &position, bar.close, bar.date, ExitReason::EndOfData);
        }
    }
}

#[async_trait]
impl Account for BacktestBroker {
    async fn get_cash(&self) -> Result<Decimal> {
        Ok(self.state.lock().unwrap().cash)
    }

    async fn get_last_price(&self, _symbol: &str) -> Result<Decimal> {
        let state = self.state.lock().unwrap();
        Ok(self.bar(state.bar_index).close)
    }

    async fn get_current_time(&self) -> Result<DateTime<Utc>> {
        let state = self.state.lock().unwrap();
        let date = self.bar(state.bar_index).date;
        let midnight = date.and_hms_opt(0, 0, 0).unwrap();
        Ok(Utc.from_utc_datetime(&midnight))
    }
}

#[async_trait]
impl NewsFeed for BacktestBroker {
    async fn get_headlines(
        &self,
        _symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<String>> {
        Ok(self
            .headlines
            .iter()
            .filter(|h| h.date >= start && h.date <= end)
            .map(|h| h.text.clone())
            .collect())
    }
}

#[async_trait]
impl Execution for BacktestBroker {
    async fn submit_order(&self, order: &OrderInstruction) -> Result<String> {
        let mut state = self.state.lock().unwrap();
        let bar = self.bar(state.bar_index).clone();
        let fill_price = bar.close;
        let notional = Decimal::from(order.quantity) * fill_price;

        if let Some(open) = &state.open_position {
            if open.side != order.side {
                anyhow::bail!("opposing position still open, liquidate first");
            }
        }

        match order.side {
            OrderSide::Buy => {
                if notional > state.cash {
                    anyhow::bail!(
                        "insufficient cash: need {} with {} available",
                        notional,
                        state.cash
                    );
                }
                state.cash -= notional;
            }
            OrderSide::Sell => {
                state.cash += notional;
            }
        }

        // Same-direction re-entries stack onto the open position with a
        // size-weighted entry price; the newest bracket levels apply
        state.open_position = Some(match state.open_position.take() {
            Some(open) => {
                let total = Decimal::from(open.quantity) + Decimal::from(order.quantity);
                let blended = (Decimal::from(open.quantity) * open.entry_price
                    + Decimal::from(order.quantity) * fill_price)
                    / total;
                OpenPosition {
                    side: order.side,
                    quantity: open.quantity + order.quantity,
                    entry_price: blended,
                    entry_date: open.entry_date,
                    take_profit: order.take_profit_price,
                    stop_loss: order.stop_loss_price,
                }
            }
            None => OpenPosition {
                side: order.side,
                quantity: order.quantity,
                entry_price: fill_price,
                entry_date: bar.date,
                take_profit: order.take_profit_price,
                stop_loss: order.stop_loss_price,
            },
        });

        info!(
            "[SIM] Filled {} {} x{} @ {} (tp {}, sl {})",
            order.side.as_str(),
            order.symbol,
            order.quantity,
            fill_price,
            order.take_profit_price,
            order.stop_loss_price
        );
        Ok(format!("sim-{}", uuid::Uuid::new_v4()))
    }

    async fn liquidate_all_positions(&self) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        let bar = self.bar(state.bar_index).clone();
        if let Some(position) = state.open_position.take() {
            Self::close(
                &mut state,
                &position,
                bar.close,
                bar.date,
                ExitReason::Liquidation,
            );
            info!("[SIM] Liquidated open position @ {}", bar.close);
        }
        Ok(())
    }
}
