use std::sync::Arc;

use rust_decimal::Decimal;

use sentiment_trader::analytics::ExitReason;
use sentiment_trader::backtest::{BacktestBroker, Backtester, HistoricalData};
use sentiment_trader::broker::OrderSide;
use sentiment_trader::config::StrategyConfig;
use sentiment_trader::sentiment::{SentimentLabel, SentimentScore};
use sentiment_trader::strategies::{
    decide, position_size, Decision, DecisionInputs, HoldReason, LastAction,
};

fn dec(value: i64) -> Decimal {
    Decimal::new(value, 0)
}

fn strategy() -> StrategyConfig {
    StrategyConfig {
        symbol: "SPY".to_string(),
        cash_at_risk: Decimal::new(5, 1),
    }
}

#[test]
fn decision_policy_scenario_from_flat() {
    let quantity = position_size(dec(10_000), Decimal::new(5, 1), dec(400)).unwrap();
    assert_eq!(quantity, 13); // 12.5 rounds half-up

    let decision = decide(
        "SPY",
        &DecisionInputs {
            cash: dec(10_000),
            last_price: dec(400),
            quantity,
            sentiment: SentimentScore {
                probability: 0.9995,
                label: SentimentLabel::Positive,
            },
            last_action: LastAction::None,
        },
    );

    match decision {
        Decision::Trade {
            close_existing,
            order,
        } => {
            assert!(!close_existing);
            assert_eq!(order.side, OrderSide::Buy);
            assert_eq!(order.quantity, 13);
            assert_eq!(order.take_profit_price, dec(480));
            assert_eq!(order.stop_loss_price, dec(380));
        }
        other => panic!("expected a trade, got {:?}", other),
    }
}

#[test]
fn below_threshold_never_trades() {
    for label in [SentimentLabel::Positive, SentimentLabel::Negative] {
        let decision = decide(
            "SPY",
            &DecisionInputs {
                cash: dec(10_000),
                last_price: dec(400),
                quantity: 13,
                sentiment: SentimentScore {
                    probability: 0.999,
                    label,
                },
                last_action: LastAction::None,
            },
        );
        assert_eq!(decision, Decision::Hold(HoldReason::BelowThreshold));
    }
}

#[tokio::test]
async fn sample_backtest_replays_deterministically() {
    let broker = Arc::new(BacktestBroker::new(
        "SPY",
        HistoricalData::sample(),
        dec(100_000),
    ));
    let oracle = Arc::new(HistoricalData::sample_oracle());

    let report = Backtester::new(&strategy(), broker, oracle).run().await;

    assert_eq!(report.stats.num_trades, 3);

    // Long entry on the strong-positive day, take-profit on the rally
    assert_eq!(report.trades[0].side, OrderSide::Buy);
    assert_eq!(report.trades[0].quantity, 125);
    assert_eq!(report.trades[0].entry_price, dec(400));
    assert_eq!(report.trades[0].exit_price, dec(480));
    assert_eq!(report.trades[0].exit_reason, ExitReason::TakeProfit);

    // Reversal into a short that take-profits on the selloff
    assert_eq!(report.trades[1].side, OrderSide::Sell);
    assert_eq!(report.trades[1].quantity, 117);
    assert_eq!(report.trades[1].entry_price, dec(470));
    assert_eq!(report.trades[1].exit_price, dec(376));
    assert_eq!(report.trades[1].exit_reason, ExitReason::TakeProfit);

    // A second short is still open at the end of data and closed there
    assert_eq!(report.trades[2].side, OrderSide::Sell);
    assert_eq!(report.trades[2].exit_reason, ExitReason::EndOfData);
    assert_eq!(report.trades[2].realized_pnl(), dec(-489));

    assert_eq!(report.stats.final_equity, dec(120_509));
    assert_eq!(report.stats.total_pnl, dec(20_509));
    assert!((report.stats.win_rate - 2.0 / 3.0).abs() < 1e-9);
    assert!(report.stats.max_drawdown > 0.0);
}
