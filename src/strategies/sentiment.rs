//! The news-sentiment decision policy.
//!
//! One decision per iteration: strongly positive sentiment opens a long
//! bracket, strongly negative opens a short bracket, anything else holds.
//! A position in the opposite direction is closed before the new order.

use chrono::{DateTime, Days, NaiveDate, Utc};
use rust_decimal::Decimal;

use crate::broker::{OrderInstruction, OrderSide};
use crate::sentiment::SentimentLabel;

use super::types::{Decision, DecisionInputs, HoldReason, LastAction};

/// Minimum batch probability before the policy acts on a directional label.
pub const SENTIMENT_THRESHOLD: f64 = 0.999;

/// Trailing headline window in calendar days.
pub const NEWS_WINDOW_DAYS: u64 = 3;

/// Inclusive `(start, end)` dates of the trailing headline window.
pub fn news_window(now: DateTime<Utc>) -> (NaiveDate, NaiveDate) {
    let end = now.date_naive();
    let start = end
        .checked_sub_days(Days::new(NEWS_WINDOW_DAYS))
        .unwrap_or(NaiveDate::MIN);
    (start, end)
}

/// Bracket exit levels relative to the entry price.
/// Longs: +20% take-profit, -5% stop. Shorts: -20% take-profit, +5% stop.
fn bracket_prices(side: OrderSide, last_price: Decimal) -> (Decimal, Decimal) {
    match side {
        OrderSide::Buy => (
            last_price * Decimal::new(120, 2),
            last_price * Decimal::new(95, 2),
        ),
        OrderSide::Sell => (
            last_price * Decimal::new(80, 2),
            last_price * Decimal::new(105, 2),
        ),
    }
}

/// Pure decision function: no I/O, no state mutation. The agent applies
/// the side effects (liquidation, submission, state update).
pub fn decide(symbol: &str, inputs: &DecisionInputs) -> Decision {
    // Cannot afford a single share: terminal for this iteration
    if inputs.cash <= inputs.last_price {
        return Decision::Hold(HoldReason::InsufficientCash);
    }

    match inputs.sentiment.label {
        SentimentLabel::Positive if inputs.sentiment.probability > SENTIMENT_THRESHOLD => {
            let (take_profit, stop_loss) = bracket_prices(OrderSide::Buy, inputs.last_price);
            Decision::Trade {
                close_existing: inputs.last_action == LastAction::Sell,
                order: OrderInstruction::bracket(
                    symbol,
                    inputs.quantity,
                    OrderSide::Buy,
                    take_profit,
                    stop_loss,
                ),
            }
        }
        SentimentLabel::Negative if inputs.sentiment.probability > SENTIMENT_THRESHOLD => {
            let (take_profit, stop_loss) = bracket_prices(OrderSide::Sell, inputs.last_price);
            Decision::Trade {
                close_existing: inputs.last_action == LastAction::Buy,
                order: OrderInstruction::bracket(
                    symbol,
                    inputs.quantity,
                    OrderSide::Sell,
                    take_profit,
                    stop_loss,
                ),
            }
        }
        SentimentLabel::Neutral => Decision::Hold(HoldReason::NeutralSentiment),
        _ => Decision::Hold(HoldReason::BelowThreshold),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sentiment::SentimentScore;
    use chrono::TimeZone;

    fn dec(value: i64) -> Decimal {
        Decimal::new(value, 0)
    }

    fn inputs(
        cash: i64,
        price: i64,
        quantity: u64,
        probability: f64,
        label: SentimentLabel,
        last_action: LastAction,
    ) -> DecisionInputs {
        DecisionInputs {
            cash: dec(cash),
            last_price: dec(price),
            quantity,
            sentiment: SentimentScore { probability, label },
            last_action,
        }
    }

    #[test]
    fn window_spans_three_calendar_days_inclusive() {
        let now = Utc.with_ymd_and_hms(2023, 3, 10, 15, 30, 0).unwrap();
        let (start, end) = news_window(now);
        assert_eq!(start, NaiveDate::from_ymd_opt(2023, 3, 7).unwrap());
        assert_eq!(end, NaiveDate::from_ymd_opt(2023, 3, 10).unwrap());
        assert_eq!(start.format("%Y-%m-%d").to_string(), "2023-03-07");
    }

    #[test]
    fn strong_positive_opens_long_bracket() {
        let decision = decide(
            "SPY",
            &inputs(10_000, 400, 13, 0.9995, SentimentLabel::Positive, LastAction::None),
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
    fn strong_negative_after_buy_closes_first() {
        let decision = decide(
            "SPY",
            &inputs(10_000, 400, 13, 0.9995, SentimentLabel::Negative, LastAction::Buy),
        );
        match decision {
            Decision::Trade {
                close_existing,
                order,
            } => {
                assert!(close_existing);
                assert_eq!(order.side, OrderSide::Sell);
                assert_eq!(order.take_profit_price, dec(320));
                assert_eq!(order.stop_loss_price, dec(420));
            }
            other => panic!("expected a trade, got {:?}", other),
        }
    }

    #[test]
    fn positive_after_sell_closes_first() {
        let decision = decide(
            "SPY",
            &inputs(10_000, 400, 13, 0.9995, SentimentLabel::Positive, LastAction::Sell),
        );
        assert!(matches!(
            decision,
            Decision::Trade {
                close_existing: true,
                ..
            }
        ));
    }

    #[test]
    fn threshold_is_exclusive() {
        let decision = decide(
            "SPY",
            &inputs(10_000, 400, 13, 0.999, SentimentLabel::Positive, LastAction::None),
        );
        assert_eq!(decision, Decision::Hold(HoldReason::BelowThreshold));
    }

    #[test]
    fn neutral_label_holds_at_any_probability() {
        let decision = decide(
            "SPY",
            &inputs(10_000, 400, 13, 1.0, SentimentLabel::Neutral, LastAction::Buy),
        );
        assert_eq!(decision, Decision::Hold(HoldReason::NeutralSentiment));
    }

    #[test]
    fn insufficient_cash_holds_regardless_of_sentiment() {
        let decision = decide(
            "SPY",
            &inputs(300, 400, 0, 1.0, SentimentLabel::Positive, LastAction::None),
        );
        assert_eq!(decision, Decision::Hold(HoldReason::InsufficientCash));

        // Equal cash and price still cannot afford the trade
        let decision = decide(
            "SPY",
            &inputs(400, 400, 0, 1.0, SentimentLabel::Negative, LastAction::None),
        );
        assert_eq!(decision, Decision::Hold(HoldReason::InsufficientCash));
    }
}
