use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::sentiment::{SentimentLabel, SentimentScore};

use super::oracle::ScriptedOracle;

/// One daily OHLC bar.
#[derive(Debug, Clone)]
pub struct DailyBar {
    pub date: NaiveDate,
    pub open: Decimal,
    pub high: Decimal,
    pub low: Decimal,
    pub close: Decimal,
}

#[derive(Debug, Clone)]
pub struct DatedHeadline {
    pub date: NaiveDate,
    pub text: String,
}

/// Replay input for the backtest broker: bars plus the headlines published
/// on each date.
#[derive(Debug, Clone, Default)]
pub struct HistoricalData {
    pub bars: Vec<DailyBar>,
    pub headlines: Vec<DatedHeadline>,
}

fn bar(date: NaiveDate, open: i64, high: i64, low: i64, close: i64) -> DailyBar {
    DailyBar {
        date,
        open: Decimal::new(open, 0),
        high: Decimal::new(high, 0),
        low: Decimal::new(low, 0),
        close: Decimal::new(close, 0),
    }
}

fn day(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

pub const SAMPLE_POSITIVE_HEADLINE: &str = "Blowout jobs report lifts equities";
pub const SAMPLE_NEGATIVE_HEADLINE: &str = "Bank failures spark panic selling";

impl HistoricalData {
    /// A small deterministic replay: a strong-positive day that take-profits,
    /// a reversal into a short that also take-profits, and a final short
    /// closed at the end of data.
    pub fn sample() -> Self {
        Self {
            bars: vec![
                bar(day(2023, 1, 2), 398, 401, 396, 400),
                bar(day(2023, 1, 3), 402, 485, 398, 482),
                bar(day(2023, 1, 4), 480, 481, 474, 475),
                bar(day(2023, 1, 5), 474, 476, 468, 470),
                bar(day(2023, 1, 6), 468, 472, 370, 372),
                bar(day(2023, 1, 9), 373, 376, 371, 375),
            ],
            headlines: vec![
                DatedHeadline {
                    date: day(2022, 12, 30),
                    text: SAMPLE_POSITIVE_HEADLINE.to_string(),
                },
                DatedHeadline {
                    date: day(2023, 1, 5),
                    text: SAMPLE_NEGATIVE_HEADLINE.to_string(),
                },
            ],
        }
    }

    /// Oracle scripted to match [`HistoricalData::sample`].
    pub fn sample_oracle() -> ScriptedOracle {
        ScriptedOracle::new(vec![
            (
                SAMPLE_POSITIVE_HEADLINE.to_string(),
                SentimentScore {
                    probability: 0.9995,
                    label: SentimentLabel::Positive,
                },
            ),
            (
                SAMPLE_NEGATIVE_HEADLINE.to_string(),
                SentimentScore {
                    probability: 0.9995,
                    label: SentimentLabel::Negative,
                },
            ),
        ])
    }
}
