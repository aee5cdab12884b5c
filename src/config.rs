use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub strategy: StrategyConfig,
    pub agent: AgentConfig,
    pub alpaca: AlpacaConfig,
    pub sentiment: SentimentConfig,
    pub backtest: BacktestConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StrategyConfig {
    pub symbol: String,
    /// Fraction of available cash committed to a new position, in [0, 1].
    pub cash_at_risk: Decimal,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AgentConfig {
    pub paper_trading: bool,
    pub simulation_mode: bool,
    pub iteration_interval_secs: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AlpacaConfig {
    pub api_key: String,
    pub api_secret: String,
    pub trading_url: String,
    pub data_url: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SentimentConfig {
    pub inference_url: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BacktestConfig {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub initial_cash: Decimal,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let strategy = StrategyConfig {
            symbol: env::var("SYMBOL").unwrap_or_else(|_| "SPY".to_string()),
            cash_at_risk: env::var("CASH_AT_RISK")
                .unwrap_or_else(|_| "0.5".to_string())
                .parse()
                .unwrap_or(Decimal::new(5, 1)),
        };

        let agent = AgentConfig {
            paper_trading: env::var("PAPER_TRADING")
                .unwrap_or_else(|_| "true".to_string())
                .parse()
                .unwrap_or(true),
            simulation_mode: env::var("SIMULATION_MODE")
                .unwrap_or_else(|_| "false".to_string())
                .parse()
                .unwrap_or(false),
            iteration_interval_secs: env::var("ITERATION_INTERVAL_SECS")
                .unwrap_or_else(|_| "86400".to_string())
                .parse()
                .unwrap_or(86400),
        };

        let alpaca = AlpacaConfig {
            api_key: env::var("ALPACA_API_KEY").unwrap_or_default(),
            api_secret: env::var("ALPACA_API_SECRET").unwrap_or_default(),
            trading_url: env::var("ALPACA_TRADING_URL")
                .unwrap_or_else(|_| "https://paper-api.alpaca.markets".to_string()),
            data_url: env::var("ALPACA_DATA_URL")
                .unwrap_or_else(|_| "https://data.alpaca.markets".to_string()),
        };

        let sentiment = SentimentConfig {
            inference_url: env::var("SENTIMENT_INFERENCE_URL")
                .unwrap_or_else(|_| "http://127.0.0.1:8000/sentiment".to_string()),
        };

        let backtest = BacktestConfig {
            start: env::var("BACKTEST_START")
                .unwrap_or_else(|_| "2020-01-01".to_string())
                .parse()
                .unwrap_or_else(|_| NaiveDate::from_ymd_opt(2020, 1, 1).unwrap()),
            end: env::var("BACKTEST_END")
                .unwrap_or_else(|_| "2023-12-31".to_string())
                .parse()
                .unwrap_or_else(|_| NaiveDate::from_ymd_opt(2023, 12, 31).unwrap()),
            initial_cash: env::var("BACKTEST_INITIAL_CASH")
                .unwrap_or_else(|_| "100000".to_string())
                .parse()
                .unwrap_or(Decimal::new(100_000, 0)),
        };

        Ok(Config {
            strategy,
            agent,
            alpaca,
            sentiment,
            backtest,
        })
    }
}
