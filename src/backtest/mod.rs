pub mod broker;
pub mod data;
pub mod oracle;
pub mod runner;

pub use broker::BacktestBroker;
pub use data::{DailyBar, DatedHeadline, HistoricalData};
pub use oracle::ScriptedOracle;
pub use runner::{BacktestReport, Backtester};
