pub mod agent;
pub mod analytics;
pub mod backtest;
pub mod broker;
pub mod config;
pub mod errors;
pub mod sentiment;
pub mod strategies;
