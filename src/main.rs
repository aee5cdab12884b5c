use anyhow::Result;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use sentiment_trader::agent::Agent;
use sentiment_trader::backtest::{BacktestBroker, Backtester, HistoricalData};
use sentiment_trader::broker::AlpacaClient;
use sentiment_trader::config::Config;
use sentiment_trader::sentiment::FinbertClient;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "sentiment_trader=debug,info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;
    print_banner(&config);

    if config.agent.simulation_mode {
        let data = HistoricalData::sample();
        let oracle = Arc::new(HistoricalData::sample_oracle());
        let broker = Arc::new(BacktestBroker::new(
            config.strategy.symbol.clone(),
            data,
            config.backtest.initial_cash,
        ));

        let report = Backtester::new(&config.strategy, broker, oracle).run().await;
        print_report(&report);
        return Ok(());
    }

    let alpaca = Arc::new(AlpacaClient::new(&config.alpaca, config.agent.paper_trading));
    let oracle = Arc::new(FinbertClient::new(&config.sentiment));

    let mut agent = Agent::new(
        &config.strategy,
        alpaca.clone(),
        alpaca.clone(),
        oracle,
        alpaca,
    );

    info!("Live mode, press Ctrl+C to stop");
    agent.run(config.agent.iteration_interval_secs).await
}

fn print_banner(config: &Config) {
    println!("\n╔═══════════════════════════════════════════════════════════╗");
    println!("║            News-Sentiment Bracket Trading Agent           ║");
    println!("╚═══════════════════════════════════════════════════════════╝");
    println!();
    println!("📈 Symbol: {}", config.strategy.symbol);
    println!("💰 Cash at risk: {}", config.strategy.cash_at_risk);
    if config.agent.simulation_mode {
        println!(
            "🎞️  Mode: BACKTEST ({} to {})",
            config.backtest.start, config.backtest.end
        );
        println!("💵 Initial cash: {}", config.backtest.initial_cash);
    } else {
        println!(
            "📊 Mode: {}",
            if config.agent.paper_trading {
                "PAPER TRADING (Safe Mode)"
            } else {
                "⚠️  LIVE TRADING ⚠️"
            }
        );
        println!(
            "⏱️  Iteration interval: {} seconds",
            config.agent.iteration_interval_secs
        );
    }
    println!();
}

fn print_report(report: &sentiment_trader::backtest::BacktestReport) {
    println!("\n═══════════════════ Backtest Report ═══════════════════");
    println!("Trades: {}", report.stats.num_trades);
    for trade in &report.trades {
        println!(
            "  {:>4} x{:<5} {} -> {}  ({:?}, pnl {})",
            trade.side.as_str(),
            trade.quantity,
            trade.entry_price,
            trade.exit_price,
            trade.exit_reason,
            trade.realized_pnl()
        );
    }
    println!("Initial cash:  {}", report.stats.initial_cash);
    println!("Final equity:  {}", report.stats.final_equity);
    println!("Total PnL:     {}", report.stats.total_pnl);
    println!("Win rate:      {:.1}%", report.stats.win_rate * 100.0);
    println!("Max drawdown:  {:.2}%", report.stats.max_drawdown * 100.0);
    println!("════════════════════════════════════════════════════════");
}
