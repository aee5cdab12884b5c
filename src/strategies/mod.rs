pub mod position_sizing;
pub mod sentiment;
pub mod types;

pub use position_sizing::position_size;
pub use sentiment::{decide, news_window, NEWS_WINDOW_DAYS, SENTIMENT_THRESHOLD};
pub use types::{Decision, DecisionInputs, HoldReason, LastAction, TradeState};
