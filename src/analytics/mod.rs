pub mod pnl;

pub use pnl::{EquitySnapshot, ExitReason, PnLStats, PnLTracker, Trade};
