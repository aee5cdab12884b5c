pub mod alpaca;
pub mod api;
pub mod types;

pub use alpaca::AlpacaClient;
pub use api::{Account, Execution, NewsFeed};
pub use types::{OrderInstruction, OrderKind, OrderSide};
