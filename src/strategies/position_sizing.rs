//! Fixed-fraction position sizing.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

use crate::errors::AgentError;

/// Number of whole shares for a new position:
/// `round(cash * risk_fraction / last_price)`.
///
/// Rounding is half-up (`MidpointAwayFromZero`), so 12.5 shares becomes 13.
/// A non-positive `last_price` is rejected before dividing.
pub fn position_size(
    cash: Decimal,
    risk_fraction: Decimal,
    last_price: Decimal,
) -> Result<u64, AgentError> {
    if last_price <= Decimal::ZERO {
        return Err(AgentError::InvalidPrice(last_price));
    }

    let raw = cash * risk_fraction / last_price;
    let quantity = raw
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_u64()
        .unwrap_or(0);

    Ok(quantity)
}
