//! Monetary representation.
//!
//! Prices are [`Decimal`]s stored at a fixed scale of two places. Rounding is
//! midpoint-away-from-zero so that `x.xx5` always moves away from zero,
//! independent of the platform's float formatting.

use rust_decimal::{Decimal, RoundingStrategy};

/// Price represented as a Decimal for precision.
pub type Price = Decimal;

/// Number of decimal places every stored price carries.
pub const PRICE_SCALE: u32 = 2;

/// Round `price` to [`PRICE_SCALE`] places.
pub fn round_price(price: Price) -> Price {
  price.round_dp_with_strategy(PRICE_SCALE, RoundingStrategy::MidpointAwayFromZero)
}
