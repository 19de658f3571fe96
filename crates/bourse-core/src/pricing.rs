//! Price transition rules.
//!
//! Both transitions share one shape: step the current price, clamp it into the
//! product's bounds, then round to the stored scale. The recorded
//! `last_change` is always the nominal step, even when clamping shortened or
//! cancelled the actual movement.

use serde::Serialize;

use crate::{
  Error, Result,
  money::{Price, round_price},
  product::{Product, ProductId},
};

/// Validated step sizes for the two price transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PricingRules {
  increase_step:   Price,
  decrease_amount: Price,
}

impl PricingRules {
  /// Both steps are rounded to the stored scale and must stay strictly
  /// positive afterwards.
  pub fn new(increase_step: Price, decrease_amount: Price) -> Result<Self> {
    let increase_step = round_price(increase_step);
    let decrease_amount = round_price(decrease_amount);
    if increase_step <= Price::ZERO {
      return Err(Error::invalid(format!(
        "purchase price step must be positive, got {increase_step}"
      )));
    }
    if decrease_amount <= Price::ZERO {
      return Err(Error::invalid(format!(
        "decay amount must be positive, got {decrease_amount}"
      )));
    }
    Ok(Self { increase_step, decrease_amount })
  }

  pub fn increase_step(&self) -> Price { self.increase_step }

  pub fn decrease_amount(&self) -> Price { self.decrease_amount }

  /// The transition applied when `product` is purchased.
  pub fn on_purchase(&self, product: &Product) -> PriceChange {
    transition(product, self.increase_step)
  }

  /// The transition applied to `product` by a decay tick.
  pub fn on_decay(&self, product: &Product) -> PriceChange {
    transition(product, -self.decrease_amount)
  }
}

impl Default for PricingRules {
  fn default() -> Self {
    Self {
      increase_step:   Price::new(50, 2),
      decrease_amount: Price::new(10, 2),
    }
  }
}

/// The outcome of one transition on one product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PriceChange {
  pub product_id:     ProductId,
  #[serde(with = "rust_decimal::serde::float")]
  pub previous_price: Price,
  #[serde(with = "rust_decimal::serde::float")]
  pub new_price:      Price,
  #[serde(with = "rust_decimal::serde::float")]
  pub last_change:    Price,
}

impl PriceChange {
  /// Write the change back onto `product`.
  pub fn apply_to(&self, product: &mut Product) {
    product.current_price = self.new_price;
    product.last_change = self.last_change;
  }
}

fn transition(product: &Product, step: Price) -> PriceChange {
  assert!(
    product.min_price <= product.max_price,
    "product {} has inverted bounds [{}, {}]",
    product.id,
    product.min_price,
    product.max_price,
  );

  let new_price = round_price(
    (product.current_price + step).clamp(product.min_price, product.max_price),
  );

  assert!(
    product.min_price <= new_price && new_price <= product.max_price,
    "product {} priced at {new_price} outside [{}, {}]",
    product.id,
    product.min_price,
    product.max_price,
  );

  PriceChange {
    product_id: product.id,
    previous_price: product.current_price,
    new_price,
    last_change: step,
  }
}
