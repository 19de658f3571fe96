//! Product: a priced item on the board.
//!
//! A product carries an immutable reference price and a mutable current price
//! that is kept inside `[min_price, max_price]` at all times. Only the pricing
//! engine mutates `current_price` and `last_change`.

use serde::{Deserialize, Serialize};

use crate::{
  Error, Result,
  money::{Price, round_price},
};

/// Store-assigned product identifier.
pub type ProductId = i64;

/// Optional accent used by the board to make a product stand out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Highlight {
  Yellow,
  Purple,
  Blue,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
  pub id:            ProductId,
  pub name:          String,
  pub category:      String,
  #[serde(rename = "highlight_color")]
  pub highlight:     Option<Highlight>,
  #[serde(with = "rust_decimal::serde::float")]
  pub base_price:    Price,
  #[serde(with = "rust_decimal::serde::float")]
  pub current_price: Price,
  #[serde(with = "rust_decimal::serde::float")]
  pub min_price:     Price,
  #[serde(with = "rust_decimal::serde::float")]
  pub max_price:     Price,
  /// The nominal step applied by the most recent mutation. Display only.
  #[serde(with = "rust_decimal::serde::float")]
  pub last_change:   Price,
}

impl Product {
  pub fn is_within_bounds(&self) -> bool {
    self.min_price <= self.current_price && self.current_price <= self.max_price
  }
}

/// Input for provisioning a product. `current_price` starts at `base_price`.
#[derive(Debug, Clone, PartialEq)]
pub struct NewProduct {
  pub name:       String,
  pub category:   String,
  pub highlight:  Option<Highlight>,
  pub base_price: Price,
  pub min_price:  Price,
  pub max_price:  Price,
}

impl NewProduct {
  pub fn new(
    name: impl Into<String>,
    category: impl Into<String>,
    base_price: Price,
    min_price: Price,
    max_price: Price,
  ) -> Self {
    Self {
      name: name.into(),
      category: category.into(),
      highlight: None,
      base_price,
      min_price,
      max_price,
    }
  }

  pub fn with_highlight(mut self, highlight: Highlight) -> Self {
    self.highlight = Some(highlight);
    self
  }

  /// Round all prices to the stored scale and check the bounds contract.
  pub fn validate(self) -> Result<Self> {
    let name = self.name.trim().to_owned();
    let category = self.category.trim().to_owned();
    if name.is_empty() {
      return Err(Error::invalid("product name must not be empty"));
    }
    if category.is_empty() {
      return Err(Error::invalid(format!("product {name:?} has no category")));
    }

    let base_price = round_price(self.base_price);
    let min_price = round_price(self.min_price);
    let max_price = round_price(self.max_price);

    if min_price.is_sign_negative() || min_price.is_zero() {
      return Err(Error::invalid(format!(
        "product {name:?}: min price must be positive, got {min_price}"
      )));
    }
    if min_price > max_price {
      return Err(Error::invalid(format!(
        "product {name:?}: min price {min_price} exceeds max price {max_price}"
      )));
    }
    if base_price < min_price || base_price > max_price {
      return Err(Error::invalid(format!(
        "product {name:?}: base price {base_price} outside [{min_price}, {max_price}]"
      )));
    }

    Ok(Self { name, category, highlight: self.highlight, base_price, min_price, max_price })
  }
}
