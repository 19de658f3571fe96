//! Append-only event records.
//!
//! Neither record is ever updated or deleted. Price events are the source of
//! truth for historical reconstruction; order events feed popularity counts.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{money::Price, product::ProductId};

/// A price value a product took on at `recorded_at`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceEvent {
  /// Store-assigned insertion sequence. Orders events that share a timestamp.
  pub seq:         i64,
  pub product_id:  ProductId,
  #[serde(with = "rust_decimal::serde::float")]
  pub price:       Price,
  pub recorded_at: DateTime<Utc>,
}

/// One purchase of a product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderEvent {
  pub seq:        i64,
  pub product_id: ProductId,
  pub ordered_at: DateTime<Utc>,
}
