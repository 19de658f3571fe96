//! The `PriceStore` trait and supporting types.
//!
//! The trait is implemented by storage backends (e.g. `bourse-store-sqlite`).
//! The pricing engine and the HTTP layer depend on this abstraction, not on
//! any concrete backend.

use std::{collections::HashMap, future::Future};

use chrono::{DateTime, Utc};

use crate::{
  event::{OrderEvent, PriceEvent},
  pricing::{PriceChange, PricingRules},
  product::{NewProduct, Product, ProductId},
};

/// The outcome of a committed purchase.
#[derive(Debug, Clone, PartialEq)]
pub struct Purchase {
  pub change: PriceChange,
  pub order:  OrderEvent,
}

/// A consistent snapshot of one category's price history.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CategoryTimeline {
  pub category:    String,
  /// Products currently in the category.
  pub product_ids: Vec<ProductId>,
  /// Every price event of those products, in no particular order.
  pub events:      Vec<PriceEvent>,
}

/// Abstraction over a price ledger backend.
///
/// Mutations are atomic: the read of the current price, the write of the new
/// one and the event appends commit together or not at all. Concurrent
/// mutators of the same product are serialised by the backend.
///
/// All methods return `Send` futures so the trait can be used in multi-threaded
/// async runtimes (e.g. tokio with `axum`).
pub trait PriceStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Provisioning ──────────────────────────────────────────────────────

  /// Persist a new product together with its initial price event (the base
  /// price, recorded at `at`).
  fn add_product(
    &self,
    input: NewProduct,
    at: DateTime<Utc>,
  ) -> impl Future<Output = Result<Product, Self::Error>> + Send + '_;

  // ── Snapshot reads ────────────────────────────────────────────────────

  fn get_product(
    &self,
    id: ProductId,
  ) -> impl Future<Output = Result<Option<Product>, Self::Error>> + Send + '_;

  /// All products, ordered by id.
  fn list_products(
    &self,
  ) -> impl Future<Output = Result<Vec<Product>, Self::Error>> + Send + '_;

  fn is_empty(&self) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  // ── Mutations ─────────────────────────────────────────────────────────

  /// Apply [`PricingRules::on_purchase`] to product `id`, append its price
  /// event and an order event, all stamped `at`.
  ///
  /// Returns `None` without writing anything if the product does not exist.
  fn apply_purchase(
    &self,
    id: ProductId,
    rules: PricingRules,
    at: DateTime<Utc>,
  ) -> impl Future<Output = Result<Option<Purchase>, Self::Error>> + Send + '_;

  /// Apply [`PricingRules::on_decay`] to every product in one transaction.
  /// Every appended price event carries the same `at`.
  fn apply_decay(
    &self,
    rules: PricingRules,
    at: DateTime<Utc>,
  ) -> impl Future<Output = Result<Vec<PriceChange>, Self::Error>> + Send + '_;

  // ── Derived views ─────────────────────────────────────────────────────

  /// Count order events per product with `from <= ordered_at <= to`.
  /// Products without orders in the range are absent.
  fn order_counts(
    &self,
    from: DateTime<Utc>,
    to: DateTime<Utc>,
  ) -> impl Future<Output = Result<HashMap<ProductId, u64>, Self::Error>> + Send + '_;

  /// Snapshot the members of `category` and all of their price events.
  fn category_timeline<'a>(
    &'a self,
    category: &'a str,
  ) -> impl Future<Output = Result<CategoryTimeline, Self::Error>> + Send + 'a;

  /// Price events of one product ordered by `(recorded_at, seq)`.
  fn price_events(
    &self,
    id: ProductId,
  ) -> impl Future<Output = Result<Vec<PriceEvent>, Self::Error>> + Send + '_;
}
