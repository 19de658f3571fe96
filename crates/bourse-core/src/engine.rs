//! The pricing engine.
//!
//! The engine owns the transition rules and a clock and nothing else. Every
//! operation receives the store it acts on, stamps the operation with one
//! clock reading and lets the store commit the read-modify-write atomically.

use std::collections::{HashMap, HashSet};

use chrono::TimeDelta;
use tracing::{debug, info, warn};

use crate::{
  Error, Result,
  clock::{Clock, SystemClock},
  event::PriceEvent,
  history::{self, TrendPoint},
  pricing::{PriceChange, PricingRules},
  product::{Product, ProductId},
  store::{PriceStore, Purchase},
};

/// Trailing window used by popularity queries when the caller names none.
pub const DEFAULT_POPULARITY_WINDOW_MINUTES: i64 = 60;

#[derive(Debug, Clone)]
pub struct PricingEngine<C = SystemClock> {
  rules: PricingRules,
  clock: C,
}

impl PricingEngine<SystemClock> {
  pub fn with_system_clock(rules: PricingRules) -> Self { Self::new(rules, SystemClock) }
}

impl<C: Clock> PricingEngine<C> {
  pub fn new(rules: PricingRules, clock: C) -> Self { Self { rules, clock } }

  pub fn rules(&self) -> PricingRules { self.rules }

  pub fn clock(&self) -> &C { &self.clock }

  // ── Mutations ─────────────────────────────────────────────────────────

  /// Record a purchase of `product_id` and bump its price.
  pub async fn purchase<S: PriceStore>(
    &self,
    store: &S,
    product_id: ProductId,
  ) -> Result<Purchase> {
    let at = self.clock.now();
    let purchase = store
      .apply_purchase(product_id, self.rules, at)
      .await
      .map_err(Error::storage)?;

    match purchase {
      Some(purchase) => {
        debug!(
          product_id,
          previous = %purchase.change.previous_price,
          price = %purchase.change.new_price,
          "recorded purchase"
        );
        Ok(purchase)
      }
      None => {
        warn!(product_id, "purchase of unknown product");
        Err(Error::ProductNotFound(product_id))
      }
    }
  }

  /// Decay every product's price by one step. All products share the tick's
  /// timestamp; the whole tick commits or none of it does.
  pub async fn decay_tick<S: PriceStore>(&self, store: &S) -> Result<Vec<PriceChange>> {
    let at = self.clock.now();
    let changes = store
      .apply_decay(self.rules, at)
      .await
      .map_err(Error::storage)?;

    info!(
      products = changes.len(),
      step = %self.rules.decrease_amount(),
      %at,
      "applied price decay"
    );
    Ok(changes)
  }

  // ── Reads ─────────────────────────────────────────────────────────────

  pub async fn list_products<S: PriceStore>(&self, store: &S) -> Result<Vec<Product>> {
    store.list_products().await.map_err(Error::storage)
  }

  /// Distinct categories, in the order their first product appears.
  pub async fn categories<S: PriceStore>(&self, store: &S) -> Result<Vec<String>> {
    let products = self.list_products(store).await?;
    let mut seen = HashSet::new();
    Ok(
      products
        .into_iter()
        .filter_map(|p| seen.insert(p.category.clone()).then_some(p.category))
        .collect(),
    )
  }

  /// Purchases per product over the trailing `window` ending now.
  pub async fn popularity<S: PriceStore>(
    &self,
    store: &S,
    window: TimeDelta,
  ) -> Result<HashMap<ProductId, u64>> {
    if window <= TimeDelta::zero() {
      return Err(Error::invalid(format!("popularity window must be positive, got {window}")));
    }
    let now = self.clock.now();
    let from = now
      .checked_sub_signed(window)
      .ok_or_else(|| Error::invalid(format!("popularity window of {window} is out of range")))?;
    store
      .order_counts(from, now)
      .await
      .map_err(Error::storage)
  }

  /// Average price of `category` at every instant one of its products changed.
  pub async fn category_trend<S: PriceStore>(
    &self,
    store: &S,
    category: &str,
  ) -> Result<Vec<TrendPoint>> {
    let timeline = store
      .category_timeline(category)
      .await
      .map_err(Error::storage)?;
    let trend = history::category_trend(&timeline);
    debug!(
      category,
      products = timeline.product_ids.len(),
      events = timeline.events.len(),
      points = trend.len(),
      "reconstructed category trend"
    );
    Ok(trend)
  }

  /// The full price history of one product.
  pub async fn product_history<S: PriceStore>(
    &self,
    store: &S,
    product_id: ProductId,
  ) -> Result<Vec<PriceEvent>> {
    if store
      .get_product(product_id)
      .await
      .map_err(Error::storage)?
      .is_none()
    {
      return Err(Error::ProductNotFound(product_id));
    }
    store.price_events(product_id).await.map_err(Error::storage)
  }
}
