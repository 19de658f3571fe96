//! As-of reconstruction of a category's average price.
//!
//! Each product contributes an independently timestamped sequence of price
//! events. The trend has one sample per distinct change timestamp across the
//! category; each sample averages every product's latest known price at that
//! instant. Products with no event at or before a sample do not contribute.
//!
//! The sweep keeps one cursor per product and a min-heap of the cursors' next
//! timestamps. Timestamps are visited in ascending order, so each cursor only
//! ever moves forward, and a running sum is adjusted by the delta of the
//! cursors that advanced.

use std::{
  cmp::Reverse,
  collections::{BinaryHeap, HashMap},
};

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{
  event::PriceEvent,
  money::{Price, round_price},
  product::ProductId,
  store::CategoryTimeline,
};

/// One sample of a category trend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendPoint {
  pub timestamp: DateTime<Utc>,
  #[serde(with = "rust_decimal::serde::float")]
  pub price:     Price,
}

struct Cursor<'a> {
  events: Vec<&'a PriceEvent>,
  next:   usize,
  known:  Option<Price>,
}

impl Cursor<'_> {
  fn next_at(&self) -> Option<DateTime<Utc>> {
    self.events.get(self.next).map(|e| e.recorded_at)
  }

  /// Consume every event at or before `at`; return the latest price seen.
  fn advance_to(&mut self, at: DateTime<Utc>) -> Option<Price> {
    let mut latest = None;
    while let Some(event) = self.events.get(self.next) {
      if event.recorded_at > at {
        break;
      }
      latest = Some(event.price);
      self.next += 1;
    }
    latest
  }
}

/// Reconstruct the average-price series of `timeline`, ascending by time.
pub fn category_trend(timeline: &CategoryTimeline) -> Vec<TrendPoint> {
  let mut per_product: HashMap<ProductId, Vec<&PriceEvent>> = timeline
    .product_ids
    .iter()
    .map(|id| (*id, Vec::new()))
    .collect();
  for event in &timeline.events {
    if let Some(events) = per_product.get_mut(&event.product_id) {
      events.push(event);
    }
  }

  let mut cursors: Vec<Cursor<'_>> = per_product
    .into_values()
    .filter(|events| !events.is_empty())
    .map(|mut events| {
      events.sort_by_key(|e| (e.recorded_at, e.seq));
      Cursor { events, next: 0, known: None }
    })
    .collect();

  let mut pending: BinaryHeap<Reverse<(DateTime<Utc>, usize)>> = cursors
    .iter()
    .enumerate()
    .filter_map(|(idx, c)| c.next_at().map(|at| Reverse((at, idx))))
    .collect();

  let mut points = Vec::new();
  let mut sum = Decimal::ZERO;
  let mut known: u32 = 0;

  while let Some(&Reverse((at, _))) = pending.peek() {
    while let Some(&Reverse((next_at, idx))) = pending.peek() {
      if next_at != at {
        break;
      }
      pending.pop();

      let cursor = &mut cursors[idx];
      if let Some(price) = cursor.advance_to(at) {
        match cursor.known.replace(price) {
          Some(previous) => sum -= previous,
          None => known += 1,
        }
        sum += price;
      }
      if let Some(next) = cursor.next_at() {
        pending.push(Reverse((next, idx)));
      }
    }

    if known > 0 {
      points.push(TrendPoint {
        timestamp: at,
        price:     round_price(sum / Decimal::from(known)),
      });
    }
  }

  points
}
