//! Encoding and decoding helpers between domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as fixed-width RFC 3339 strings (microseconds, `Z`
//! suffix) so that string comparison in SQL matches chronological order.
//! Prices are stored as decimal strings.

use std::str::FromStr as _;

use bourse_core::{
  event::PriceEvent,
  money::Price,
  product::{Highlight, Product, ProductId},
};
use chrono::{DateTime, SecondsFormat, SubsecRound as _, Utc};

use crate::{Error, Result};

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

/// Drop precision the column cannot hold, so values read back compare equal.
pub fn normalize_dt(dt: DateTime<Utc>) -> DateTime<Utc> { dt.trunc_subsecs(6) }

pub fn encode_dt(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Price ───────────────────────────────────────────────────────────────────

pub fn encode_price(p: Price) -> String { p.to_string() }

pub fn decode_price(s: &str) -> Result<Price> { Ok(Price::from_str(s)?) }

// ─── Highlight ───────────────────────────────────────────────────────────────

pub fn encode_highlight(h: Highlight) -> &'static str {
  match h {
    Highlight::Yellow => "yellow",
    Highlight::Purple => "purple",
    Highlight::Blue => "blue",
  }
}

pub fn decode_highlight(s: &str) -> Result<Highlight> {
  match s {
    "yellow" => Ok(Highlight::Yellow),
    "purple" => Ok(Highlight::Purple),
    "blue" => Ok(Highlight::Blue),
    other => Err(Error::UnknownHighlight(other.to_owned())),
  }
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Column list matching [`RawProduct::from_row`].
pub const PRODUCT_COLUMNS: &str = "product_id, name, category, highlight, base_price, \
                                   current_price, min_price, max_price, last_change";

/// Raw values read directly from a `products` row.
pub struct RawProduct {
  pub product_id:    ProductId,
  pub name:          String,
  pub category:      String,
  pub highlight:     Option<String>,
  pub base_price:    String,
  pub current_price: String,
  pub min_price:     String,
  pub max_price:     String,
  pub last_change:   String,
}

impl RawProduct {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      product_id:    row.get(0)?,
      name:          row.get(1)?,
      category:      row.get(2)?,
      highlight:     row.get(3)?,
      base_price:    row.get(4)?,
      current_price: row.get(5)?,
      min_price:     row.get(6)?,
      max_price:     row.get(7)?,
      last_change:   row.get(8)?,
    })
  }

  pub fn into_product(self) -> Result<Product> {
    Ok(Product {
      id:            self.product_id,
      name:          self.name,
      category:      self.category,
      highlight:     self.highlight.as_deref().map(decode_highlight).transpose()?,
      base_price:    decode_price(&self.base_price)?,
      current_price: decode_price(&self.current_price)?,
      min_price:     decode_price(&self.min_price)?,
      max_price:     decode_price(&self.max_price)?,
      last_change:   decode_price(&self.last_change)?,
    })
  }
}

/// Raw values read directly from a `price_events` row.
pub struct RawPriceEvent {
  pub seq:         i64,
  pub product_id:  ProductId,
  pub price:       String,
  pub recorded_at: String,
}

impl RawPriceEvent {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      seq:         row.get(0)?,
      product_id:  row.get(1)?,
      price:       row.get(2)?,
      recorded_at: row.get(3)?,
    })
  }

  pub fn into_event(self) -> Result<PriceEvent> {
    Ok(PriceEvent {
      seq:         self.seq,
      product_id:  self.product_id,
      price:       decode_price(&self.price)?,
      recorded_at: decode_dt(&self.recorded_at)?,
    })
  }
}
