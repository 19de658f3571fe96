//! [`SqliteStore`]: the SQLite implementation of [`PriceStore`].

use std::{collections::HashMap, path::Path};

use bourse_core::{
  event::{OrderEvent, PriceEvent},
  money::Price,
  pricing::{PriceChange, PricingRules},
  product::{NewProduct, Product, ProductId},
  store::{CategoryTimeline, PriceStore, Purchase},
};
use chrono::{DateTime, Utc};
use rusqlite::{OptionalExtension as _, Transaction, TransactionBehavior};

use crate::{
  Error, Result,
  encode::{
    PRODUCT_COLUMNS, RawPriceEvent, RawProduct, encode_dt, encode_highlight, encode_price,
    normalize_dt,
  },
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A price ledger backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  pub(crate) conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store, used by tests.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

/// Persist one transition: the product's new price and its price event.
fn write_change(
  tx: &Transaction<'_>,
  change: &PriceChange,
  at: &str,
) -> rusqlite::Result<()> {
  tx.execute(
    "UPDATE products SET current_price = ?1, last_change = ?2 WHERE product_id = ?3",
    rusqlite::params![
      encode_price(change.new_price),
      encode_price(change.last_change),
      change.product_id,
    ],
  )?;
  tx.execute(
    "INSERT INTO price_events (product_id, price, recorded_at) VALUES (?1, ?2, ?3)",
    rusqlite::params![change.product_id, encode_price(change.new_price), at],
  )?;
  Ok(())
}

fn select_products(tx: &Transaction<'_>) -> rusqlite::Result<Vec<RawProduct>> {
  let mut stmt = tx.prepare(&format!(
    "SELECT {PRODUCT_COLUMNS} FROM products ORDER BY product_id"
  ))?;
  stmt
    .query_map([], RawProduct::from_row)?
    .collect::<rusqlite::Result<Vec<_>>>()
}

// ─── PriceStore impl ─────────────────────────────────────────────────────────

impl PriceStore for SqliteStore {
  type Error = Error;

  // ── Provisioning ──────────────────────────────────────────────────────────

  async fn add_product(&self, input: NewProduct, at: DateTime<Utc>) -> Result<Product> {
    let input = input.validate()?;
    let at_str = encode_dt(normalize_dt(at));

    let name          = input.name.clone();
    let category      = input.category.clone();
    let highlight_str = input.highlight.map(encode_highlight);
    let base_str      = encode_price(input.base_price);
    let min_str       = encode_price(input.min_price);
    let max_str       = encode_price(input.max_price);

    let id: ProductId = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        tx.execute(
          "INSERT INTO products (
             name, category, highlight, base_price, current_price, min_price, max_price
           ) VALUES (?1, ?2, ?3, ?4, ?4, ?5, ?6)",
          rusqlite::params![name, category, highlight_str, base_str, min_str, max_str],
        )?;
        let id = tx.last_insert_rowid();
        tx.execute(
          "INSERT INTO price_events (product_id, price, recorded_at) VALUES (?1, ?2, ?3)",
          rusqlite::params![id, base_str, at_str],
        )?;
        tx.commit()?;
        Ok(id)
      })
      .await?;

    Ok(Product {
      id,
      name:          input.name,
      category:      input.category,
      highlight:     input.highlight,
      base_price:    input.base_price,
      current_price: input.base_price,
      min_price:     input.min_price,
      max_price:     input.max_price,
      last_change:   Price::ZERO,
    })
  }

  // ── Snapshot reads ────────────────────────────────────────────────────────

  async fn get_product(&self, id: ProductId) -> Result<Option<Product>> {
    let raw: Option<RawProduct> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE product_id = ?1"),
              rusqlite::params![id],
              RawProduct::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawProduct::into_product).transpose()
  }

  async fn list_products(&self) -> Result<Vec<Product>> {
    let raws: Vec<RawProduct> = self
      .conn
      .call(|conn| {
        let tx = conn.transaction()?;
        let rows = select_products(&tx)?;
        tx.finish()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawProduct::into_product).collect()
  }

  async fn is_empty(&self) -> Result<bool> {
    let empty = self
      .conn
      .call(|conn| {
        Ok(conn.query_row(
          "SELECT NOT EXISTS (SELECT 1 FROM products)",
          [],
          |row| row.get::<_, bool>(0),
        )?)
      })
      .await?;
    Ok(empty)
  }

  // ── Mutations ─────────────────────────────────────────────────────────────

  async fn apply_purchase(
    &self,
    id: ProductId,
    rules: PricingRules,
    at: DateTime<Utc>,
  ) -> Result<Option<Purchase>> {
    let at = normalize_dt(at);
    let at_str = encode_dt(at);

    let committed: Option<(PriceChange, i64)> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let raw = tx
          .query_row(
            &format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE product_id = ?1"),
            rusqlite::params![id],
            RawProduct::from_row,
          )
          .optional()?;

        // Dropping `tx` rolls back; nothing has been written yet.
        let Some(raw) = raw else { return Ok(None) };
        let product = raw.into_product().map_err(Error::into_call_error)?;

        let change = rules.on_purchase(&product);
        write_change(&tx, &change, &at_str)?;
        tx.execute(
          "INSERT INTO orders (product_id, ordered_at) VALUES (?1, ?2)",
          rusqlite::params![id, at_str],
        )?;
        let order_seq = tx.last_insert_rowid();
        tx.commit()?;
        Ok(Some((change, order_seq)))
      })
      .await?;

    Ok(committed.map(|(change, seq)| Purchase {
      change,
      order: OrderEvent { seq, product_id: id, ordered_at: at },
    }))
  }

  async fn apply_decay(&self, rules: PricingRules, at: DateTime<Utc>) -> Result<Vec<PriceChange>> {
    let at_str = encode_dt(normalize_dt(at));

    let changes = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let mut changes = Vec::new();
        for raw in select_products(&tx)? {
          let product = raw.into_product().map_err(Error::into_call_error)?;
          let change = rules.on_decay(&product);
          write_change(&tx, &change, &at_str)?;
          changes.push(change);
        }
        tx.commit()?;
        Ok(changes)
      })
      .await?;

    Ok(changes)
  }

  // ── Derived views ─────────────────────────────────────────────────────────

  async fn order_counts(
    &self,
    from: DateTime<Utc>,
    to: DateTime<Utc>,
  ) -> Result<HashMap<ProductId, u64>> {
    let from_str = encode_dt(normalize_dt(from));
    let to_str   = encode_dt(normalize_dt(to));

    let counts = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT product_id, COUNT(*) FROM orders
           WHERE ordered_at >= ?1 AND ordered_at <= ?2
           GROUP BY product_id",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![from_str, to_str], |row| {
            Ok((row.get::<_, ProductId>(0)?, row.get::<_, u64>(1)?))
          })?
          .collect::<rusqlite::Result<HashMap<_, _>>>()?;
        Ok(rows)
      })
      .await?;

    Ok(counts)
  }

  async fn category_timeline(&self, category: &str) -> Result<CategoryTimeline> {
    let category = category.to_owned();
    let query_category = category.clone();

    let (product_ids, raws): (Vec<ProductId>, Vec<RawPriceEvent>) = self
      .conn
      .call(move |conn| {
        // One read transaction, so members and events come from one snapshot.
        let tx = conn.transaction()?;
        let product_ids = {
          let mut stmt = tx.prepare(
            "SELECT product_id FROM products WHERE category = ?1 ORDER BY product_id",
          )?;
          stmt
            .query_map(rusqlite::params![query_category], |row| row.get(0))?
            .collect::<rusqlite::Result<Vec<ProductId>>>()?
        };
        let events = {
          let mut stmt = tx.prepare(
            "SELECT e.seq, e.product_id, e.price, e.recorded_at
             FROM price_events e
             JOIN products p ON p.product_id = e.product_id
             WHERE p.category = ?1
             ORDER BY e.recorded_at, e.seq",
          )?;
          stmt
            .query_map(rusqlite::params![query_category], RawPriceEvent::from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?
        };
        tx.finish()?;
        Ok((product_ids, events))
      })
      .await?;

    let events = raws
      .into_iter()
      .map(RawPriceEvent::into_event)
      .collect::<Result<Vec<_>>>()?;

    Ok(CategoryTimeline { category, product_ids, events })
  }

  async fn price_events(&self, id: ProductId) -> Result<Vec<PriceEvent>> {
    let raws: Vec<RawPriceEvent> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT seq, product_id, price, recorded_at FROM price_events
           WHERE product_id = ?1
           ORDER BY recorded_at, seq",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![id], RawPriceEvent::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawPriceEvent::into_event).collect()
  }
}
