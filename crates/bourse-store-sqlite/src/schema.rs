//! SQL schema for the bourse SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

-- Prices are decimal strings at scale 2.
CREATE TABLE IF NOT EXISTS products (
    product_id    INTEGER PRIMARY KEY AUTOINCREMENT,
    name          TEXT NOT NULL UNIQUE,
    category      TEXT NOT NULL,
    highlight     TEXT,            -- 'yellow' | 'purple' | 'blue' | NULL
    base_price    TEXT NOT NULL,
    current_price TEXT NOT NULL,
    min_price     TEXT NOT NULL,
    max_price     TEXT NOT NULL,
    last_change   TEXT NOT NULL DEFAULT '0'
);

-- Strictly append-only. One row at provisioning, one per mutation.
CREATE TABLE IF NOT EXISTS price_events (
    seq         INTEGER PRIMARY KEY AUTOINCREMENT,
    product_id  INTEGER NOT NULL REFERENCES products(product_id),
    price       TEXT NOT NULL,
    recorded_at TEXT NOT NULL      -- fixed-width RFC 3339 UTC, microseconds
);

-- Strictly append-only. One row per purchase.
CREATE TABLE IF NOT EXISTS orders (
    seq        INTEGER PRIMARY KEY AUTOINCREMENT,
    product_id INTEGER NOT NULL REFERENCES products(product_id),
    ordered_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS products_category_idx ON products(category);
CREATE INDEX IF NOT EXISTS price_events_product_idx
    ON price_events(product_id, recorded_at);
CREATE INDEX IF NOT EXISTS orders_ordered_idx ON orders(ordered_at);

PRAGMA user_version = 1;
";
