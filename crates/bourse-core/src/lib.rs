//! Core types and trait definitions for the bar bourse pricing ledger.
//!
//! This crate is deliberately free of HTTP and database dependencies. It owns
//! the price transition rules, the pricing engine that drives them, and the
//! as-of reconstruction of category price trends.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod clock;
pub mod engine;
pub mod error;
pub mod event;
pub mod history;
pub mod money;
pub mod pricing;
pub mod product;
pub mod store;

pub use error::{Error, Result};
