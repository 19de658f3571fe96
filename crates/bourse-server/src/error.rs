//! Error type for server assembly.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("invalid configuration: {0}")]
  Config(String),

  #[error("configuration source error: {0}")]
  Source(#[from] config::ConfigError),

  #[error("decay interval out of range: {0}")]
  Interval(#[from] chrono::OutOfRangeError),

  #[error("core error: {0}")]
  Core(#[from] bourse_core::Error),

  #[error("store error: {0}")]
  Store(#[from] bourse_store_sqlite::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
