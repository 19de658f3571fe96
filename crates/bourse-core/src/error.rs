//! Error types for `bourse-core`.

use thiserror::Error;

use crate::product::ProductId;

#[derive(Debug, Error)]
pub enum Error {
  #[error("product not found: {0}")]
  ProductNotFound(ProductId),

  #[error("invalid input: {0}")]
  InvalidInput(String),

  /// The backing store was unavailable or aborted the transaction. No partial
  /// state was written.
  #[error("storage failure: {0}")]
  Storage(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
  pub fn storage<E>(err: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    Self::Storage(Box::new(err))
  }

  pub fn invalid(msg: impl Into<String>) -> Self { Self::InvalidInput(msg.into()) }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
