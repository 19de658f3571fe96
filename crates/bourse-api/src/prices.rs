//! Handlers for the price board snapshot.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/prices` | Every product with its current price |
//! | `GET`  | `/categories` | Distinct categories in catalog order |

use axum::{Json, extract::State};
use bourse_core::{clock::Clock, product::Product, store::PriceStore};

use crate::{ApiState, error::ApiError};

/// `GET /prices`
pub async fn list<S, C>(State(state): State<ApiState<S, C>>) -> Result<Json<Vec<Product>>, ApiError>
where
  S: PriceStore,
  C: Clock,
{
  let products = state.engine.list_products(state.store.as_ref()).await?;
  Ok(Json(products))
}

/// `GET /categories`
pub async fn categories<S, C>(
  State(state): State<ApiState<S, C>>,
) -> Result<Json<Vec<String>>, ApiError>
where
  S: PriceStore,
  C: Clock,
{
  let categories = state.engine.categories(state.store.as_ref()).await?;
  Ok(Json(categories))
}
