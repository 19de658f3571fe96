//! Handlers for historical prices.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/price_history/{category}` | Average-price trend of a category |
//! | `GET`  | `/products/{id}/history` | Raw price events of one product |

use axum::{
  Json,
  extract::{Path, State, rejection::PathRejection},
};
use bourse_core::{
  clock::Clock,
  event::PriceEvent,
  history::TrendPoint,
  product::ProductId,
  store::PriceStore,
};

use crate::{ApiState, error::ApiError};

/// `GET /price_history/{category}`
pub async fn category<S, C>(
  State(state): State<ApiState<S, C>>,
  category: Result<Path<String>, PathRejection>,
) -> Result<Json<Vec<TrendPoint>>, ApiError>
where
  S: PriceStore,
  C: Clock,
{
  let Path(category) = category?;
  let trend = state
    .engine
    .category_trend(state.store.as_ref(), &category)
    .await?;
  Ok(Json(trend))
}

/// `GET /products/{id}/history`
pub async fn product<S, C>(
  State(state): State<ApiState<S, C>>,
  id: Result<Path<ProductId>, PathRejection>,
) -> Result<Json<Vec<PriceEvent>>, ApiError>
where
  S: PriceStore,
  C: Clock,
{
  let Path(id) = id?;
  let events = state.engine.product_history(state.store.as_ref(), id).await?;
  Ok(Json(events))
}
