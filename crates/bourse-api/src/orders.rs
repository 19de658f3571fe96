//! Handlers for purchases and popularity.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/order` | Body: `{"product_id": 3}`; returns the new price |
//! | `GET`  | `/popular` | Optional `?minutes=N` (default 60); `{"<id>": count}` |

use std::collections::HashMap;

use axum::{
  Json,
  extract::{
    Query, State,
    rejection::{JsonRejection, QueryRejection},
  },
};
use bourse_core::{
  clock::Clock,
  engine::DEFAULT_POPULARITY_WINDOW_MINUTES,
  money::Price,
  product::ProductId,
  store::PriceStore,
};
use chrono::TimeDelta;
use serde::{Deserialize, Serialize};

use crate::{ApiState, error::ApiError};

// ─── Order ────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct OrderBody {
  pub product_id: Option<ProductId>,
}

#[derive(Debug, Serialize)]
pub struct OrderResponse {
  pub success:   bool,
  #[serde(with = "rust_decimal::serde::float")]
  pub new_price: Price,
}

/// `POST /order`, body `{"product_id": <id>}`
pub async fn create<S, C>(
  State(state): State<ApiState<S, C>>,
  payload: Result<Json<OrderBody>, JsonRejection>,
) -> Result<Json<OrderResponse>, ApiError>
where
  S: PriceStore,
  C: Clock,
{
  let Json(body) = payload?;
  let product_id = body
    .product_id
    .filter(|id| *id > 0)
    .ok_or_else(|| ApiError::BadRequest("product_id is required".into()))?;

  let purchase = state.engine.purchase(state.store.as_ref(), product_id).await?;
  Ok(Json(OrderResponse { success: true, new_price: purchase.change.new_price }))
}

// ─── Popular ──────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize, Default)]
pub struct PopularParams {
  /// Trailing window length in minutes.
  pub minutes: Option<i64>,
}

/// `GET /popular[?minutes=N]`
pub async fn popular<S, C>(
  State(state): State<ApiState<S, C>>,
  params: Result<Query<PopularParams>, QueryRejection>,
) -> Result<Json<HashMap<ProductId, u64>>, ApiError>
where
  S: PriceStore,
  C: Clock,
{
  let Query(params) = params?;
  let minutes = params.minutes.unwrap_or(DEFAULT_POPULARITY_WINDOW_MINUTES);
  let window = TimeDelta::try_minutes(minutes)
    .ok_or_else(|| ApiError::BadRequest(format!("window of {minutes} minutes is out of range")))?;

  let counts = state.engine.popularity(state.store.as_ref(), window).await?;
  Ok(Json(counts))
}
