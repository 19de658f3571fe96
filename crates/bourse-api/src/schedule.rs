//! Handler for `GET /next_drop_time`.

use axum::{Json, extract::State};
use bourse_core::{clock::Clock, store::PriceStore};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::{ApiState, error::ApiError};

#[derive(Debug, Serialize)]
pub struct NextDrop {
  pub next_drop_time: DateTime<Utc>,
}

/// `GET /next_drop_time`
pub async fn next_drop<S, C>(State(state): State<ApiState<S, C>>) -> Result<Json<NextDrop>, ApiError>
where
  S: PriceStore,
  C: Clock,
{
  let next_drop_time = state
    .schedule
    .next_run_time()
    .ok_or_else(|| ApiError::Unavailable("price decay is not scheduled".into()))?;
  Ok(Json(NextDrop { next_drop_time }))
}
