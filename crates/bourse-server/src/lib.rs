//! Server assembly for the bar bourse: configuration, catalog provisioning,
//! the decay scheduler and the HTTP application.

pub mod catalog;
pub mod config;
pub mod error;
pub mod scheduler;

use std::{
  path::{Path, PathBuf},
  sync::Arc,
};

use axum::Router;
use bourse_api::{ApiState, api_router};
use bourse_core::{
  clock::{Clock, SystemClock},
  engine::PricingEngine,
  store::PriceStore,
};
use tower_http::trace::TraceLayer;
use tracing::{error, info};

pub use self::{
  config::ServerConfig,
  error::{Error, Result},
  scheduler::SchedulerHandle,
};

/// Build the full application: the JSON API under `/api`, with request
/// tracing.
pub fn app<S, C>(state: ApiState<S, C>) -> Router
where
  S: PriceStore + 'static,
  C: Clock + 'static,
{
  Router::new()
    .nest("/api", api_router(state))
    .layer(TraceLayer::new_for_http())
}

/// Start the periodic decay tick against `store`.
///
/// A failed tick is logged and the schedule carries on.
pub fn spawn_decay<S, C>(
  engine: Arc<PricingEngine<C>>,
  store: Arc<S>,
  config: &ServerConfig,
) -> Result<SchedulerHandle>
where
  S: PriceStore + 'static,
  C: Clock + 'static,
{
  SchedulerHandle::spawn(config.decay_interval()?, move || {
    let engine = Arc::clone(&engine);
    let store = Arc::clone(&store);
    async move {
      match engine.decay_tick(store.as_ref()).await {
        Ok(changes) => info!(products = changes.len(), "prices decayed"),
        Err(e) => error!("decay tick failed: {e}"),
      }
    }
  })
}

/// Engine over the wall clock with the configured steps.
pub fn engine(config: &ServerConfig) -> Result<PricingEngine<SystemClock>> {
  Ok(PricingEngine::with_system_clock(config.pricing_rules()?))
}

/// Expand a leading `~` to the user's home directory.
pub fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}

#[cfg(test)]
mod tests {
  use std::time::Duration;

  use axum::{
    body::Body,
    http::{Request, StatusCode},
  };
  use bourse_core::clock::{ManualClock, TickSchedule};
  use bourse_store_sqlite::SqliteStore;
  use chrono::{TimeZone, Utc};
  use serde_json::Value;
  use tower::ServiceExt as _;

  use super::*;

  #[test]
  fn tilde_expands_to_home() {
    let home = std::env::var("HOME").unwrap_or_default();
    if home.is_empty() {
      return;
    }
    assert_eq!(expand_tilde(Path::new("~/drinks.db")), PathBuf::from(&home).join("drinks.db"));
    assert_eq!(expand_tilde(Path::new("drinks.db")), PathBuf::from("drinks.db"));
  }

  #[tokio::test]
  async fn app_serves_api_under_prefix() {
    let store = Arc::new(SqliteStore::open_in_memory().await.unwrap());
    catalog::seed_if_empty(store.as_ref(), Utc::now()).await.unwrap();

    let engine = Arc::new(engine(&ServerConfig::default()).unwrap());
    let schedule = spawn_decay(Arc::clone(&engine), Arc::clone(&store), &ServerConfig::default())
      .unwrap();
    let state = ApiState {
      store,
      engine,
      schedule: Arc::new(schedule.clone()) as Arc<dyn TickSchedule>,
    };

    let resp = app(state.clone())
      .oneshot(Request::get("/api/prices").body(Body::empty()).unwrap())
      .await
      .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(resp.into_body(), 1024 * 1024).await.unwrap();
    let json: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(json.as_array().unwrap().len(), 28);

    let resp = app(state.clone())
      .oneshot(Request::get("/api/next_drop_time").body(Body::empty()).unwrap())
      .await
      .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    schedule.shutdown().await;
    let resp = app(state)
      .oneshot(Request::get("/api/next_drop_time").body(Body::empty()).unwrap())
      .await
      .unwrap();
    assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
  }

  #[tokio::test(start_paused = true)]
  async fn scheduled_decay_lowers_prices() {
    let store = Arc::new(SqliteStore::open_in_memory().await.unwrap());
    let start = Utc.with_ymd_and_hms(2025, 6, 21, 20, 0, 0).unwrap();
    catalog::seed_if_empty(store.as_ref(), start).await.unwrap();

    let clock = ManualClock::new(start);
    let config = ServerConfig::default();
    let engine = Arc::new(PricingEngine::new(config.pricing_rules().unwrap(), clock.clone()));
    clock.set(start + chrono::TimeDelta::minutes(2));
    let schedule = spawn_decay(Arc::clone(&engine), Arc::clone(&store), &config).unwrap();

    // Shutdown waits for the in-flight tick to commit.
    tokio::time::sleep(Duration::from_secs(121)).await;
    schedule.shutdown().await;

    let step = config.pricing_rules().unwrap().decrease_amount();
    let products = store.list_products().await.unwrap();
    assert!(products.iter().all(|p| p.current_price == p.base_price - step));
    let history = store.price_events(products[0].id).await.unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(history[1].recorded_at, start + chrono::TimeDelta::minutes(2));
  }
}
