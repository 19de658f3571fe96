//! JSON REST API for the bar bourse.
//!
//! Exposes an axum [`Router`] backed by any [`PriceStore`]. Static assets,
//! TLS and transport concerns are the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", bourse_api::api_router(state))
//! ```

pub mod error;
pub mod history;
pub mod orders;
pub mod prices;
pub mod schedule;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, post},
};
use bourse_core::{
  clock::{Clock, SystemClock, TickSchedule},
  engine::PricingEngine,
  store::PriceStore,
};

pub use error::ApiError;

/// Shared state threaded through all handlers.
pub struct ApiState<S, C = SystemClock> {
  pub store:    Arc<S>,
  pub engine:   Arc<PricingEngine<C>>,
  pub schedule: Arc<dyn TickSchedule>,
}

impl<S, C> Clone for ApiState<S, C> {
  fn clone(&self) -> Self {
    Self {
      store:    Arc::clone(&self.store),
      engine:   Arc::clone(&self.engine),
      schedule: Arc::clone(&self.schedule),
    }
  }
}

/// Build a fully-materialised API router for `state`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S, C>(state: ApiState<S, C>) -> Router<()>
where
  S: PriceStore + 'static,
  C: Clock + 'static,
{
  Router::new()
    // Board
    .route("/prices", get(prices::list::<S, C>))
    .route("/categories", get(prices::categories::<S, C>))
    // Orders
    .route("/order", post(orders::create::<S, C>))
    .route("/popular", get(orders::popular::<S, C>))
    // History
    .route("/price_history/{category}", get(history::category::<S, C>))
    .route("/products/{id}/history", get(history::product::<S, C>))
    // Scheduler
    .route("/next_drop_time", get(schedule::next_drop::<S, C>))
    .with_state(state)
}

// ─── Integration tests ────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use super::*;

  use axum::{
    body::Body,
    http::{Request, StatusCode, header},
  };
  use bourse_core::{
    clock::ManualClock,
    pricing::PricingRules,
    product::{NewProduct, Product},
  };
  use bourse_store_sqlite::SqliteStore;
  use chrono::{DateTime, TimeDelta, TimeZone, Utc};
  use rust_decimal_macros::dec;
  use serde_json::Value;
  use tower::ServiceExt as _;

  struct FixedSchedule(Option<DateTime<Utc>>);

  impl TickSchedule for FixedSchedule {
    fn next_run_time(&self) -> Option<DateTime<Utc>> { self.0 }
  }

  fn opening() -> DateTime<Utc> { Utc.with_ymd_and_hms(2025, 6, 21, 20, 0, 0).unwrap() }

  struct Harness {
    state:    ApiState<SqliteStore, ManualClock>,
    clock:    ManualClock,
    products: Vec<Product>,
  }

  async fn harness(next_run: Option<DateTime<Utc>>) -> Harness {
    let store = SqliteStore::open_in_memory().await.unwrap();
    let mut products = Vec::new();
    for input in [
      NewProduct::new("Leffe", "Bière 50cl", dec!(10.00), dec!(5.00), dec!(12.00)),
      NewProduct::new("Hoegaarden", "Bière 50cl", dec!(6.00), dec!(5.00), dec!(10.50)),
      NewProduct::new("Soft", "Sans Alcool 33cl", dec!(5.20), dec!(4.00), dec!(7.00)),
    ] {
      products.push(store.add_product(input, opening()).await.unwrap());
    }

    let clock = ManualClock::new(opening());
    let state = ApiState {
      store:    Arc::new(store),
      engine:   Arc::new(PricingEngine::new(PricingRules::default(), clock.clone())),
      schedule: Arc::new(FixedSchedule(next_run)),
    };
    Harness { state, clock, products }
  }

  async fn send(
    state: &ApiState<SqliteStore, ManualClock>,
    method: &str,
    uri: &str,
    body: Option<&str>,
  ) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if body.is_some() {
      builder = builder.header(header::CONTENT_TYPE, "application/json");
    }
    let req = builder
      .body(Body::from(body.unwrap_or_default().to_owned()))
      .unwrap();
    let resp = api_router(state.clone()).oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), 1024 * 1024).await.unwrap();
    let json = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes).unwrap() };
    (status, json)
  }

  // ── Prices ──────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn prices_lists_every_product() {
    let h = harness(None).await;
    let (status, json) = send(&h.state, "GET", "/prices", None).await;
    assert_eq!(status, StatusCode::OK);
    let rows = json.as_array().unwrap();
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[0]["name"], "Leffe");
    assert_eq!(rows[0]["current_price"], 10.0);
    assert_eq!(rows[0]["highlight_color"], Value::Null);
  }

  #[tokio::test]
  async fn categories_are_distinct() {
    let h = harness(None).await;
    let (status, json) = send(&h.state, "GET", "/categories", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json, serde_json::json!(["Bière 50cl", "Sans Alcool 33cl"]));
  }

  // ── Orders ──────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn order_returns_new_price() {
    let h = harness(None).await;
    let body = format!(r#"{{"product_id": {}}}"#, h.products[0].id);
    let (status, json) = send(&h.state, "POST", "/order", Some(&body)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["success"], true);
    assert_eq!(json["new_price"], 10.5);
  }

  #[tokio::test]
  async fn order_without_product_id_is_bad_request() {
    let h = harness(None).await;
    let (status, json) = send(&h.state, "POST", "/order", Some("{}")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["error"].as_str().unwrap().contains("product_id"));
  }

  #[tokio::test]
  async fn order_with_malformed_id_is_bad_request() {
    let h = harness(None).await;
    let (status, _) = send(&h.state, "POST", "/order", Some(r#"{"product_id": "abc"}"#)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let prices = h.state.store.list_products().await.unwrap();
    assert!(prices.iter().all(|p| p.current_price == p.base_price));
  }

  #[tokio::test]
  async fn order_with_non_positive_id_is_bad_request() {
    let h = harness(None).await;
    for body in [r#"{"product_id": 0}"#, r#"{"product_id": -3}"#] {
      let (status, json) = send(&h.state, "POST", "/order", Some(body)).await;
      assert_eq!(status, StatusCode::BAD_REQUEST);
      assert!(json["error"].as_str().unwrap().contains("product_id"));
    }
  }

  #[tokio::test]
  async fn order_for_unknown_product_is_not_found() {
    let h = harness(None).await;
    let (status, _) = send(&h.state, "POST", "/order", Some(r#"{"product_id": 999}"#)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
  }

  #[tokio::test]
  async fn popular_counts_recent_orders() {
    let h = harness(None).await;
    let leffe = h.products[0].id;
    let soft = h.products[2].id;

    h.clock.set(opening() + TimeDelta::minutes(1));
    let body = format!(r#"{{"product_id": {soft}}}"#);
    send(&h.state, "POST", "/order", Some(&body)).await;

    h.clock.set(opening() + TimeDelta::minutes(30));
    let body = format!(r#"{{"product_id": {leffe}}}"#);
    send(&h.state, "POST", "/order", Some(&body)).await;
    send(&h.state, "POST", "/order", Some(&body)).await;

    h.clock.set(opening() + TimeDelta::minutes(62));
    let (status, json) = send(&h.state, "GET", "/popular", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json[leffe.to_string()], 2);
    assert!(json.get(soft.to_string()).is_none());

    let (_, json) = send(&h.state, "GET", "/popular?minutes=120", None).await;
    assert_eq!(json[soft.to_string()], 1);
  }

  #[tokio::test]
  async fn popular_rejects_non_positive_window() {
    let h = harness(None).await;
    let (status, _) = send(&h.state, "GET", "/popular?minutes=0", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
  }

  #[tokio::test]
  async fn popular_rejects_window_beyond_calendar_range() {
    let h = harness(None).await;
    let (status, json) = send(&h.state, "GET", "/popular?minutes=1000000000000", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["error"].is_string());
  }

  #[tokio::test]
  async fn popular_with_malformed_minutes_returns_json_error() {
    let h = harness(None).await;
    let (status, json) = send(&h.state, "GET", "/popular?minutes=soon", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["error"].is_string());
  }

  // ── History ─────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn price_history_returns_category_trend() {
    let h = harness(None).await;
    h.clock.set(opening() + TimeDelta::minutes(5));
    let body = format!(r#"{{"product_id": {}}}"#, h.products[1].id);
    send(&h.state, "POST", "/order", Some(&body)).await;

    let (status, json) =
      send(&h.state, "GET", "/price_history/Bi%C3%A8re%2050cl", None).await;
    assert_eq!(status, StatusCode::OK);
    let points = json.as_array().unwrap();
    assert_eq!(points.len(), 2);
    assert_eq!(points[0]["price"], 8.0);
    assert_eq!(points[1]["price"], 8.25);
    assert!(points[1]["timestamp"].as_str().unwrap().starts_with("2025-06-21T20:05:00"));
  }

  #[tokio::test]
  async fn product_history_lists_events() {
    let h = harness(None).await;
    let id = h.products[2].id;
    let (status, json) = send(&h.state, "GET", &format!("/products/{id}/history"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json.as_array().unwrap().len(), 1);
    assert_eq!(json[0]["price"], 5.2);

    let (status, _) = send(&h.state, "GET", "/products/999/history", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
  }

  #[tokio::test]
  async fn product_history_with_malformed_id_returns_json_error() {
    let h = harness(None).await;
    let (status, json) = send(&h.state, "GET", "/products/abc/history", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["error"].as_str().unwrap().contains("abc"));
  }

  // ── Scheduler ───────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn next_drop_time_reports_schedule() {
    let next = opening() + TimeDelta::minutes(2);
    let h = harness(Some(next)).await;
    let (status, json) = send(&h.state, "GET", "/next_drop_time", None).await;
    assert_eq!(status, StatusCode::OK);
    let reported: DateTime<Utc> = json["next_drop_time"].as_str().unwrap().parse().unwrap();
    assert_eq!(reported, next);
  }

  #[tokio::test]
  async fn next_drop_time_unavailable_when_stopped() {
    let h = harness(None).await;
    let (status, _) = send(&h.state, "GET", "/next_drop_time", None).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
  }
}
