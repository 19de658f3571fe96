//! bourse server binary.
//!
//! Reads `bourse.toml` (or the path given with `--config`), opens the SQLite
//! price ledger, provisions the sample catalog into an empty store, starts
//! the periodic price decay and serves the JSON API over HTTP.

use std::{path::PathBuf, sync::Arc};

use anyhow::Context as _;
use bourse_api::ApiState;
use bourse_server::{ServerConfig, catalog, expand_tilde};
use bourse_store_sqlite::SqliteStore;
use chrono::Utc;
use clap::Parser;
use tokio::net::TcpListener;
use tracing::{info, level_filters::LevelFilter};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Bar bourse pricing server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "bourse.toml")]
  config: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  let server_cfg = ServerConfig::load(&cli.config)
    .with_context(|| format!("failed to load configuration from {:?}", cli.config))?;

  let store_path = expand_tilde(&server_cfg.store_path);
  let store = SqliteStore::open(&store_path)
    .await
    .with_context(|| format!("failed to open store at {store_path:?}"))?;

  if server_cfg.seed_catalog {
    catalog::seed_if_empty(&store, Utc::now())
      .await
      .context("failed to provision catalog")?;
  }

  let store = Arc::new(store);
  let engine = Arc::new(bourse_server::engine(&server_cfg)?);
  let scheduler = bourse_server::spawn_decay(Arc::clone(&engine), Arc::clone(&store), &server_cfg)
    .context("failed to start decay scheduler")?;

  let state = ApiState {
    store,
    engine,
    schedule: Arc::new(scheduler.clone()),
  };
  let app = bourse_server::app(state);
  let address = server_cfg.bind_address();

  info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app)
    .with_graceful_shutdown(async {
      if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
      }
      info!("shutting down");
    })
    .await
    .context("server error")?;

  scheduler.shutdown().await;
  Ok(())
}
