//! Runtime configuration.
//!
//! Read from an optional TOML file, then overlaid by `BOURSE_*` environment
//! variables (e.g. `BOURSE_PRICE_DECREASE_AMOUNT=0.20`).

use std::{
  path::{Path, PathBuf},
  time::Duration,
};

use bourse_core::pricing::PricingRules;
use config::{Config, ConfigBuilder, Environment, File, builder::DefaultState};
use rust_decimal::{Decimal, prelude::FromPrimitive as _};
use serde::Deserialize;

use crate::{Error, Result};

/// Prefix of the environment variables that override file settings.
pub const ENV_PREFIX: &str = "BOURSE";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
  pub host:                            String,
  pub port:                            u16,
  pub store_path:                      PathBuf,
  pub price_increase_on_order:         f64,
  pub price_decrease_interval_minutes: u64,
  pub price_decrease_amount:           f64,
  /// Provision the sample drinks when the store is empty.
  pub seed_catalog:                    bool,
}

impl Default for ServerConfig {
  fn default() -> Self {
    Self {
      host:                            "0.0.0.0".to_owned(),
      port:                            5000,
      store_path:                      PathBuf::from("drinks.db"),
      price_increase_on_order:         0.50,
      price_decrease_interval_minutes: 2,
      price_decrease_amount:           0.10,
      seed_catalog:                    true,
    }
  }
}

impl ServerConfig {
  /// Load from `path` (which may be absent) and the environment.
  pub fn load(path: &Path) -> Result<Self> {
    Self::load_with(path, Environment::with_prefix(ENV_PREFIX))
  }

  pub(crate) fn load_with(path: &Path, env: Environment) -> Result<Self> {
    Self::from_builder(
      Config::builder()
        .add_source(File::from(path).required(false))
        .add_source(env),
    )
  }

  pub(crate) fn from_builder(builder: ConfigBuilder<DefaultState>) -> Result<Self> {
    let cfg: Self = builder.build()?.try_deserialize()?;
    cfg.pricing_rules()?;
    cfg.decay_interval()?;
    Ok(cfg)
  }

  /// Step sizes as validated pricing rules; both must be strictly positive.
  pub fn pricing_rules(&self) -> Result<PricingRules> {
    let increase = to_decimal("price_increase_on_order", self.price_increase_on_order)?;
    let decrease = to_decimal("price_decrease_amount", self.price_decrease_amount)?;
    Ok(PricingRules::new(increase, decrease)?)
  }

  pub fn decay_interval(&self) -> Result<Duration> {
    if self.price_decrease_interval_minutes == 0 {
      return Err(Error::Config(
        "price_decrease_interval_minutes must be positive".into(),
      ));
    }
    self
      .price_decrease_interval_minutes
      .checked_mul(60)
      .map(Duration::from_secs)
      .ok_or_else(|| Error::Config("price_decrease_interval_minutes is too large".into()))
  }

  pub fn bind_address(&self) -> String { format!("{}:{}", self.host, self.port) }
}

fn to_decimal(key: &str, value: f64) -> Result<Decimal> {
  Decimal::from_f64(value).ok_or_else(|| Error::Config(format!("{key} is not a number: {value}")))
}
