//! The bar's opening drink list, provisioned into an empty store.

use bourse_core::{
  product::{Highlight, NewProduct},
  store::PriceStore,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use tracing::info;

type Entry = (&'static str, &'static str, Option<Highlight>, i64, i64, i64);

/// Name, category, highlight, then base/min/max prices in cents.
const DRINKS: &[Entry] = &[
  ("Pastis 51", "Alcool 4cl", None, 510, 400, 800),
  ("Martini", "Alcool 4cl", Some(Highlight::Blue), 860, 650, 1200),
  ("Vodka", "Alcool 4cl", Some(Highlight::Yellow), 670, 500, 1000),
  ("Gin / Tequila", "Alcool 4cl", None, 780, 600, 1150),
  ("Havana 3 ans", "Alcool 4cl", Some(Highlight::Purple), 1030, 800, 1500),
  ("Get 27", "Alcool 4cl", None, 500, 400, 750),
  ("Captain Morgan", "Alcool 4cl", Some(Highlight::Yellow), 940, 700, 1400),
  ("Whisky", "Alcool 4cl", None, 480, 400, 800),
  ("Hendricks", "Supérieur 4cl", None, 1030, 850, 1600),
  ("Nikka", "Supérieur 4cl", None, 890, 700, 1300),
  ("Grey Goose", "Supérieur 4cl", None, 1050, 850, 1650),
  ("Diplomatico", "Supérieur 4cl", Some(Highlight::Purple), 1420, 1100, 2000),
  ("Jack Daniels", "Supérieur 4cl", None, 730, 600, 1100),
  ("Leffe", "Bière 50cl", None, 790, 600, 1100),
  ("Hoegaarden", "Bière 50cl", None, 760, 600, 1050),
  ("Leffe Ruby", "Bière 50cl", Some(Highlight::Purple), 1080, 800, 1500),
  ("Gir. de Stella", "Bière 50cl", None, 3400, 2800, 4500),
  ("Rge Côte du Rh.", "Vin 12cl", None, 450, 350, 700),
  ("Chardonnay", "Vin 12cl", Some(Highlight::Yellow), 450, 350, 700),
  ("Rosé", "Vin 12cl", None, 690, 500, 950),
  ("Delirium", "Bière Bouteille", Some(Highlight::Yellow), 1060, 800, 1500),
  ("Guiness", "Bière Bouteille", None, 820, 650, 1200),
  ("Cubanisto", "Bière Bouteille", None, 600, 450, 900),
  ("Jager Bomb", "Shooter 3cl", None, 850, 600, 1200),
  ("VodkAromatisé", "Shooter 3cl", None, 390, 300, 600),
  ("Neymar", "Shooter 3cl", Some(Highlight::Purple), 530, 400, 800),
  ("Soft", "Sans Alcool 33cl", None, 520, 400, 700),
  ("Red Bull 25cl", "Sans Alcool 33cl", None, 410, 350, 600),
];

pub fn sample_catalog() -> Vec<NewProduct> {
  DRINKS
    .iter()
    .map(|&(name, category, highlight, base, min, max)| NewProduct {
      name: name.to_owned(),
      category: category.to_owned(),
      highlight,
      base_price: Decimal::new(base, 2),
      min_price: Decimal::new(min, 2),
      max_price: Decimal::new(max, 2),
    })
    .collect()
}

/// Provision [`sample_catalog`] if `store` holds no products yet. Returns the
/// number of products added.
pub async fn seed_if_empty<S: PriceStore>(store: &S, at: DateTime<Utc>) -> Result<usize, S::Error> {
  if !store.is_empty().await? {
    info!("catalog already provisioned, skipping seed");
    return Ok(0);
  }

  let catalog = sample_catalog();
  let count = catalog.len();
  for product in catalog {
    store.add_product(product, at).await?;
  }
  info!(count, "provisioned sample catalog");
  Ok(count)
}
