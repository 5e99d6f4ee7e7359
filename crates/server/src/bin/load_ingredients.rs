//! Bulk-load the ingredient catalogue from a JSON file.
//!
//! Usage: `load-ingredients <path.json>`, where the file holds an array of
//! `{"name": ..., "measurement_unit": ...}` objects. Existing
//! (name, unit) pairs are skipped.

use std::sync::Arc;

use anyhow::Context;
use foodgram_common::Config;
use foodgram_core::{IngredientSeed, IngredientService};
use foodgram_db::repositories::IngredientRepository;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "foodgram=info,load_ingredients=info".into()),
        )
        .init();

    let path = std::env::args()
        .nth(1)
        .context("usage: load-ingredients <path.json>")?;

    let raw = tokio::fs::read_to_string(&path)
        .await
        .with_context(|| format!("reading {path}"))?;
    let seeds: Vec<IngredientSeed> =
        serde_json::from_str(&raw).with_context(|| format!("parsing {path}"))?;
    info!(path = %path, entries = seeds.len(), "Loaded ingredient file");

    let config = Config::load()?;
    let db = foodgram_db::init(&config).await?;
    foodgram_db::migrate(&db).await?;

    let service = IngredientService::new(IngredientRepository::new(Arc::new(db)));
    let report = service.import(seeds).await?;

    info!(
        created = report.created,
        skipped = report.skipped,
        "Ingredients loaded"
    );
    Ok(())
}
