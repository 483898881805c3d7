//! ScaleWeekly curator — binary entrypoint.
//! One invocation is one curation run: scrape, score, rank, persist, report.

use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use scaleweekly_curator::config::CurationConfig;
use scaleweekly_curator::pipeline::CurationPipeline;
use scaleweekly_curator::score::provider::GeminiProvider;
use scaleweekly_curator::store::JsonFileStore;

const ENV_STORE_PATH: &str = "CURATION_STORE_PATH";
const DEFAULT_STORE_PATH: &str = "data/curated.json";

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("scaleweekly_curator=info,warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env in local/dev; no-op in prod environments.
    let _ = dotenvy::dotenv();
    init_tracing();

    let cfg = CurationConfig::load_default().context("loading curation config")?;
    let provider = Arc::new(GeminiProvider::from_env(
        &cfg.scoring.model,
        cfg.scoring.temperature,
    ));

    let store_path =
        std::env::var(ENV_STORE_PATH).unwrap_or_else(|_| DEFAULT_STORE_PATH.to_string());
    if let Some(parent) = std::path::Path::new(&store_path).parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("creating store directory {}", parent.display()))?;
    }
    let store = Arc::new(JsonFileStore::open(&store_path)?);

    let pipeline = CurationPipeline::with_default_adapters(provider, store, cfg);
    let summary = pipeline.run().await?;

    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}
