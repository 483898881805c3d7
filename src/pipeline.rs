// src/pipeline.rs
//! End-to-end orchestration: aggregate sources, score in batches, rank the
//! winners, persist. Ingest and scoring fail open; persistence does not.

use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::Utc;
use metrics::{describe_counter, describe_gauge, describe_histogram, gauge};
use once_cell::sync::OnceCell;

use crate::aggregate;
use crate::config::CurationConfig;
use crate::rank;
use crate::score::provider::ScoreProvider;
use crate::score::ScoringClient;
use crate::sources::{
    BlogFeedAdapter, DevToAdapter, GuideAdapter, HackerNewsAdapter, KeywordFilter, RedditAdapter,
    SourceAdapter, VideoAdapter,
};
use crate::store::ArticleStore;
use crate::types::RunSummary;

/// One-time metrics registration (so series show up with descriptions).
pub fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!(
            "curate_items_scraped_total",
            "Items fetched across all source adapters."
        );
        describe_counter!(
            "curate_adapter_errors_total",
            "Source adapter fetch/parse errors."
        );
        describe_counter!(
            "curate_feed_errors_total",
            "Individual RSS feed fetch/parse errors."
        );
        describe_counter!(
            "curate_items_scored_total",
            "Items the judge returned valid scores for."
        );
        describe_counter!(
            "curate_score_fallback_batches_total",
            "Batches degraded to neutral fallback scores."
        );
        describe_histogram!("curate_feed_parse_ms", "RSS feed parse time in milliseconds.");
        describe_histogram!(
            "curate_score_batch_ms",
            "Judge latency per successful batch in milliseconds."
        );
        describe_gauge!(
            "curate_pipeline_last_run_ts",
            "Unix ts when the curation pipeline last completed."
        );
    });
}

pub struct CurationPipeline {
    adapters: Vec<Box<dyn SourceAdapter>>,
    scorer: ScoringClient,
    store: Arc<dyn ArticleStore>,
    cfg: CurationConfig,
}

impl CurationPipeline {
    pub fn new(
        adapters: Vec<Box<dyn SourceAdapter>>,
        provider: Arc<dyn ScoreProvider>,
        store: Arc<dyn ArticleStore>,
        cfg: CurationConfig,
    ) -> Self {
        ensure_metrics_described();
        let scorer = ScoringClient::new(provider, cfg.scoring.clone());
        Self {
            adapters,
            scorer,
            store,
            cfg,
        }
    }

    /// Standard production wiring: feeds + HN front page + dev.to + r/devops
    /// + the system-design primer guide + YouTube channels, all configured
    /// from `cfg.sources`.
    pub fn with_default_adapters(
        provider: Arc<dyn ScoreProvider>,
        store: Arc<dyn ArticleStore>,
        cfg: CurationConfig,
    ) -> Self {
        let s = &cfg.sources;
        let filter = KeywordFilter::new(&s.keywords);
        let adapters: Vec<Box<dyn SourceAdapter>> = vec![
            Box::new(BlogFeedAdapter::from_config(s)),
            Box::new(HackerNewsAdapter::new(filter.clone(), s.request_timeout_secs)),
            Box::new(DevToAdapter::new(filter.clone(), s.request_timeout_secs)),
            Box::new(RedditAdapter::new(
                filter,
                s.request_timeout_secs,
                s.description_max_chars,
            )),
            Box::new(GuideAdapter::new(s.quality_threshold, s.request_timeout_secs)),
            Box::new(VideoAdapter::from_env(
                s.channels.clone(),
                s.request_timeout_secs,
                s.description_max_chars,
            )),
        ];
        Self::new(adapters, provider, store, cfg)
    }

    /// One full curation run. Returns counts for the caller to log or print.
    ///
    /// An empty aggregate short-circuits before any judge call or store
    /// write, so a dead news day costs zero quota and leaves yesterday's
    /// ranks untouched.
    pub async fn run(&self) -> Result<RunSummary> {
        let items = aggregate::run_all(&self.adapters, self.cfg.sources.min_social_upvotes).await;
        if items.is_empty() {
            tracing::warn!("no items aggregated, skipping scoring and persistence");
            return Ok(RunSummary::empty());
        }
        let total_scraped = items.len();
        tracing::info!(total = total_scraped, "aggregated items, scoring");

        let scored = self.scorer.score_all(&items).await;
        let total_scored = scored.len();

        let ranked = rank::rank(scored, self.cfg.scoring.top_n);
        let ranked_count = ranked.featured.len();

        self.store
            .clear_all_ranks()
            .await
            .context("clearing previous ranks")?;
        for item in ranked.featured.iter().chain(ranked.rest.iter()) {
            self.store
                .upsert_by_url(item)
                .await
                .with_context(|| format!("persisting {}", item.item.url))?;
        }

        gauge!("curate_pipeline_last_run_ts").set(Utc::now().timestamp() as f64);
        tracing::info!(total_scraped, total_scored, ranked_count, "curation run complete");

        Ok(RunSummary {
            total_scraped,
            total_scored,
            ranked_count,
        })
    }
}
