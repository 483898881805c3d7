// tests/pipeline_run.rs
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use anyhow::Result;
use async_trait::async_trait;

use scaleweekly_curator::config::CurationConfig;
use scaleweekly_curator::error::{AdapterError, ScoreError};
use scaleweekly_curator::pipeline::CurationPipeline;
use scaleweekly_curator::score::provider::ScoreProvider;
use scaleweekly_curator::score::FALLBACK_SCORE;
use scaleweekly_curator::sources::SourceAdapter;
use scaleweekly_curator::store::ArticleStore;
use scaleweekly_curator::types::{RawItem, ScoredItem};

struct FixedAdapter {
    items: Vec<RawItem>,
}

#[async_trait]
impl SourceAdapter for FixedAdapter {
    async fn fetch(&self) -> Result<Vec<RawItem>, AdapterError> {
        Ok(self.items.clone())
    }
    fn name(&self) -> &'static str {
        "fixed"
    }
}

/// Scores item i as 10 - i, so input order determines the ranking.
struct DescendingJudge {
    calls: AtomicUsize,
}

#[async_trait]
impl ScoreProvider for DescendingJudge {
    async fn generate(&self, prompt: &str) -> Result<String, ScoreError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        // The prompt enumerates the batch as "0. Title (source)" lines.
        let n = prompt
            .lines()
            .filter(|l| l.starts_with(char::is_numeric))
            .count();
        let entries: Vec<String> = (0..n)
            .map(|i| format!(r#"{{"index":{i},"score":{}}}"#, 10usize.saturating_sub(i).max(1)))
            .collect();
        Ok(format!("[{}]", entries.join(",")))
    }
    fn name(&self) -> &'static str {
        "descending"
    }
}

struct FailingJudge;

#[async_trait]
impl ScoreProvider for FailingJudge {
    async fn generate(&self, _prompt: &str) -> Result<String, ScoreError> {
        Err(ScoreError::Status(503))
    }
    fn name(&self) -> &'static str {
        "failing"
    }
}

#[derive(Default)]
struct MemoryStore {
    records: Mutex<BTreeMap<String, ScoredItem>>,
    clear_calls: AtomicUsize,
    upsert_calls: AtomicUsize,
}

#[async_trait]
impl ArticleStore for MemoryStore {
    async fn clear_all_ranks(&self) -> Result<()> {
        self.clear_calls.fetch_add(1, Ordering::SeqCst);
        for item in self.records.lock().unwrap().values_mut() {
            item.rank = None;
        }
        Ok(())
    }
    async fn upsert_by_url(&self, item: &ScoredItem) -> Result<()> {
        self.upsert_calls.fetch_add(1, Ordering::SeqCst);
        self.records
            .lock()
            .unwrap()
            .insert(item.item.url.clone(), item.clone());
        Ok(())
    }
}

struct BrokenStore;

#[async_trait]
impl ArticleStore for BrokenStore {
    async fn clear_all_ranks(&self) -> Result<()> {
        anyhow::bail!("datastore offline")
    }
    async fn upsert_by_url(&self, _item: &ScoredItem) -> Result<()> {
        anyhow::bail!("datastore offline")
    }
}

fn item(i: usize) -> RawItem {
    RawItem::new("devto", &format!("Item {i}"), &format!("https://p.test/{i}"))
}

fn fast_cfg(top_n: usize) -> CurationConfig {
    let mut cfg = CurationConfig::default();
    cfg.scoring.top_n = top_n;
    cfg.scoring.batch_delay_ms = 10;
    cfg.scoring.base_backoff_ms = 10;
    cfg.scoring.max_jitter_ms = 0;
    cfg
}

#[tokio::test(start_paused = true)]
async fn empty_aggregate_short_circuits_scoring_and_persistence() {
    let judge = Arc::new(DescendingJudge {
        calls: AtomicUsize::new(0),
    });
    let store = Arc::new(MemoryStore::default());
    let adapters: Vec<Box<dyn SourceAdapter>> =
        vec![Box::new(FixedAdapter { items: vec![] })];

    let pipeline =
        CurationPipeline::new(adapters, judge.clone(), store.clone(), fast_cfg(12));
    let summary = pipeline.run().await.unwrap();

    assert!(summary.is_empty_run());
    assert_eq!(judge.calls.load(Ordering::SeqCst), 0);
    assert_eq!(store.clear_calls.load(Ordering::SeqCst), 0);
    assert_eq!(store.upsert_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test(start_paused = true)]
async fn full_run_ranks_top_n_and_persists_everything() {
    let judge = Arc::new(DescendingJudge {
        calls: AtomicUsize::new(0),
    });
    let store = Arc::new(MemoryStore::default());
    let adapters: Vec<Box<dyn SourceAdapter>> = vec![Box::new(FixedAdapter {
        items: (0..5).map(item).collect(),
    })];

    let pipeline =
        CurationPipeline::new(adapters, judge, store.clone(), fast_cfg(2));
    let summary = pipeline.run().await.unwrap();

    assert_eq!(summary.total_scraped, 5);
    assert_eq!(summary.total_scored, 5);
    assert_eq!(summary.ranked_count, 2);
    assert_eq!(store.clear_calls.load(Ordering::SeqCst), 1);

    let records = store.records.lock().unwrap();
    assert_eq!(records.len(), 5);
    // Item 0 got the highest score, so it carries rank 1.
    assert_eq!(records["https://p.test/0"].rank, Some(1));
    assert_eq!(records["https://p.test/1"].rank, Some(2));
    assert_eq!(records["https://p.test/2"].rank, None);
}

#[tokio::test(start_paused = true)]
async fn rerun_is_idempotent_per_url() {
    let store = Arc::new(MemoryStore::default());
    for _ in 0..2 {
        let judge = Arc::new(DescendingJudge {
            calls: AtomicUsize::new(0),
        });
        let adapters: Vec<Box<dyn SourceAdapter>> = vec![Box::new(FixedAdapter {
            items: (0..3).map(item).collect(),
        })];
        let pipeline =
            CurationPipeline::new(adapters, judge, store.clone(), fast_cfg(2));
        pipeline.run().await.unwrap();
    }

    assert_eq!(store.records.lock().unwrap().len(), 3);
    assert_eq!(store.upsert_calls.load(Ordering::SeqCst), 6);
}

#[tokio::test(start_paused = true)]
async fn judge_outage_degrades_to_fallback_but_loses_nothing() {
    let store = Arc::new(MemoryStore::default());
    let adapters: Vec<Box<dyn SourceAdapter>> = vec![Box::new(FixedAdapter {
        items: (0..4).map(item).collect(),
    })];

    let pipeline =
        CurationPipeline::new(adapters, Arc::new(FailingJudge), store.clone(), fast_cfg(2));
    let summary = pipeline.run().await.unwrap();

    assert_eq!(summary.total_scraped, 4);
    assert_eq!(summary.total_scored, 4);
    let records = store.records.lock().unwrap();
    assert_eq!(records.len(), 4);
    assert!(records.values().all(|r| r.score == FALLBACK_SCORE));
}

#[tokio::test(start_paused = true)]
async fn persistence_failure_aborts_the_run() {
    let judge = Arc::new(DescendingJudge {
        calls: AtomicUsize::new(0),
    });
    let adapters: Vec<Box<dyn SourceAdapter>> = vec![Box::new(FixedAdapter {
        items: vec![item(0)],
    })];

    let pipeline =
        CurationPipeline::new(adapters, judge, Arc::new(BrokenStore), fast_cfg(2));
    let err = pipeline.run().await.unwrap_err();
    assert!(err.to_string().contains("clearing previous ranks"));
}
