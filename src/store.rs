// src/store.rs
//! Persistence boundary. The pipeline only needs two operations: clear all
//! stale ranks, then upsert by URL. `JsonFileStore` is the shipped
//! implementation: one URL-keyed JSON document with a metadata block,
//! written atomically.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::ScoredItem;

/// Persistence collaborator contract. Errors here are fatal to the run,
/// unlike scoring failures.
#[async_trait::async_trait]
pub trait ArticleStore: Send + Sync {
    /// Unset the rank on every previously-ranked record. Run once per
    /// pipeline invocation before new ranks are written, so stale ranks
    /// from the previous run never leak into "latest" queries.
    async fn clear_all_ranks(&self) -> Result<()>;

    /// Insert-or-update keyed by `url`. Idempotent: re-running with
    /// identical input leaves exactly one record per URL.
    async fn upsert_by_url(&self, item: &ScoredItem) -> Result<()>;
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct StoreMetadata {
    generated_at: Option<DateTime<Utc>>,
    total_items: usize,
    ranked_count: usize,
    /// Item counts per source identifier.
    sources: BTreeMap<String, usize>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct StoreDoc {
    metadata: StoreMetadata,
    /// Keyed by URL; the map itself enforces upsert semantics.
    items: BTreeMap<String, ScoredItem>,
}

pub struct JsonFileStore {
    path: PathBuf,
    doc: Mutex<StoreDoc>,
}

impl JsonFileStore {
    /// Open (or create) the store document at `path`.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let doc = if path.exists() {
            let raw = fs::read_to_string(&path)
                .with_context(|| format!("reading store file {}", path.display()))?;
            serde_json::from_str(&raw)
                .with_context(|| format!("parsing store file {}", path.display()))?
        } else {
            StoreDoc::default()
        };
        Ok(Self {
            path,
            doc: Mutex::new(doc),
        })
    }

    pub fn len(&self) -> usize {
        self.doc.lock().expect("store lock").items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, url: &str) -> Option<ScoredItem> {
        self.doc.lock().expect("store lock").items.get(url).cloned()
    }

    fn flush(doc: &mut StoreDoc, path: &Path) -> Result<()> {
        doc.metadata.generated_at = Some(Utc::now());
        doc.metadata.total_items = doc.items.len();
        doc.metadata.ranked_count = doc.items.values().filter(|i| i.rank.is_some()).count();
        doc.metadata.sources.clear();
        for item in doc.items.values() {
            *doc.metadata.sources.entry(item.item.source.clone()).or_insert(0) += 1;
        }

        let json = serde_json::to_string_pretty(&doc).context("serializing store document")?;
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, json).with_context(|| format!("writing {}", tmp.display()))?;
        fs::rename(&tmp, path)
            .with_context(|| format!("replacing store file {}", path.display()))?;
        Ok(())
    }
}

#[async_trait::async_trait]
impl ArticleStore for JsonFileStore {
    async fn clear_all_ranks(&self) -> Result<()> {
        let mut doc = self.doc.lock().expect("store lock");
        for item in doc.items.values_mut() {
            item.rank = None;
        }
        Self::flush(&mut doc, &self.path)
    }

    async fn upsert_by_url(&self, item: &ScoredItem) -> Result<()> {
        let mut doc = self.doc.lock().expect("store lock");
        doc.items.insert(item.item.url.clone(), item.clone());
        Self::flush(&mut doc, &self.path)
    }
}
