// src/score/mod.rs
//! Batch scoring client: chunks the unified item list, calls the judge one
//! batch at a time with bounded retry + exponential backoff, and degrades
//! exhausted batches to neutral fallback scores so no item is ever lost to
//! a provider outage.

pub mod parse;
pub mod prompt;
pub mod provider;

use std::sync::Arc;
use std::time::Duration;

use metrics::{counter, histogram};
use rand::Rng;

use crate::config::ScoringConfig;
use crate::types::{RawItem, ScoredItem};
use provider::ScoreProvider;

/// Neutral score assigned when every retry attempt fails.
pub const FALLBACK_SCORE: u8 = 5;
/// Sentinel reasoning marking fallback-scored items.
pub const FALLBACK_REASONING: &str = "Failed to score - using default";
pub const DEFAULT_ESTIMATED_TIME: u32 = 10;

pub struct ScoringClient {
    provider: Arc<dyn ScoreProvider>,
    cfg: ScoringConfig,
}

impl ScoringClient {
    pub fn new(provider: Arc<dyn ScoreProvider>, cfg: ScoringConfig) -> Self {
        Self { provider, cfg }
    }

    /// Score the whole list. Batches are strictly sequential to respect the
    /// provider quota, with a courtesy delay between them. Never fails:
    /// exhausted batches come back fallback-scored.
    pub async fn score_all(&self, items: &[RawItem]) -> Vec<ScoredItem> {
        let batches: Vec<&[RawItem]> = items.chunks(self.cfg.batch_size.max(1)).collect();
        let mut out = Vec::with_capacity(items.len());

        for (i, batch) in batches.iter().enumerate() {
            tracing::info!(
                batch = i + 1,
                batches = batches.len(),
                size = batch.len(),
                "scoring batch"
            );
            out.extend(self.score_batch(batch).await);

            if i + 1 < batches.len() {
                tokio::time::sleep(Duration::from_millis(self.cfg.batch_delay_ms)).await;
            }
        }
        out
    }

    /// One batch through the retry loop. An explicit bounded loop, so the
    /// attempt count is trivially testable and the stack stays flat.
    async fn score_batch(&self, batch: &[RawItem]) -> Vec<ScoredItem> {
        let prompt = prompt::build_prompt(batch);
        let max_attempts = self.cfg.retry_attempts.max(1);
        let mut attempt = 1u32;

        loop {
            let t0 = std::time::Instant::now();
            match self.attempt(&prompt, batch).await {
                Ok(scored) => {
                    histogram!("curate_score_batch_ms")
                        .record(t0.elapsed().as_secs_f64() * 1_000.0);
                    counter!("curate_items_scored_total").increment(scored.len() as u64);
                    return scored;
                }
                Err(e) if attempt >= max_attempts => {
                    tracing::warn!(
                        attempts = attempt,
                        error = %e,
                        size = batch.len(),
                        "scoring attempts exhausted, applying fallback scores"
                    );
                    counter!("curate_score_fallback_batches_total").increment(1);
                    return fallback_batch(batch);
                }
                Err(e) => {
                    let delay = backoff_delay(
                        self.cfg.base_backoff_ms,
                        attempt,
                        self.cfg.max_jitter_ms,
                    );
                    tracing::warn!(
                        attempt,
                        error = %e,
                        delay_ms = delay.as_millis() as u64,
                        "judge call failed, backing off"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
            }
        }
    }

    async fn attempt(
        &self,
        prompt: &str,
        batch: &[RawItem],
    ) -> Result<Vec<ScoredItem>, crate::error::ScoreError> {
        let body = self.provider.generate(prompt).await?;
        parse::parse_batch_response(&body, batch)
    }
}

/// `base * 2^(attempt-1)` plus uniform jitter, saturating on overflow.
pub fn backoff_delay(base_ms: u64, attempt: u32, max_jitter_ms: u64) -> Duration {
    let shift = (attempt.saturating_sub(1)).min(16);
    let exp = base_ms.saturating_mul(1u64 << shift);
    let jitter = if max_jitter_ms == 0 {
        0
    } else {
        rand::rng().random_range(0..max_jitter_ms)
    };
    Duration::from_millis(exp.saturating_add(jitter))
}

/// Neutral scores for every item of a batch the judge never answered for.
/// Guarantees output length equals batch length.
pub fn fallback_batch(batch: &[RawItem]) -> Vec<ScoredItem> {
    batch
        .iter()
        .map(|item| ScoredItem {
            item: item.clone(),
            score: FALLBACK_SCORE,
            reasoning: FALLBACK_REASONING.to_string(),
            category: Default::default(),
            difficulty: Default::default(),
            key_insights: Vec::new(),
            estimated_time: Some(item.duration_minutes.unwrap_or(DEFAULT_ESTIMATED_TIME)),
            rank: None,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Category, Difficulty, RawItem};

    #[test]
    fn backoff_grows_exponentially_within_jitter_bounds() {
        for attempt in 1..=3u32 {
            let base = 2000u64;
            let d = backoff_delay(base, attempt, 1000);
            let floor = base * 2u64.pow(attempt - 1);
            assert!(d.as_millis() as u64 >= floor);
            assert!((d.as_millis() as u64) < floor + 1000);
        }
    }

    #[test]
    fn backoff_saturates_instead_of_overflowing() {
        let d = backoff_delay(u64::MAX / 2, 12, 0);
        assert_eq!(d, Duration::from_millis(u64::MAX));
    }

    #[test]
    fn fallback_never_drops_items() {
        let batch: Vec<RawItem> = (0..7)
            .map(|i| RawItem::new("devto", "t", &format!("https://f.test/{i}")))
            .collect();
        let out = fallback_batch(&batch);
        assert_eq!(out.len(), batch.len());
        for s in &out {
            assert_eq!(s.score, FALLBACK_SCORE);
            assert_eq!(s.reasoning, FALLBACK_REASONING);
            assert_eq!(s.category, Category::SystemDesign);
            assert_eq!(s.difficulty, Difficulty::Intermediate);
            assert!(s.key_insights.is_empty());
            assert_eq!(s.rank, None);
        }
    }
}
