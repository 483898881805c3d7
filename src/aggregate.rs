// src/aggregate.rs
//! Fan-out/fan-in over all source adapters. Adapters run concurrently and
//! fail open: an adapter error degrades to zero items from that source and
//! the run continues with whatever the rest produced.

use metrics::counter;

use crate::sources::SourceAdapter;
use crate::types::RawItem;

/// Run every adapter concurrently, wait for all to settle, and concatenate
/// the results. Social-discussion items at or below `min_social_upvotes`
/// are dropped here, before scoring. Never fails; an empty result is a
/// valid outcome the caller must check for.
pub async fn run_all(
    adapters: &[Box<dyn SourceAdapter>],
    min_social_upvotes: u32,
) -> Vec<RawItem> {
    let results = futures::future::join_all(adapters.iter().map(|a| a.fetch())).await;

    let mut items = Vec::new();
    for (adapter, result) in adapters.iter().zip(results) {
        match result {
            Ok(fetched) => {
                tracing::info!(adapter = adapter.name(), count = fetched.len(), "adapter ok");
                counter!("curate_items_scraped_total").increment(fetched.len() as u64);
                items.extend(
                    fetched
                        .into_iter()
                        .filter(|it| keeps_engagement_floor(it, min_social_upvotes)),
                );
            }
            Err(e) => {
                tracing::warn!(adapter = adapter.name(), error = %e, "adapter failed, skipping");
                counter!("curate_adapter_errors_total").increment(1);
            }
        }
    }
    items
}

/// Discussion posts need a minimum engagement to be worth the judge's time.
fn keeps_engagement_floor(item: &RawItem, min_social_upvotes: u32) -> bool {
    if item.source != "reddit" {
        return true;
    }
    item.upvotes.unwrap_or(0) > min_social_upvotes
}
