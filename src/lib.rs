// src/lib.rs
// Public library surface for integration tests (and potential reuse).

pub mod aggregate;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod rank;
pub mod score;
pub mod sources;
pub mod store;
pub mod types;

// ---- Re-exports for stable public API ----
pub use crate::config::CurationConfig;
pub use crate::pipeline::CurationPipeline;
pub use crate::store::{ArticleStore, JsonFileStore};
pub use crate::types::{RawItem, RunSummary, ScoredItem};
