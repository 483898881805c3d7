// src/error.rs
//! Error taxonomy. Adapter and scoring errors are non-fatal tiers that the
//! orchestrator degrades (empty result / fallback scores); persistence
//! errors stay on `anyhow` and abort the run.

use thiserror::Error;

/// Failure inside one source adapter. Never propagated past the aggregator:
/// the contract is fail-open, one broken feed must not block the run.
#[derive(Debug, Error)]
pub enum AdapterError {
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("feed parse failed: {0}")]
    Feed(String),
    #[error("unexpected payload: {0}")]
    Payload(String),
}

/// Failure of a single judge call attempt. Retried with backoff; exhaustion
/// degrades the batch to fallback scores instead of propagating.
#[derive(Debug, Error)]
pub enum ScoreError {
    #[error("judge request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("judge returned status {0}")]
    Status(u16),
    #[error("judge response unusable: {0}")]
    Parse(String),
    #[error("scoring judge not configured: {0} is unset")]
    NotConfigured(&'static str),
}
