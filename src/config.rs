// src/config.rs
//! Pipeline configuration: compiled-in defaults, optional TOML file, and a
//! handful of env overrides so the hot knobs can change without redeploys.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_PATH: &str = "config/curation.toml";
pub const ENV_CONFIG_PATH: &str = "CURATION_CONFIG_PATH";
pub const ENV_BATCH_SIZE: &str = "SCORING_BATCH_SIZE";
pub const ENV_BATCH_DELAY_MS: &str = "SCORING_BATCH_DELAY_MS";
pub const ENV_TOP_N: &str = "SCORING_TOP_N";

/// Knobs for the batch scoring client.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    pub batch_size: usize,
    pub retry_attempts: u32,
    pub base_backoff_ms: u64,
    pub max_jitter_ms: u64,
    pub batch_delay_ms: u64,
    pub top_n: usize,
    pub model: String,
    pub temperature: f32,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            batch_size: 20,
            retry_attempts: 3,
            base_backoff_ms: 2000,
            max_jitter_ms: 1000,
            batch_delay_ms: 15_000,
            top_n: 12,
            model: "gemini-2.5-flash".to_string(),
            temperature: 0.7,
        }
    }
}

/// One RSS feed the blog adapter polls.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct FeedConfig {
    pub name: String,
    pub url: String,
    /// Short identifier stored on items from this feed.
    pub source: String,
}

/// One YouTube channel the video adapter searches.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct ChannelConfig {
    /// Suffix for the item source label (`youtube-<name>`).
    pub name: String,
    pub channel_id: String,
    /// Optional search query; broad channels need one, focused ones don't.
    #[serde(default)]
    pub query: Option<String>,
    #[serde(default = "default_channel_max_results")]
    pub max_results: u32,
    /// YouTube search ordering: `relevance` or `date`.
    #[serde(default = "default_channel_order")]
    pub order: String,
}

fn default_channel_max_results() -> u32 {
    10
}

fn default_channel_order() -> String {
    "relevance".to_string()
}

/// Knobs shared by the source adapters.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SourcesConfig {
    /// Topical relevance keywords, matched case-insensitively as substrings.
    pub keywords: Vec<String>,
    pub feeds: Vec<FeedConfig>,
    pub channels: Vec<ChannelConfig>,
    /// Items taken per RSS feed.
    pub feed_item_cap: usize,
    pub description_max_chars: usize,
    pub request_timeout_secs: u64,
    /// Social-discussion items at or below this upvote count are dropped.
    pub min_social_upvotes: u32,
    /// Guide items scoring below this heuristic threshold are discarded.
    pub quality_threshold: i32,
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            keywords: default_keywords(),
            feeds: default_feeds(),
            channels: default_channels(),
            feed_item_cap: 5,
            description_max_chars: 300,
            request_timeout_secs: 10,
            min_social_upvotes: 100,
            quality_threshold: 1,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CurationConfig {
    pub scoring: ScoringConfig,
    pub sources: SourcesConfig,
}

impl CurationConfig {
    /// Load from an explicit TOML path.
    pub fn from_path(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading curation config from {}", path.display()))?;
        let mut cfg: CurationConfig = toml::from_str(&content)
            .with_context(|| format!("parsing curation config {}", path.display()))?;
        cfg.apply_env_overrides();
        Ok(cfg)
    }

    /// Load using env var + fallback:
    /// 1) $CURATION_CONFIG_PATH (must exist if set)
    /// 2) config/curation.toml if present
    /// 3) compiled-in defaults
    pub fn load_default() -> Result<Self> {
        if let Ok(p) = std::env::var(ENV_CONFIG_PATH) {
            let pb = PathBuf::from(p);
            anyhow::ensure!(
                pb.exists(),
                "{ENV_CONFIG_PATH} points to non-existent path {}",
                pb.display()
            );
            return Self::from_path(&pb);
        }
        let default_p = PathBuf::from(DEFAULT_CONFIG_PATH);
        if default_p.exists() {
            return Self::from_path(&default_p);
        }
        let mut cfg = Self::default();
        cfg.apply_env_overrides();
        Ok(cfg)
    }

    /// Env vars win over file values for the hot scoring knobs.
    fn apply_env_overrides(&mut self) {
        if let Some(v) = parse_env(ENV_BATCH_SIZE) {
            self.scoring.batch_size = v;
        }
        if let Some(v) = parse_env(ENV_BATCH_DELAY_MS) {
            self.scoring.batch_delay_ms = v;
        }
        if let Some(v) = parse_env(ENV_TOP_N) {
            self.scoring.top_n = v;
        }
    }
}

fn parse_env<T: std::str::FromStr>(name: &str) -> Option<T> {
    std::env::var(name).ok().and_then(|s| s.trim().parse().ok())
}

/// Newsletter-niche relevance keywords used by the HN / dev.to / reddit
/// adapters. Overridable via `[sources] keywords` in the config file.
fn default_keywords() -> Vec<String> {
    [
        "redis",
        "kafka",
        "kubernetes",
        "docker",
        "microservices",
        "system design",
        "scalability",
        "distributed systems",
        "load balancing",
        "caching",
        "database optimization",
        "devops",
        "ci/cd",
        "architecture",
        "performance",
        "aws",
        "azure",
        "gcp",
        "cloud",
        "infrastructure",
        "monitoring",
        "postgresql",
        "mongodb",
        "nginx",
        "rabbitmq",
        "elasticsearch",
        "graphql",
        "api design",
    ]
    .into_iter()
    .map(str::to_string)
    .collect()
}

fn default_feeds() -> Vec<FeedConfig> {
    [
        (
            "High Scalability",
            "http://feeds.feedburner.com/HighScalability",
            "highscalability",
        ),
        (
            "The Pragmatic Engineer",
            "https://blog.pragmaticengineer.com/rss/",
            "pragmatic",
        ),
        (
            "Cloudflare Blog",
            "https://blog.cloudflare.com/rss/",
            "cloudflare",
        ),
        (
            "AWS Compute Blog",
            "https://aws.amazon.com/blogs/compute/feed/",
            "aws",
        ),
    ]
    .into_iter()
    .map(|(name, url, source)| FeedConfig {
        name: name.to_string(),
        url: url.to_string(),
        source: source.to_string(),
    })
    .collect()
}

fn default_channels() -> Vec<ChannelConfig> {
    vec![
        ChannelConfig {
            name: "freeCodeCamp".to_string(),
            channel_id: "UC8butISFwT-Wl7EV0hUK0BQ".to_string(),
            query: Some("system design".to_string()),
            max_results: 10,
            order: "relevance".to_string(),
        },
        ChannelConfig {
            name: "ByteByteGo".to_string(),
            channel_id: "UCZgt6AzoyjslHTC9dz0UoTw".to_string(),
            query: None,
            max_results: 10,
            order: "date".to_string(),
        },
        ChannelConfig {
            name: "GauravSen".to_string(),
            channel_id: "UCRPMAqdtSgd0Ipeef7iFsKw".to_string(),
            query: Some("system design".to_string()),
            max_results: 8,
            order: "relevance".to_string(),
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;

    #[test]
    fn defaults_are_sane() {
        let cfg = CurationConfig::default();
        assert_eq!(cfg.scoring.batch_size, 20);
        assert_eq!(cfg.scoring.retry_attempts, 3);
        assert_eq!(cfg.scoring.top_n, 12);
        assert_eq!(cfg.sources.feed_item_cap, 5);
        assert!(!cfg.sources.keywords.is_empty());
        assert_eq!(cfg.sources.feeds.len(), 4);
        assert_eq!(cfg.sources.channels.len(), 3);
    }

    #[test]
    fn channel_entries_fill_in_query_and_order_defaults() {
        let toml_src = r#"
            [[sources.channels]]
            name = "SomeChannel"
            channel_id = "UCabc123"
        "#;
        let cfg: CurationConfig = toml::from_str(toml_src).unwrap();
        assert_eq!(cfg.sources.channels.len(), 1);
        let ch = &cfg.sources.channels[0];
        assert_eq!(ch.query, None);
        assert_eq!(ch.max_results, 10);
        assert_eq!(ch.order, "relevance");
    }

    #[test]
    fn partial_toml_fills_in_defaults() {
        let toml_src = r#"
            [scoring]
            batch_size = 15
            top_n = 5

            [sources]
            keywords = ["redis"]
        "#;
        let cfg: CurationConfig = toml::from_str(toml_src).unwrap();
        assert_eq!(cfg.scoring.batch_size, 15);
        assert_eq!(cfg.scoring.top_n, 5);
        // Untouched knobs keep their defaults.
        assert_eq!(cfg.scoring.retry_attempts, 3);
        assert_eq!(cfg.sources.keywords, vec!["redis".to_string()]);
        assert_eq!(cfg.sources.min_social_upvotes, 100);
    }

    #[serial_test::serial]
    #[test]
    fn env_overrides_win() {
        env::set_var(ENV_BATCH_SIZE, "7");
        env::set_var(ENV_BATCH_DELAY_MS, "250");
        env::remove_var(ENV_TOP_N);

        let mut cfg = CurationConfig::default();
        cfg.apply_env_overrides();
        assert_eq!(cfg.scoring.batch_size, 7);
        assert_eq!(cfg.scoring.batch_delay_ms, 250);
        assert_eq!(cfg.scoring.top_n, 12);

        env::remove_var(ENV_BATCH_SIZE);
        env::remove_var(ENV_BATCH_DELAY_MS);
    }

    #[serial_test::serial]
    #[test]
    fn garbage_env_is_ignored() {
        env::set_var(ENV_BATCH_SIZE, "not-a-number");
        let mut cfg = CurationConfig::default();
        cfg.apply_env_overrides();
        assert_eq!(cfg.scoring.batch_size, 20);
        env::remove_var(ENV_BATCH_SIZE);
    }
}
