// src/types.rs
//! Core data model for the curation pipeline: the normalized unscored item,
//! the judge-augmented scored item, and the run summary handed back to the
//! trigger collaborator.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Inclusive scoring range the judge is instructed to use.
pub const SCORE_MIN: u8 = 1;
pub const SCORE_MAX: u8 = 10;

/// A normalized, unscored content item. Produced by exactly one source
/// adapter per run, immutable afterwards; `url` is the natural key for
/// persistence.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RawItem {
    pub title: String,
    pub url: String,
    #[serde(default)]
    pub description: String,
    pub source: String,
    pub scraped_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upvotes: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment_count: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_minutes: Option<u32>,
    #[serde(default)]
    pub has_visuals: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
}

impl RawItem {
    /// Bare item with the required fields; source-specific extras are filled
    /// in by the adapter via struct update.
    pub fn new(source: &str, title: &str, url: &str) -> Self {
        Self {
            title: title.to_string(),
            url: url.to_string(),
            description: String::new(),
            source: source.to_string(),
            scraped_at: Utc::now(),
            tags: Vec::new(),
            upvotes: None,
            comment_count: None,
            duration_minutes: None,
            has_visuals: false,
            thumbnail: None,
        }
    }
}

/// Closed category enumeration the judge must pick from. Anything outside
/// the list coerces to the default instead of being trusted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Category {
    #[default]
    #[serde(rename = "System Design")]
    SystemDesign,
    DevOps,
    Scalability,
    #[serde(rename = "Cloud Architecture")]
    CloudArchitecture,
    Observability,
    Performance,
    Security,
    Database,
}

impl Category {
    pub const ALL: [Category; 8] = [
        Category::SystemDesign,
        Category::DevOps,
        Category::Scalability,
        Category::CloudArchitecture,
        Category::Observability,
        Category::Performance,
        Category::Security,
        Category::Database,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::SystemDesign => "System Design",
            Category::DevOps => "DevOps",
            Category::Scalability => "Scalability",
            Category::CloudArchitecture => "Cloud Architecture",
            Category::Observability => "Observability",
            Category::Performance => "Performance",
            Category::Security => "Security",
            Category::Database => "Database",
        }
    }

    /// Parse judge output, coercing unknown labels to the default.
    pub fn from_judge(s: &str) -> Self {
        let t = s.trim();
        Category::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(t))
            .unwrap_or_default()
    }
}

/// Judge-assigned difficulty; unknown labels coerce to the default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Difficulty {
    Beginner,
    #[default]
    Intermediate,
    Advanced,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [
        Difficulty::Beginner,
        Difficulty::Intermediate,
        Difficulty::Advanced,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Beginner => "Beginner",
            Difficulty::Intermediate => "Intermediate",
            Difficulty::Advanced => "Advanced",
        }
    }

    pub fn from_judge(s: &str) -> Self {
        let t = s.trim();
        Difficulty::ALL
            .into_iter()
            .find(|d| d.as_str().eq_ignore_ascii_case(t))
            .unwrap_or_default()
    }
}

/// A `RawItem` augmented with the judge's verdict. `rank` is assigned only
/// to the featured top-N subset, dense 1..N per run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScoredItem {
    #[serde(flatten)]
    pub item: RawItem,
    pub score: u8,
    pub reasoning: String,
    pub category: Category,
    pub difficulty: Difficulty,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub key_insights: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_time: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rank: Option<u32>,
}

/// Structured outcome of one pipeline run, returned to the trigger
/// collaborator instead of throwing for expected degenerate cases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    pub total_scraped: usize,
    pub total_scored: usize,
    pub ranked_count: usize,
}

impl RunSummary {
    /// The explicit "nothing to do" result for a run with no scraped items.
    pub fn empty() -> Self {
        Self {
            total_scraped: 0,
            total_scored: 0,
            ranked_count: 0,
        }
    }

    pub fn is_empty_run(&self) -> bool {
        self.total_scraped == 0
    }
}
