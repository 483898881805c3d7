// src/sources/guides.rs
//! Repository-derived guide adapter: walks the system-design-primer README
//! and turns its sections into guide items. Unlike the feed adapters this
//! source is huge and noisy, so items pass a deterministic heuristic quality
//! score before they ever reach the judge.

use std::time::Duration;

use once_cell::sync::OnceCell;
use regex::Regex;

use crate::error::AdapterError;
use crate::sources::{SourceAdapter, API_USER_AGENT};
use crate::types::RawItem;

const PRIMER_README_URL: &str =
    "https://raw.githubusercontent.com/donnemartin/system-design-primer/master/README.md";
const PRIMER_REPO_URL: &str = "https://github.com/donnemartin/system-design-primer";
const CONTENT_MARKER: &str = "system design topics: start here";
const MIN_DESCRIPTION_LEN: usize = 30;

const HIGH_VALUE_KEYWORDS: &[&str] = &[
    "architecture",
    "design pattern",
    "scalability",
    "microservices",
    "distributed systems",
    "load balanc",
    "database",
    "caching",
    "message queue",
    "api gateway",
    "consistency",
    "availability",
    "partitioning",
    "replication",
    "sharding",
    "cap theorem",
    "horizontal scaling",
    "vertical scaling",
    "rate limiting",
    "circuit breaker",
    "cdn",
    "reverse proxy",
    "idempotency",
];

const MEDIUM_VALUE_KEYWORDS: &[&str] = &[
    "rest api",
    "graphql",
    "grpc",
    "websocket",
    "kafka",
    "rabbitmq",
    "redis",
    "mongodb",
    "postgresql",
    "cassandra",
    "elasticsearch",
    "kubernetes",
    "docker",
    "nginx",
    "http",
    "tcp",
    "dns",
    "oauth",
    "jwt",
    "ssl/tls",
    "aws",
    "azure",
    "gcp",
];

const GENERIC_TERMS: &[&str] = &["introduction", "basics", "overview", "beginner", "tutorial"];

const COMPANY_MENTIONS: &[&str] = &[
    "netflix", "uber", "airbnb", "twitter", "facebook", "amazon", "google", "stripe",
];

/// (topic label, keywords that map to it)
const TOPIC_TABLE: &[(&str, &[&str])] = &[
    ("Performance", &["performance", "latency", "throughput", "optimization", "speed"]),
    ("Scalability", &["scalability", "scale", "scaling", "horizontal", "vertical"]),
    ("Caching", &["cache", "caching", "redis", "memcached", "cdn"]),
    ("Database", &["database", "sql", "nosql", "rdbms", "postgres", "mysql", "mongodb", "cassandra", "dynamodb"]),
    ("Load Balancing", &["load balanc", "balancer", "nginx", "haproxy"]),
    ("API", &["api", "rest", "graphql", "grpc", "webhook", "websocket", "gateway"]),
    ("Security", &["security", "https", "encryption", "authentication", "ssl", "tls", "oauth"]),
    ("Architecture", &["architecture", "design pattern", "microservice", "monolith", "mvc"]),
    ("DevOps", &["devops", "ci/cd", "docker", "kubernetes", "deployment", "container", "sre"]),
    ("Networking", &["network", "tcp", "udp", "dns", "http", "protocol", "proxy"]),
    ("Distributed Systems", &["distributed", "cap theorem", "consistency", "partition", "availability", "consensus"]),
    ("Message Queue", &["queue", "message", "async", "kafka", "rabbitmq", "pubsub"]),
    ("Monitoring", &["monitor", "observability", "logging", "metrics", "tracing"]),
    ("Storage", &["storage", "blob", "s3", "object storage", "file system", "b-tree", "lsm"]),
    ("Cloud", &["aws", "azure", "gcp", "cloud"]),
];

/// Deterministic pre-filter score over a guide title. Pure: same title,
/// same integer, no I/O.
///
/// Weights: +3 high-value keyword, +2 medium-value keyword, +2 "X vs Y"
/// comparison, +1 "how to", -2 title < 15 chars, -1 title > 80 chars,
/// -3 generic term, +1 known company mention.
pub fn quality_score(title: &str) -> i32 {
    let lower = title.to_lowercase();
    let mut score = 0;

    if HIGH_VALUE_KEYWORDS.iter().any(|kw| lower.contains(kw)) {
        score += 3;
    }
    if MEDIUM_VALUE_KEYWORDS.iter().any(|kw| lower.contains(kw)) {
        score += 2;
    }

    static RE_VS: OnceCell<Regex> = OnceCell::new();
    let re_vs = RE_VS.get_or_init(|| Regex::new(r"(?i)\svs\.?\s|\sversus\s").unwrap());
    if re_vs.is_match(title) {
        score += 2;
    }

    static RE_HOW: OnceCell<Regex> = OnceCell::new();
    let re_how = RE_HOW.get_or_init(|| Regex::new(r"(?i)^how\s|how\sto\s").unwrap());
    if re_how.is_match(title) {
        score += 1;
    }

    let len = title.chars().count();
    if len < 15 {
        score -= 2;
    }
    if len > 80 {
        score -= 1;
    }

    if GENERIC_TERMS.iter().any(|t| lower.contains(t)) {
        score -= 3;
    }
    if COMPANY_MENTIONS.iter().any(|c| lower.contains(c)) {
        score += 1;
    }

    score
}

/// Map a title to at most three topic labels via the keyword table;
/// defaults to "System Design" when nothing matches.
pub fn extract_topics(title: &str) -> Vec<String> {
    let lower = title.to_lowercase();
    let topics: Vec<String> = TOPIC_TABLE
        .iter()
        .filter(|(_, kws)| kws.iter().any(|kw| lower.contains(kw)))
        .map(|(topic, _)| topic.to_string())
        .take(3)
        .collect();
    if topics.is_empty() {
        vec!["System Design".to_string()]
    } else {
        topics
    }
}

/// Reject link-noise titles ("click here", bare figure captions, single
/// words) that a README walk inevitably picks up.
pub fn is_signal_title(title: &str) -> bool {
    let lower = title.to_lowercase();

    const CORE_KEYWORDS: &[&str] = &[
        "api", "system", "design", "architecture", "database", "server", "network", "protocol",
        "cloud", "scale", "cache", "load", "security", "distributed", "microservice", "queue",
        "storage", "http", "tcp", "dns", "kubernetes", "docker", "monitoring", "deployment",
        "authentication", "authorization", "encryption",
    ];
    if !CORE_KEYWORDS.iter().any(|kw| lower.contains(kw)) {
        return false;
    }

    static RE_NOISE: OnceCell<Regex> = OnceCell::new();
    let re_noise = RE_NOISE.get_or_init(|| {
        Regex::new(
            r"(?i)^(image|diagram|figure\s*\d+|chart|table|click here|learn more|read more|see more|subscribe|follow|star|fork|bookmark|newsletter|license|copyright|back to|table of contents|toc)$",
        )
        .unwrap()
    });
    if re_noise.is_match(lower.trim()) {
        return false;
    }
    if title.split_whitespace().count() < 2 {
        return false;
    }
    true
}

fn slugify(title: &str) -> String {
    title
        .to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == ' ' || *c == '-')
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("-")
}

struct Section {
    title: String,
    description: String,
    diagram_count: usize,
}

impl Section {
    fn into_item(self, threshold: i32) -> Option<RawItem> {
        if self.description.is_empty() {
            return None;
        }
        if !is_signal_title(&self.title) || quality_score(&self.title) < threshold {
            return None;
        }
        let url = format!("{PRIMER_REPO_URL}#{}", slugify(&self.title));
        Some(RawItem {
            description: self.description,
            tags: extract_topics(&self.title),
            has_visuals: self.diagram_count > 0,
            ..RawItem::new("github-system-design-primer", &self.title, &url)
        })
    }
}

/// Walk the README: `##` headings open a section, the first long prose line
/// becomes the description, image links count as diagrams.
pub fn parse_primer_markdown(markdown: &str, quality_threshold: i32) -> Vec<RawItem> {
    static RE_HEADING: OnceCell<Regex> = OnceCell::new();
    let re_heading = RE_HEADING.get_or_init(|| Regex::new(r"^##\s+([^#\[].+)$").unwrap());

    let mut items = Vec::new();
    let mut current: Option<Section> = None;
    let mut in_content = false;

    for line in markdown.lines() {
        let line = line.trim();

        if !in_content {
            if line.to_lowercase().contains(CONTENT_MARKER) {
                in_content = true;
            }
            continue;
        }

        if let Some(caps) = re_heading.captures(line) {
            if let Some(section) = current.take() {
                items.extend(section.into_item(quality_threshold));
            }
            current = Some(Section {
                title: caps[1].trim().to_string(),
                description: String::new(),
                diagram_count: 0,
            });
            continue;
        }

        let Some(section) = current.as_mut() else {
            continue;
        };
        if line.contains("![") && line.contains("](") {
            section.diagram_count += 1;
        } else if section.description.is_empty()
            && line.len() > MIN_DESCRIPTION_LEN
            && !line.starts_with(['#', '*', '-', '!', '>', '|', '<'])
        {
            section.description = line.to_string();
        }
    }

    if let Some(section) = current.take() {
        items.extend(section.into_item(quality_threshold));
    }

    items
}

pub struct GuideAdapter {
    client: reqwest::Client,
    quality_threshold: i32,
}

impl GuideAdapter {
    pub fn new(quality_threshold: i32, request_timeout_secs: u64) -> Self {
        let client = reqwest::Client::builder()
            .user_agent(API_USER_AGENT)
            .timeout(Duration::from_secs(request_timeout_secs))
            .build()
            .expect("reqwest client");
        Self {
            client,
            quality_threshold,
        }
    }
}

#[async_trait::async_trait]
impl SourceAdapter for GuideAdapter {
    async fn fetch(&self) -> Result<Vec<RawItem>, AdapterError> {
        let resp = self.client.get(PRIMER_README_URL).send().await?;
        if !resp.status().is_success() {
            return Err(AdapterError::Payload(format!(
                "readme fetch returned status {}",
                resp.status().as_u16()
            )));
        }
        let markdown = resp.text().await?;
        Ok(parse_primer_markdown(&markdown, self.quality_threshold))
    }

    fn name(&self) -> &'static str {
        "guides"
    }
}
