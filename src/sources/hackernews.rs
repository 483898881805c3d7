// src/sources/hackernews.rs
//! Hacker News front-page adapter, via the Algolia HN search API. Keeps only
//! stories whose title matches the relevance keyword list.

use std::time::Duration;

use serde::Deserialize;

use crate::error::AdapterError;
use crate::sources::{KeywordFilter, SourceAdapter, API_USER_AGENT};
use crate::types::RawItem;

const FRONT_PAGE_URL: &str = "https://hn.algolia.com/api/v1/search?tags=front_page&hitsPerPage=30";
const ITEM_URL_PREFIX: &str = "https://news.ycombinator.com/item?id=";

#[derive(Debug, Deserialize)]
struct SearchResponse {
    hits: Vec<Hit>,
}

#[derive(Debug, Deserialize)]
struct Hit {
    title: Option<String>,
    url: Option<String>,
    #[serde(rename = "objectID")]
    object_id: String,
    points: Option<u32>,
    num_comments: Option<u32>,
}

pub struct HackerNewsAdapter {
    client: reqwest::Client,
    filter: KeywordFilter,
}

impl HackerNewsAdapter {
    pub fn new(filter: KeywordFilter, request_timeout_secs: u64) -> Self {
        let client = reqwest::Client::builder()
            .user_agent(API_USER_AGENT)
            .timeout(Duration::from_secs(request_timeout_secs))
            .build()
            .expect("reqwest client");
        Self { client, filter }
    }

    fn map_hits(hits: Vec<Hit>, filter: &KeywordFilter) -> Vec<RawItem> {
        let mut out = Vec::new();
        for hit in hits {
            let Some(title) = hit.title.filter(|t| !t.trim().is_empty()) else {
                continue;
            };
            if !filter.matches(&[&title]) {
                continue;
            }
            // Ask HN / text posts carry no external URL; link the thread.
            let url = hit
                .url
                .filter(|u| u.starts_with("http"))
                .unwrap_or_else(|| format!("{ITEM_URL_PREFIX}{}", hit.object_id));
            // HN stories carry no summary; the description stays empty
            // rather than repeating the title into the scoring prompt.
            out.push(RawItem {
                upvotes: hit.points,
                comment_count: hit.num_comments,
                ..RawItem::new("hackernews", &title, &url)
            });
        }
        out
    }
}

#[async_trait::async_trait]
impl SourceAdapter for HackerNewsAdapter {
    async fn fetch(&self) -> Result<Vec<RawItem>, AdapterError> {
        let resp = self.client.get(FRONT_PAGE_URL).send().await?;
        if !resp.status().is_success() {
            return Err(AdapterError::Payload(format!(
                "front page returned status {}",
                resp.status().as_u16()
            )));
        }
        let body: SearchResponse = resp.json().await?;
        Ok(Self::map_hits(body.hits, &self.filter))
    }

    fn name(&self) -> &'static str {
        "hackernews"
    }
}
