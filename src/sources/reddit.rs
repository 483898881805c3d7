// src/sources/reddit.rs
//! r/devops adapter: hot posts via the public JSON listing, filtered on
//! title + selftext. Upvote/comment counts are carried through so the
//! aggregator can apply its engagement floor.

use std::time::Duration;

use serde::Deserialize;

use crate::error::AdapterError;
use crate::sources::{truncate_chars, KeywordFilter, SourceAdapter, API_USER_AGENT};
use crate::types::RawItem;

const HOT_URL: &str = "https://www.reddit.com/r/devops/hot.json?limit=50";
const FALLBACK_DESCRIPTION: &str = "Discussion on r/devops";

#[derive(Debug, Deserialize)]
struct Listing {
    data: ListingData,
}

#[derive(Debug, Deserialize)]
struct ListingData {
    children: Vec<Child>,
}

#[derive(Debug, Deserialize)]
struct Child {
    data: Post,
}

#[derive(Debug, Deserialize)]
struct Post {
    title: String,
    url: String,
    permalink: String,
    #[serde(default)]
    selftext: String,
    #[serde(default)]
    ups: u32,
    #[serde(default)]
    num_comments: u32,
}

pub struct RedditAdapter {
    client: reqwest::Client,
    filter: KeywordFilter,
    description_max_chars: usize,
}

impl RedditAdapter {
    pub fn new(filter: KeywordFilter, request_timeout_secs: u64, description_max_chars: usize) -> Self {
        let client = reqwest::Client::builder()
            .user_agent(API_USER_AGENT)
            .timeout(Duration::from_secs(request_timeout_secs))
            .build()
            .expect("reqwest client");
        Self {
            client,
            filter,
            description_max_chars,
        }
    }

    fn map_posts(posts: Vec<Post>, filter: &KeywordFilter, desc_cap: usize) -> Vec<RawItem> {
        let mut out = Vec::new();
        for post in posts {
            if !filter.matches(&[&post.title, &post.selftext]) {
                continue;
            }
            let url = if post.url.starts_with("http") {
                post.url.clone()
            } else {
                format!("https://reddit.com{}", post.permalink)
            };
            let description = if post.selftext.trim().is_empty() {
                FALLBACK_DESCRIPTION.to_string()
            } else {
                truncate_chars(post.selftext.trim(), desc_cap)
            };
            out.push(RawItem {
                description,
                upvotes: Some(post.ups),
                comment_count: Some(post.num_comments),
                ..RawItem::new("reddit", &post.title, &url)
            });
        }
        out
    }
}

#[async_trait::async_trait]
impl SourceAdapter for RedditAdapter {
    async fn fetch(&self) -> Result<Vec<RawItem>, AdapterError> {
        let resp = self.client.get(HOT_URL).send().await?;
        if !resp.status().is_success() {
            return Err(AdapterError::Payload(format!(
                "listing returned status {}",
                resp.status().as_u16()
            )));
        }
        let listing: Listing = resp.json().await?;
        let posts = listing.data.children.into_iter().map(|c| c.data).collect();
        Ok(Self::map_posts(
            posts,
            &self.filter,
            self.description_max_chars,
        ))
    }

    fn name(&self) -> &'static str {
        "reddit"
    }
}
