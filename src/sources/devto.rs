// src/sources/devto.rs
//! dev.to adapter: top articles of the last week via the public API,
//! filtered on title + description + tag list.

use std::time::Duration;

use serde::Deserialize;

use crate::error::AdapterError;
use crate::sources::{KeywordFilter, SourceAdapter, API_USER_AGENT};
use crate::types::RawItem;

const ARTICLES_URL: &str = "https://dev.to/api/articles?per_page=50&top=7";

#[derive(Debug, Deserialize)]
struct DevToArticle {
    title: String,
    url: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    tag_list: Vec<String>,
}

pub struct DevToAdapter {
    client: reqwest::Client,
    filter: KeywordFilter,
}

impl DevToAdapter {
    pub fn new(filter: KeywordFilter, request_timeout_secs: u64) -> Self {
        let client = reqwest::Client::builder()
            .user_agent(API_USER_AGENT)
            .timeout(Duration::from_secs(request_timeout_secs))
            .build()
            .expect("reqwest client");
        Self { client, filter }
    }

    fn map_articles(articles: Vec<DevToArticle>, filter: &KeywordFilter) -> Vec<RawItem> {
        articles
            .into_iter()
            .filter(|a| {
                let tags = a.tag_list.join(" ");
                filter.matches(&[&a.title, &a.description, &tags])
            })
            .map(|a| RawItem {
                description: a.description,
                tags: a.tag_list,
                ..RawItem::new("devto", &a.title, &a.url)
            })
            .collect()
    }
}

#[async_trait::async_trait]
impl SourceAdapter for DevToAdapter {
    async fn fetch(&self) -> Result<Vec<RawItem>, AdapterError> {
        let resp = self.client.get(ARTICLES_URL).send().await?;
        if !resp.status().is_success() {
            return Err(AdapterError::Payload(format!(
                "articles endpoint returned status {}",
                resp.status().as_u16()
            )));
        }
        let articles: Vec<DevToArticle> = resp.json().await?;
        Ok(Self::map_articles(articles, &self.filter))
    }

    fn name(&self) -> &'static str {
        "devto"
    }
}
