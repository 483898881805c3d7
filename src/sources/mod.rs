// src/sources/mod.rs
//! Source adapters and the helpers they share: the adapter trait, the cheap
//! keyword relevance filter, and markup stripping/truncation for feed text.

pub mod blogs;
pub mod devto;
pub mod guides;
pub mod hackernews;
pub mod reddit;
pub mod videos;

pub use blogs::BlogFeedAdapter;
pub use devto::DevToAdapter;
pub use guides::GuideAdapter;
pub use hackernews::HackerNewsAdapter;
pub use reddit::RedditAdapter;
pub use videos::VideoAdapter;

use crate::error::AdapterError;
use crate::types::RawItem;

/// User-Agent for the JSON API adapters.
pub(crate) const API_USER_AGENT: &str = "scaleweekly-curator/0.1";
/// Feed endpoints are pickier; present a browser-like agent.
pub(crate) const FEED_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

/// One external content source. `fetch` may fail with an `AdapterError`, but
/// the aggregator always degrades that to "zero items from this source" —
/// no adapter failure ever aborts a run.
#[async_trait::async_trait]
pub trait SourceAdapter: Send + Sync {
    async fn fetch(&self) -> Result<Vec<RawItem>, AdapterError>;
    fn name(&self) -> &'static str;
}

/// Case-insensitive substring relevance filter over combined item text.
/// Deliberately cheap precision pre-filter; final quality is the judge's job.
#[derive(Debug, Clone)]
pub struct KeywordFilter {
    keywords: Vec<String>,
}

impl KeywordFilter {
    pub fn new<I, S>(keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            keywords: keywords
                .into_iter()
                .map(|k| k.as_ref().to_lowercase())
                .filter(|k| !k.is_empty())
                .collect(),
        }
    }

    /// True iff at least one keyword occurs in the joined lowercase text.
    pub fn matches(&self, parts: &[&str]) -> bool {
        let hay = parts.join(" ").to_lowercase();
        self.keywords.iter().any(|k| hay.contains(k.as_str()))
    }
}

/// Reduce feed HTML to plain prose: decode entities, replace tags with a
/// space (so `</p><p>` boundaries don't glue words), fold typographic
/// quotes to ASCII, collapse whitespace.
pub(crate) fn strip_markup(s: &str) -> String {
    static RE_TAGS: once_cell::sync::OnceCell<regex::Regex> = once_cell::sync::OnceCell::new();
    static RE_WS: once_cell::sync::OnceCell<regex::Regex> = once_cell::sync::OnceCell::new();
    let re_tags = RE_TAGS.get_or_init(|| regex::Regex::new(r"(?is)</?[^>]+>").unwrap());
    let re_ws = RE_WS.get_or_init(|| regex::Regex::new(r"\s+").unwrap());

    let decoded = html_escape::decode_html_entities(s);
    let untagged = re_tags.replace_all(&decoded, " ");
    let quoted: String = untagged
        .chars()
        .map(|c| match c {
            '\u{201C}' | '\u{201D}' | '\u{00AB}' | '\u{00BB}' => '"',
            '\u{2018}' | '\u{2019}' => '\'',
            other => other,
        })
        .collect();
    re_ws.replace_all(&quoted, " ").trim().to_string()
}

/// Truncate to at most `max` chars on a char boundary.
pub(crate) fn truncate_chars(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        s.chars().take(max).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keyword_filter_is_case_insensitive_substring() {
        let f = KeywordFilter::new(["redis", "system design"]);
        assert!(f.matches(&["Scaling Redis at Shopify"]));
        assert!(f.matches(&["A", "primer on SYSTEM DESIGN interviews"]));
        assert!(!f.matches(&["Cooking with cast iron"]));
    }

    #[test]
    fn keyword_filter_combines_parts() {
        let f = KeywordFilter::new(["kafka"]);
        // Keyword only present in the tags part.
        assert!(f.matches(&["Event streaming lessons", "", "kafka messaging"]));
    }

    #[test]
    fn strip_markup_removes_tags_and_entities() {
        let s = "<p>Hello&nbsp;&amp;\n  <b>world</b></p>";
        assert_eq!(strip_markup(s), "Hello & world");
    }

    #[test]
    fn strip_markup_keeps_word_boundaries_at_tags() {
        assert_eq!(strip_markup("<p>first</p><p>second</p>"), "first second");
        assert_eq!(
            strip_markup("&ldquo;quoted&rdquo; and &lsquo;single&rsquo;"),
            "\"quoted\" and 'single'"
        );
    }

    #[test]
    fn truncate_respects_char_boundaries() {
        assert_eq!(truncate_chars("héllo", 2), "hé");
        assert_eq!(truncate_chars("abc", 10), "abc");
    }
}
