// tests/blogs_rss.rs
use scaleweekly_curator::config::SourcesConfig;
use scaleweekly_curator::sources::{BlogFeedAdapter, SourceAdapter};

const FIXTURE: &str = include_str!("fixtures/blog_rss.xml");

#[tokio::test]
async fn fixture_feed_yields_capped_clean_items() {
    let cfg = SourcesConfig::default();
    let adapter =
        BlogFeedAdapter::from_fixtures(vec![("example".to_string(), FIXTURE.to_string())], &cfg);

    let items = adapter.fetch().await.unwrap();

    // Default per-feed cap is 5; the fixture carries 6 items.
    assert_eq!(items.len(), 5);
    assert!(items.iter().all(|i| i.source == "example"));
    assert_eq!(items[0].title, "How we sharded Postgres without downtime");
    assert_eq!(items[0].url, "https://blog.example.test/sharding-postgres");
    // Markup stripped, typographic entities normalized.
    assert_eq!(
        items[0].description,
        "A year-long migration, told honestly. Includes the \"oops\" moments."
    );
    assert!(!items.iter().any(|i| i.url.ends_with("/capped")));
}

#[tokio::test]
async fn two_fixture_feeds_are_concatenated() {
    let cfg = SourcesConfig::default();
    let adapter = BlogFeedAdapter::from_fixtures(
        vec![
            ("one".to_string(), FIXTURE.to_string()),
            ("two".to_string(), FIXTURE.to_string()),
        ],
        &cfg,
    );

    let items = adapter.fetch().await.unwrap();
    assert_eq!(items.len(), 10);
    assert_eq!(items.iter().filter(|i| i.source == "two").count(), 5);
}
