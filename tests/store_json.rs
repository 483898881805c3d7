// tests/store_json.rs
use scaleweekly_curator::store::{ArticleStore, JsonFileStore};
use scaleweekly_curator::types::{Category, Difficulty, RawItem, ScoredItem};

fn scored(url: &str, score: u8, rank: Option<u32>) -> ScoredItem {
    ScoredItem {
        item: RawItem::new("devto", "A title", url),
        score,
        reasoning: "fine".to_string(),
        category: Category::default(),
        difficulty: Difficulty::default(),
        key_insights: vec!["takeaway".to_string()],
        estimated_time: Some(10),
        rank,
    }
}

#[tokio::test]
async fn upsert_is_idempotent_per_url() {
    let dir = tempfile::tempdir().unwrap();
    let store = JsonFileStore::open(dir.path().join("curated.json")).unwrap();

    store
        .upsert_by_url(&scored("https://s.test/a", 6, None))
        .await
        .unwrap();
    store
        .upsert_by_url(&scored("https://s.test/a", 9, Some(1)))
        .await
        .unwrap();

    assert_eq!(store.len(), 1);
    let rec = store.get("https://s.test/a").unwrap();
    assert_eq!(rec.score, 9);
    assert_eq!(rec.rank, Some(1));
}

#[tokio::test]
async fn clear_all_ranks_unsets_every_rank() {
    let dir = tempfile::tempdir().unwrap();
    let store = JsonFileStore::open(dir.path().join("curated.json")).unwrap();

    store
        .upsert_by_url(&scored("https://s.test/a", 9, Some(1)))
        .await
        .unwrap();
    store
        .upsert_by_url(&scored("https://s.test/b", 8, Some(2)))
        .await
        .unwrap();

    store.clear_all_ranks().await.unwrap();

    assert_eq!(store.get("https://s.test/a").unwrap().rank, None);
    assert_eq!(store.get("https://s.test/b").unwrap().rank, None);
}

#[tokio::test]
async fn document_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("curated.json");

    {
        let store = JsonFileStore::open(&path).unwrap();
        store
            .upsert_by_url(&scored("https://s.test/a", 7, Some(3)))
            .await
            .unwrap();
    }

    let reopened = JsonFileStore::open(&path).unwrap();
    assert_eq!(reopened.len(), 1);
    let rec = reopened.get("https://s.test/a").unwrap();
    assert_eq!(rec.score, 7);
    assert_eq!(rec.rank, Some(3));
    assert_eq!(rec.item.title, "A title");
}

#[tokio::test]
async fn opening_a_missing_file_starts_empty() {
    let dir = tempfile::tempdir().unwrap();
    let store = JsonFileStore::open(dir.path().join("never-written.json")).unwrap();
    assert!(store.is_empty());
}
