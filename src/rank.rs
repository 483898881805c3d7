// src/rank.rs
//! Ranker/merger: sorts the merged scored list and assigns dense ranks to
//! the featured top-N subset. Ties keep their merge order (stable sort);
//! nothing beyond that is promised for equal scores.

use crate::types::ScoredItem;

#[derive(Debug)]
pub struct Ranked {
    /// Top-N by score, carrying dense ranks 1..N.
    pub featured: Vec<ScoredItem>,
    /// Everything else: scored, archived, unranked.
    pub rest: Vec<ScoredItem>,
}

pub fn rank(mut scored: Vec<ScoredItem>, top_n: usize) -> Ranked {
    scored.sort_by(|a, b| b.score.cmp(&a.score));

    let split = top_n.min(scored.len());
    let rest_tail = scored.split_off(split);
    let mut featured = scored;

    for (i, item) in featured.iter_mut().enumerate() {
        item.rank = Some(i as u32 + 1);
    }
    let mut rest = rest_tail;
    for item in rest.iter_mut() {
        item.rank = None;
    }

    Ranked { featured, rest }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Category, Difficulty, RawItem, ScoredItem};

    fn scored(url: &str, score: u8) -> ScoredItem {
        ScoredItem {
            item: RawItem::new("devto", "t", url),
            score,
            reasoning: String::new(),
            category: Category::default(),
            difficulty: Difficulty::default(),
            key_insights: Vec::new(),
            estimated_time: None,
            rank: None,
        }
    }

    #[test]
    fn featured_ranks_are_dense_one_to_n() {
        let items: Vec<ScoredItem> = (0..9).map(|i| scored(&format!("u{i}"), (i % 5) as u8 + 1)).collect();
        let ranked = rank(items, 5);
        let ranks: Vec<u32> = ranked.featured.iter().map(|s| s.rank.unwrap()).collect();
        assert_eq!(ranks, vec![1, 2, 3, 4, 5]);
        assert!(ranked.rest.iter().all(|s| s.rank.is_none()));
    }

    #[test]
    fn dense_ranks_cap_at_total_when_fewer_than_n() {
        let items = vec![scored("a", 4), scored("b", 9)];
        let ranked = rank(items, 12);
        let ranks: Vec<u32> = ranked.featured.iter().map(|s| s.rank.unwrap()).collect();
        assert_eq!(ranks, vec![1, 2]);
        assert!(ranked.rest.is_empty());
    }

    #[test]
    fn output_is_sorted_by_score_descending() {
        let items = vec![scored("a", 3), scored("b", 10), scored("c", 7), scored("d", 7)];
        let ranked = rank(items, 2);
        let all: Vec<&ScoredItem> = ranked.featured.iter().chain(ranked.rest.iter()).collect();
        for pair in all.windows(2) {
            assert!(pair[0].score >= pair[1].score);
        }
    }

    #[test]
    fn ties_keep_merge_order() {
        let items = vec![scored("first", 7), scored("second", 7), scored("third", 7)];
        let ranked = rank(items, 2);
        assert_eq!(ranked.featured[0].item.url, "first");
        assert_eq!(ranked.featured[1].item.url, "second");
        assert_eq!(ranked.rest[0].item.url, "third");
    }
}
