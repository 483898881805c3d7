// src/score/prompt.rs
//! Builds the batch scoring prompt. Indices are batch-local; the judge is
//! told to answer with a bare JSON array and nothing else.

use std::fmt::Write as _;

use crate::types::{Category, Difficulty, RawItem, SCORE_MAX, SCORE_MIN};

const PROMPT_DESCRIPTION_CAP: usize = 200;

pub fn build_prompt(batch: &[RawItem]) -> String {
    let mut p = String::with_capacity(2048 + batch.len() * 256);

    let _ = writeln!(
        p,
        "You are an expert curator for \"ScaleWeekly\" - a newsletter focused on system design, \
         scalability, DevOps, and site reliability engineering."
    );
    let _ = writeln!(p);
    let _ = writeln!(
        p,
        "Analyze these {} items and score each from {SCORE_MIN} to {SCORE_MAX} based on:",
        batch.len()
    );
    let _ = writeln!(p, "- Relevance to system design/scalability/DevOps (40%)");
    let _ = writeln!(p, "- Technical depth and actionable insights (30%)");
    let _ = writeln!(p, "- Real-world production experience (20%)");
    let _ = writeln!(p, "- Novelty and uniqueness (10%)");
    let _ = writeln!(p);
    let _ = writeln!(p, "Items:");

    for (i, item) in batch.iter().enumerate() {
        let _ = writeln!(p, "{i}. {} ({})", item.title, item.source);
        let description: String = item.description.chars().take(PROMPT_DESCRIPTION_CAP).collect();
        if description.is_empty() {
            let _ = writeln!(p, "   No description");
        } else {
            let _ = writeln!(p, "   {description}");
        }
        if !item.tags.is_empty() {
            let _ = writeln!(p, "   Topics: {}", item.tags.join(", "));
        }
        if let Some(minutes) = item.duration_minutes {
            let _ = writeln!(p, "   Duration: {minutes} min");
        }
        if item.has_visuals {
            let _ = writeln!(p, "   Has Visuals: Yes");
        }
        let _ = writeln!(p);
    }

    let _ = writeln!(
        p,
        "Return ONLY a valid JSON array (no markdown, no code blocks, no extra text):"
    );
    let _ = writeln!(p, "[");
    let _ = writeln!(p, "  {{");
    let _ = writeln!(p, "    \"index\": 0,");
    let _ = writeln!(p, "    \"score\": 9,");
    let _ = writeln!(
        p,
        "    \"reasoning\": \"Excellent deep-dive into production reliability patterns\","
    );
    let _ = writeln!(p, "    \"category\": \"System Design\",");
    let _ = writeln!(p, "    \"difficulty\": \"Intermediate\",");
    let _ = writeln!(
        p,
        "    \"keyInsights\": [\"Workflow patterns\", \"Failure recovery at scale\"],"
    );
    let _ = writeln!(p, "    \"estimatedTime\": 15");
    let _ = writeln!(p, "  }}");
    let _ = writeln!(p, "]");
    let _ = writeln!(p);

    let categories: Vec<&str> = Category::ALL.iter().map(|c| c.as_str()).collect();
    let _ = writeln!(p, "Categories must be one of: {}", categories.join(", "));
    let difficulties: Vec<&str> = Difficulty::ALL.iter().map(|d| d.as_str()).collect();
    let _ = writeln!(p, "Difficulty must be one of: {}", difficulties.join(", "));
    let _ = writeln!(p, "keyInsights: 2-4 key takeaways.");
    let _ = writeln!(
        p,
        "estimatedTime: videos use actual duration; articles 10-30 min based on depth."
    );
    let _ = writeln!(p, "`index` refers to the item's position in the list above.");
    let _ = writeln!(p);
    let _ = writeln!(p, "Respond with ONLY the JSON array.");

    p
}
