// src/score/parse.rs
//! Judge response parsing and validation. Providers wrap JSON in markdown
//! fences, hallucinate indices, and invent categories; everything here
//! either rejects the response (so the retry loop fires) or coerces the
//! payload into the closed model.

use serde::Deserialize;

use crate::error::ScoreError;
use crate::score::DEFAULT_ESTIMATED_TIME;
use crate::types::{Category, Difficulty, RawItem, ScoredItem, SCORE_MAX, SCORE_MIN};

/// One entry of the judge's JSON array, as loosely as we accept it.
#[derive(Debug, Deserialize)]
struct JudgeEntry {
    index: i64,
    score: f64,
    #[serde(default)]
    reasoning: String,
    #[serde(default)]
    category: String,
    #[serde(default)]
    difficulty: String,
    #[serde(default, rename = "keyInsights", alias = "keyLearnings")]
    key_insights: Vec<String>,
    #[serde(default, rename = "estimatedTime")]
    estimated_time: Option<u32>,
}

/// Remove markdown code-fence wrappers the judge sometimes adds despite
/// instructions.
fn strip_code_fences(s: &str) -> String {
    s.replace("```json", "").replace("```", "").trim().to_string()
}

/// Extract the first top-level JSON array by structural scan. A bare regex
/// match breaks on nested brackets inside strings, so track string state
/// and depth explicitly.
fn extract_json_array(s: &str) -> Option<&str> {
    let start = s.find('[')?;
    let bytes = s.as_bytes();
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (i, &b) in bytes.iter().enumerate().skip(start) {
        if in_string {
            if escaped {
                escaped = false;
            } else if b == b'\\' {
                escaped = true;
            } else if b == b'"' {
                in_string = false;
            }
            continue;
        }
        match b {
            b'"' => in_string = true,
            b'[' => depth += 1,
            b']' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&s[start..=i]);
                }
            }
            _ => {}
        }
    }
    None
}

fn clamp_score(raw: f64) -> u8 {
    let rounded = raw.round();
    if rounded < SCORE_MIN as f64 {
        SCORE_MIN
    } else if rounded > SCORE_MAX as f64 {
        SCORE_MAX
    } else {
        rounded as u8
    }
}

/// Parse one batch response and merge the retained entries onto the batch.
/// Entries with an out-of-range index are silently dropped; score and
/// category/difficulty are validated or coerced. Errors here mean "retry".
pub fn parse_batch_response(body: &str, batch: &[RawItem]) -> Result<Vec<ScoredItem>, ScoreError> {
    let cleaned = strip_code_fences(body);
    let array = extract_json_array(&cleaned)
        .ok_or_else(|| ScoreError::Parse("no JSON array in response".to_string()))?;
    let entries: Vec<JudgeEntry> = serde_json::from_str(array)
        .map_err(|e| ScoreError::Parse(format!("invalid scores array: {e}")))?;
    if entries.is_empty() {
        return Err(ScoreError::Parse("empty scores array".to_string()));
    }

    let mut out = Vec::with_capacity(entries.len());
    for entry in entries {
        let Ok(index) = usize::try_from(entry.index) else {
            continue;
        };
        let Some(item) = batch.get(index) else {
            continue;
        };
        let estimated_time = entry
            .estimated_time
            .or(item.duration_minutes)
            .or(Some(DEFAULT_ESTIMATED_TIME));
        out.push(ScoredItem {
            item: item.clone(),
            score: clamp_score(entry.score),
            reasoning: entry.reasoning,
            category: Category::from_judge(&entry.category),
            difficulty: Difficulty::from_judge(&entry.difficulty),
            key_insights: entry.key_insights,
            estimated_time,
            rank: None,
        });
    }
    Ok(out)
}
