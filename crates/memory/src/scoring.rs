//! Keyword-overlap relevance scoring.
//!
//! For a query split into lower-cased whitespace tokens, an entry scores
//!
//! ```text
//! Σ_token ( 1   if token ⊂ lower(entry text)
//!         + 0.5 if token ⊂ lower(any topic) ) / token_count
//! ```
//!
//! where entry text is `user_message + assistant_response + topics + summary`.
//! No stemming, stop words, or idf weighting. Repeated tokens count every
//! time, so a score can exceed 1.0; only the ordering matters to callers.

use chrono::{DateTime, Duration, Utc};
use switchyard_core::memory::{MemoryEntry, MemoryQuery, ScoredMemory};

const MS_PER_DAY: i64 = 86_400_000;

/// Lower-case and split on whitespace.
///
/// Leading and trailing whitespace yields no empty tokens, so an empty
/// token never matches every entry.
pub fn tokenize(query: &str) -> Vec<String> {
    query.to_lowercase().split_whitespace().map(str::to_string).collect()
}

/// Relevance of one entry for pre-tokenized query words.
pub fn relevance(tokens: &[String], entry: &MemoryEntry) -> f64 {
    if tokens.is_empty() {
        return 0.0;
    }
    let text = entry.search_text().to_lowercase();
    let topics: Vec<String> = entry.topics.iter().map(|t| t.to_lowercase()).collect();

    let total: f64 = tokens
        .iter()
        .map(|token| {
            let mut score = 0.0;
            if text.contains(token.as_str()) {
                score += 1.0;
            }
            if topics.iter().any(|t| t.contains(token.as_str())) {
                score += 0.5;
            }
            score
        })
        .sum();

    total / tokens.len() as f64
}

/// Timeframe filter, score, drop zeros, sort descending, keep `limit`.
///
/// A `timeframe_days` of zero means "no filter", as does a window reaching
/// past the earliest representable date.
pub fn rank<'a>(
    entries: impl IntoIterator<Item = &'a MemoryEntry>,
    query: &MemoryQuery,
    now: DateTime<Utc>,
) -> Vec<ScoredMemory> {
    let cutoff = query
        .timeframe_days
        .filter(|&days| days > 0)
        .and_then(|days| Duration::try_milliseconds(i64::from(days) * MS_PER_DAY))
        .and_then(|window| now.checked_sub_signed(window));
    let tokens = tokenize(&query.text);

    let mut scored: Vec<ScoredMemory> = entries
        .into_iter()
        .filter(|e| cutoff.is_none_or(|c| e.timestamp >= c))
        .filter_map(|e| {
            let relevance = relevance(&tokens, e);
            (relevance > 0.0).then(|| ScoredMemory {
                entry: e.clone(),
                relevance,
            })
        })
        .collect();

    // Stable: equal scores keep insertion order.
    scored.sort_by(|a, b| b.relevance.total_cmp(&a.relevance));
    scored.truncate(query.limit);
    scored
}

/// The `count` newest entries, newest first.
pub fn most_recent<'a>(
    entries: impl IntoIterator<Item = &'a MemoryEntry>,
    count: usize,
) -> Vec<MemoryEntry> {
    let mut all: Vec<MemoryEntry> = entries.into_iter().cloned().collect();
    all.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    all.truncate(count);
    all
}

/// Cheap extractive summary: the first `words` space-separated words of the
/// exchange, followed by an ellipsis.
pub fn summarize(user_message: &str, assistant_response: &str, words: usize) -> String {
    let combined = format!("{user_message} {assistant_response}");
    let head: Vec<&str> = combined.split(' ').take(words).collect();
    format!("{}...", head.join(" "))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(id: &str, days_ago: i64, user: &str, assistant: &str, topics: &[&str]) -> MemoryEntry {
        MemoryEntry {
            id: id.into(),
            timestamp: Utc::now() - Duration::days(days_ago),
            user_message: user.into(),
            assistant_response: assistant.into(),
            topics: topics.iter().map(|t| t.to_string()).collect(),
            summary: String::new(),
        }
    }

    #[test]
    fn tokenize_lowercases_and_splits() {
        assert_eq!(tokenize("  Blue   GREEN\tdeploy "), vec!["blue", "green", "deploy"]);
        assert!(tokenize("   ").is_empty());
    }

    #[test]
    fn relevance_formula_matches_definition() {
        let e = entry("m", 0, "How do we deploy?", "Use blue-green.", &["deployment"]);
        // "deploy": text hit (1) + topic hit (0.5); "green": text hit (1); "kafka": 0.
        let score = relevance(&tokenize("deploy green kafka"), &e);
        assert!((score - 2.5 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn repeated_tokens_can_exceed_one() {
        let e = entry("m", 0, "deployment", "", &["deployment"]);
        let score = relevance(&tokenize("deployment deployment"), &e);
        assert!((score - 1.5).abs() < 1e-9);
    }

    #[test]
    fn substring_matches_count() {
        let e = entry("m", 0, "migrations ran", "", &[]);
        assert_eq!(relevance(&tokenize("migration"), &e), 1.0);
    }

    #[test]
    fn rank_drops_zero_and_sorts_descending() {
        let entries = vec![
            entry("a", 1, "database migrations", "", &[]),
            entry("b", 1, "monitoring stack", "", &[]),
            entry("c", 1, "database", "", &["database"]),
        ];
        let ranked = rank(&entries, &MemoryQuery::new("database migrations"), Utc::now());
        let ids: Vec<&str> = ranked.iter().map(|r| r.entry.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "c"]);
        assert!(ranked.iter().all(|r| r.relevance > 0.0));
        assert!(ranked[0].relevance >= ranked[1].relevance);
    }

    #[test]
    fn rank_applies_timeframe_and_limit() {
        let entries = vec![
            entry("old", 30, "deployment plan", "", &[]),
            entry("new", 2, "deployment plan", "", &[]),
            entry("newer", 1, "deployment", "", &[]),
        ];
        let query = MemoryQuery::new("deployment").within_days(7).with_limit(1);
        let ranked = rank(&entries, &query, Utc::now());
        assert_eq!(ranked.len(), 1);
        assert_ne!(ranked[0].entry.id, "old");

        let unbounded = rank(&entries, &MemoryQuery::new("deployment").within_days(0), Utc::now());
        assert_eq!(unbounded.len(), 3);
    }

    #[test]
    fn huge_timeframe_means_no_cutoff() {
        let entries = vec![
            entry("a", 3, "deployment today", "", &[]),
            entry("b", 4000, "deployment long ago", "", &[]),
        ];
        let query = MemoryQuery::new("deployment").within_days(u32::MAX);
        let ranked = rank(&entries, &query, Utc::now());
        assert_eq!(ranked.len(), 2);
    }

    #[test]
    fn empty_query_matches_nothing() {
        let entries = vec![entry("a", 0, "anything", "", &["x"])];
        assert!(rank(&entries, &MemoryQuery::new("   "), Utc::now()).is_empty());
    }

    #[test]
    fn most_recent_is_newest_first() {
        let entries = vec![
            entry("a", 5, "", "", &[]),
            entry("b", 1, "", "", &[]),
            entry("c", 3, "", "", &[]),
        ];
        let recent = most_recent(&entries, 2);
        let ids: Vec<&str> = recent.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "c"]);
    }

    #[test]
    fn summary_takes_leading_words() {
        let s = summarize("one two three", "four five six", 4);
        assert_eq!(s, "one two three four...");
        assert_eq!(summarize("short", "reply", 10), "short reply...");
    }
}
