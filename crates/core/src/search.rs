//! Ranked name search over an [`EmoteDictionary`] (picker filtering, autocomplete).
//!
//! Relevance for query `Q` against name `N`, both case-folded:
//!
//! 1. `N == Q`
//! 2. `N` starts with `Q`
//! 3. `N` contains `Q`, earlier occurrence first
//! 4. `Q` is a fuzzy subsequence of `N`, higher score first
//!
//! Ties fall back to case-insensitive alphabetical order, then the exact name.

use crate::EmoteDictionary;
use nucleo_matcher::pattern::{AtomKind, CaseMatching, Normalization, Pattern};
use nucleo_matcher::{Config, Matcher, Utf32Str};
use std::cmp::Reverse;

/// Number of leading characters used for prefix buckets
pub const PREFIX_BUCKET_LEN: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub(crate) enum Tier {
    Exact,
    Prefix,
    Contains,
    Fuzzy,
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub(crate) struct RankKey {
    pub(crate) tier: Tier,
    position: usize,
    score: Reverse<u32>,
    lower: String,
    name: String,
}

pub(crate) struct FuzzyScorer {
    matcher: Matcher,
    pattern: Pattern,
    buf: Vec<char>,
}

impl FuzzyScorer {
    fn new(query: &str) -> Self {
        Self {
            matcher: Matcher::new(Config::DEFAULT),
            pattern: Pattern::new(
                query,
                CaseMatching::Ignore,
                Normalization::Smart,
                AtomKind::Fuzzy,
            ),
            buf: Vec::new(),
        }
    }

    fn score(&mut self, name: &str) -> Option<u32> {
        let haystack = Utf32Str::new(name, &mut self.buf);
        self.pattern.score(haystack, &mut self.matcher)
    }
}

/// Rank `name` against an already case-folded query; `None` means no tier matched
pub(crate) fn rank(query: &str, name: &str, fuzzy: Option<&mut FuzzyScorer>) -> Option<RankKey> {
    let lower = name.to_lowercase();
    let (tier, position, score) = if lower == query {
        (Tier::Exact, 0, 0)
    } else if lower.starts_with(query) {
        (Tier::Prefix, 0, 0)
    } else if let Some(byte_idx) = lower.find(query) {
        (Tier::Contains, lower[..byte_idx].chars().count(), 0)
    } else {
        let score = fuzzy?.score(name)?;
        (Tier::Fuzzy, 0, score)
    };

    Some(RankKey {
        tier,
        position,
        score: Reverse(score),
        lower,
        name: name.to_string(),
    })
}

fn normalize_query(query: &str) -> String {
    query.trim().to_lowercase()
}

impl EmoteDictionary {
    /// Ranked search over every name. An empty query returns all names alphabetically.
    pub fn filter(&self, query: &str) -> Vec<String> {
        self.ranked(&normalize_query(query), None)
    }

    /// Ranked search with an optional result cap.
    ///
    /// Returns exactly what [`filter`](Self::filter) returns truncated to `limit`; the
    /// prefix bucket answers directly whenever its exact/prefix hits fill the limit.
    pub fn query(&self, prefix: &str, limit: Option<usize>) -> Vec<String> {
        let query = normalize_query(prefix);
        if let (Some(limit), false) = (limit, query.is_empty()) {
            let key: String = query.chars().take(PREFIX_BUCKET_LEN).collect();
            if let Some(bucket) = self.prefix_index.get(&key) {
                let mut hits: Vec<RankKey> = bucket
                    .iter()
                    .filter_map(|name| rank(&query, name, None))
                    .filter(|key| key.tier <= Tier::Prefix)
                    .collect();
                if hits.len() >= limit {
                    hits.sort();
                    return hits.into_iter().take(limit).map(|key| key.name).collect();
                }
            }
        }
        self.ranked(&query, limit)
    }

    fn ranked(&self, query: &str, limit: Option<usize>) -> Vec<String> {
        let limit = limit.unwrap_or(usize::MAX);
        if query.is_empty() {
            return self.sorted_names.iter().take(limit).cloned().collect();
        }

        let mut fuzzy = FuzzyScorer::new(query);
        let mut hits: Vec<RankKey> = self
            .sorted_names
            .iter()
            .filter_map(|name| rank(query, name, Some(&mut fuzzy)))
            .collect();
        hits.sort();
        hits.into_iter().take(limit).map(|key| key.name).collect()
    }
}
