use crate::search::{rank, PREFIX_BUCKET_LEN};
use crate::{AssetFormat, EmoteRecord, RawEmoteEntry};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;

const UNKNOWN_CREATOR: &str = "Unknown";

/// Name → record mapping plus the lookup structures derived from it.
///
/// A dictionary is built in one piece and never mutated afterwards; reloads
/// produce a fresh instance.
#[derive(Debug, Clone, Default)]
pub struct EmoteDictionary {
    pub(crate) emotes: HashMap<String, Arc<EmoteRecord>>,
    /// lowercased name -> canonical name, last write wins
    pub(crate) lowercase: HashMap<String, String>,
    /// Case-insensitive order, exact name as tiebreak
    pub(crate) sorted_names: Vec<String>,
    /// First 1..=3 lowercased chars -> names, each list in relevance order for its key
    pub(crate) prefix_index: HashMap<String, Vec<String>>,
}

/// Counters collected while building a dictionary
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BuildReport {
    pub accepted: usize,
    pub skipped_no_asset: usize,
    pub skipped_invalid_name: usize,
    pub duplicates: usize,
}

impl EmoteDictionary {
    /// Build with the default asset format
    pub fn build(entries: impl IntoIterator<Item = RawEmoteEntry>) -> Self {
        DictionaryBuilder::default().build(entries)
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.emotes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.emotes.is_empty()
    }

    /// All names, sorted case-insensitively
    pub fn names(&self) -> &[String] {
        &self.sorted_names
    }

    pub fn contains(&self, name: &str) -> bool {
        self.emotes.contains_key(name)
    }

    /// Exact, case-sensitive lookup
    pub fn resolve(&self, name: &str) -> Option<&Arc<EmoteRecord>> {
        self.emotes.get(name)
    }

    /// Lookup through the lowercase index; the returned record carries the canonical name
    pub fn resolve_case_insensitive(&self, name: &str) -> Option<&Arc<EmoteRecord>> {
        let canonical = self.lowercase.get(&name.to_lowercase())?;
        self.emotes.get(canonical)
    }

    /// Records in name order
    pub fn records(&self) -> impl Iterator<Item = &Arc<EmoteRecord>> + '_ {
        self.sorted_names
            .iter()
            .filter_map(|name| self.emotes.get(name))
    }

    pub fn animated_count(&self) -> usize {
        self.emotes.values().filter(|record| record.animated()).count()
    }
}

/// Turns raw source entries into an [`EmoteDictionary`]
#[derive(Debug, Clone, Default)]
pub struct DictionaryBuilder {
    format: AssetFormat,
}

impl DictionaryBuilder {
    pub fn new(format: AssetFormat) -> Self {
        Self { format }
    }

    pub fn build(&self, entries: impl IntoIterator<Item = RawEmoteEntry>) -> EmoteDictionary {
        self.build_with_report(entries).0
    }

    pub fn build_with_report(
        &self,
        entries: impl IntoIterator<Item = RawEmoteEntry>,
    ) -> (EmoteDictionary, BuildReport) {
        let mut report = BuildReport::default();
        let mut emotes: HashMap<String, Arc<EmoteRecord>> = HashMap::new();
        let mut lowercase: HashMap<String, String> = HashMap::new();

        for entry in entries {
            if !is_valid_name(&entry.name) {
                log::debug!("Skipping emote {:?} ({}): invalid name", entry.name, entry.id);
                report.skipped_invalid_name += 1;
                continue;
            }

            let Some(base_url) = entry.host_url.as_deref().and_then(resolve_base_url) else {
                log::debug!("Skipping emote {} ({}): no asset host", entry.name, entry.id);
                report.skipped_no_asset += 1;
                continue;
            };

            let record = self.make_record(entry, base_url);
            lowercase.insert(record.name().to_lowercase(), record.name().to_string());
            if emotes
                .insert(record.name().to_string(), Arc::new(record))
                .is_some()
            {
                report.duplicates += 1;
            }
        }

        let mut sorted_names: Vec<String> = emotes.keys().cloned().collect();
        sorted_names.sort_by_cached_key(|name| (name.to_lowercase(), name.clone()));

        let prefix_index = build_prefix_index(&sorted_names);
        report.accepted = emotes.len();

        let dictionary = EmoteDictionary {
            emotes,
            lowercase,
            sorted_names,
            prefix_index,
        };
        (dictionary, report)
    }

    fn make_record(&self, entry: RawEmoteEntry, base_url: String) -> EmoteRecord {
        let creator = [&entry.owner_display_name, &entry.owner_username]
            .into_iter()
            .flatten()
            .map(|label| label.trim())
            .find(|label| !label.is_empty())
            .unwrap_or(UNKNOWN_CREATOR)
            .to_string();

        let asset_url = self.format.display_url(&base_url);
        let preview_url = self.format.preview_url(&base_url);
        EmoteRecord::new(
            entry.name,
            entry.id,
            base_url,
            asset_url,
            preview_url,
            entry.animated.unwrap_or(false),
            creator,
        )
    }
}

/// Names are matched between whitespace boundaries, so they cannot contain any
fn is_valid_name(name: &str) -> bool {
    !name.is_empty() && !name.chars().any(char::is_whitespace)
}

/// Protocol-relative hosts get `https:`; anything without a scheme is unusable
pub(crate) fn resolve_base_url(host: &str) -> Option<String> {
    let host = host.trim().trim_end_matches('/');
    if let Some(rest) = host.strip_prefix("//") {
        return (!rest.is_empty()).then(|| format!("https:{host}"));
    }
    for scheme in ["https://", "http://"] {
        if let Some(rest) = host.strip_prefix(scheme) {
            return (!rest.is_empty()).then(|| host.to_string());
        }
    }
    None
}

fn build_prefix_index(sorted_names: &[String]) -> HashMap<String, Vec<String>> {
    let mut index: HashMap<String, Vec<String>> = HashMap::new();
    for name in sorted_names {
        let lower = name.to_lowercase();
        let mut key = String::new();
        for ch in lower.chars().take(PREFIX_BUCKET_LEN) {
            key.push(ch);
            index.entry(key.clone()).or_default().push(name.clone());
        }
    }

    for (key, names) in index.iter_mut() {
        names.sort_by_cached_key(|name| rank(key, name, None));
    }
    index
}
