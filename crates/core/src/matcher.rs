use crate::{EmoteDictionary, MatchPolicy, Result};
use regex::{Regex, RegexBuilder};
use std::collections::HashSet;

/// Upper bound for the compiled alternation; large emote sets need more than the regex default
const COMPILED_SIZE_LIMIT: usize = 256 * (1 << 20);
const DFA_SIZE_LIMIT: usize = 64 * (1 << 20);

/// A policy-bound pattern over a fixed name set.
///
/// Names are escaped and alternated longest-first, so leftmost-first matching picks
/// the longest name at any position. Whitespace boundaries are checked after each
/// candidate since the regex engine has no look-around.
#[derive(Debug, Clone)]
pub struct CompiledMatcher {
    policy: MatchPolicy,
    regex: Option<Regex>,
    name_count: usize,
}

/// One non-overlapping occurrence in the scanned text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawMatch<'t> {
    /// Byte offset of the whole span (including colons under [`MatchPolicy::Colon`])
    pub start: usize,
    pub end: usize,
    /// The whole matched span
    pub matched: &'t str,
    /// The emote name as written in the text, without delimiters
    pub name: &'t str,
}

impl CompiledMatcher {
    pub fn compile<'a, I>(names: I, policy: MatchPolicy) -> Result<Self>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut seen = HashSet::new();
        let mut ordered: Vec<&str> = names
            .into_iter()
            .filter(|name| !name.is_empty() && seen.insert(*name))
            .collect();
        if ordered.is_empty() {
            return Ok(Self::never(policy));
        }

        // Stable: equal lengths keep dictionary order.
        ordered.sort_by_key(|name| std::cmp::Reverse(name.chars().count()));

        let alternation = ordered
            .iter()
            .map(|name| regex::escape(name))
            .collect::<Vec<_>>()
            .join("|");
        let pattern = match policy {
            MatchPolicy::Word | MatchPolicy::CaseInsensitive => format!("(?:{alternation})"),
            MatchPolicy::Colon => format!(":(?:{alternation}):"),
        };

        let regex = RegexBuilder::new(&pattern)
            .case_insensitive(policy.is_case_insensitive())
            .size_limit(COMPILED_SIZE_LIMIT)
            .dfa_size_limit(DFA_SIZE_LIMIT)
            .build()?;

        log::debug!(
            "Compiled {} matcher over {} names ({} pattern bytes)",
            policy,
            ordered.len(),
            pattern.len()
        );

        Ok(Self {
            policy,
            regex: Some(regex),
            name_count: ordered.len(),
        })
    }

    pub fn for_dictionary(dictionary: &EmoteDictionary, policy: MatchPolicy) -> Result<Self> {
        Self::compile(dictionary.names().iter().map(String::as_str), policy)
    }

    /// A matcher that recognizes nothing
    pub fn never(policy: MatchPolicy) -> Self {
        Self {
            policy,
            regex: None,
            name_count: 0,
        }
    }

    pub fn policy(&self) -> MatchPolicy {
        self.policy
    }

    pub fn name_count(&self) -> usize {
        self.name_count
    }

    pub fn is_empty(&self) -> bool {
        self.regex.is_none()
    }

    pub fn find_iter<'m, 't>(&'m self, text: &'t str) -> RawMatches<'m, 't> {
        RawMatches {
            matcher: self,
            text,
            pos: 0,
        }
    }
}

/// Iterator over [`RawMatch`]es, see [`CompiledMatcher::find_iter`]
#[derive(Debug)]
pub struct RawMatches<'m, 't> {
    matcher: &'m CompiledMatcher,
    text: &'t str,
    pos: usize,
}

impl<'t> Iterator for RawMatches<'_, 't> {
    type Item = RawMatch<'t>;

    fn next(&mut self) -> Option<Self::Item> {
        let regex = self.matcher.regex.as_ref()?;
        let text = self.text;

        while self.pos < text.len() {
            let found = regex.find_at(text, self.pos)?;
            let (start, end) = (found.start(), found.end());

            if self.matcher.policy.requires_whitespace_boundary()
                && !at_whitespace_boundary(text, start, end)
            {
                self.pos = next_char_boundary(text, start);
                continue;
            }

            self.pos = end;
            let matched = found.as_str();
            let name = match self.matcher.policy {
                MatchPolicy::Colon => &matched[1..matched.len() - 1],
                MatchPolicy::Word | MatchPolicy::CaseInsensitive => matched,
            };
            return Some(RawMatch {
                start,
                end,
                matched,
                name,
            });
        }

        None
    }
}

fn at_whitespace_boundary(text: &str, start: usize, end: usize) -> bool {
    let before_ok = text[..start]
        .chars()
        .next_back()
        .map_or(true, char::is_whitespace);
    let after_ok = text[end..].chars().next().map_or(true, char::is_whitespace);
    before_ok && after_ok
}

fn next_char_boundary(text: &str, idx: usize) -> usize {
    idx + text[idx..].chars().next().map_or(1, char::len_utf8)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn names_of<'t>(matcher: &CompiledMatcher, text: &'t str) -> Vec<&'t str> {
        matcher.find_iter(text).map(|m| m.name).collect()
    }

    #[test]
    fn test_empty_name_set_never_matches() {
        for policy in MatchPolicy::ALL {
            let matcher = CompiledMatcher::compile(std::iter::empty(), policy).unwrap();
            assert!(matcher.is_empty());
            assert_eq!(matcher.find_iter("anything :at: all").count(), 0);
        }
        let matcher = CompiledMatcher::compile([""], MatchPolicy::Colon).unwrap();
        assert!(matcher.is_empty());
    }

    #[test]
    fn test_longest_name_wins() {
        let matcher = CompiledMatcher::compile(["Pog", "PogChamp"], MatchPolicy::Word).unwrap();
        assert_eq!(names_of(&matcher, "PogChamp"), vec!["PogChamp"]);
        assert_eq!(names_of(&matcher, "Pog PogChamp Pog"), vec!["Pog", "PogChamp", "Pog"]);
    }

    #[test]
    fn test_word_boundaries() {
        let matcher = CompiledMatcher::compile(["Clap"], MatchPolicy::Word).unwrap();
        assert_eq!(names_of(&matcher, "Clap"), vec!["Clap"]);
        assert_eq!(names_of(&matcher, "\tClap\n"), vec!["Clap"]);
        assert!(names_of(&matcher, "Clapping").is_empty());
        assert!(names_of(&matcher, "xClap").is_empty());
        assert!(names_of(&matcher, "Clap!").is_empty());
        assert!(names_of(&matcher, "clap").is_empty());
    }

    #[test]
    fn test_adjacent_words_share_whitespace() {
        let matcher = CompiledMatcher::compile(["Clap"], MatchPolicy::Word).unwrap();
        let spans: Vec<(usize, usize)> = matcher
            .find_iter("Clap Clap Clap")
            .map(|m| (m.start, m.end))
            .collect();
        assert_eq!(spans, vec![(0, 4), (5, 9), (10, 14)]);
    }

    #[test]
    fn test_rejected_candidate_does_not_hide_later_match() {
        let matcher = CompiledMatcher::compile(["ab", "b"], MatchPolicy::Word).unwrap();
        assert_eq!(names_of(&matcher, "xab b"), vec!["b"]);
    }

    #[test]
    fn test_case_insensitive() {
        let matcher =
            CompiledMatcher::compile(["KEKW"], MatchPolicy::CaseInsensitive).unwrap();
        assert_eq!(names_of(&matcher, "kekw and KeKw"), vec!["kekw", "KeKw"]);
        assert!(names_of(&matcher, "kekwait").is_empty());
    }

    #[test]
    fn test_colon_policy() {
        let matcher = CompiledMatcher::compile(["Clap"], MatchPolicy::Colon).unwrap();
        let found: Vec<RawMatch<'_>> = matcher.find_iter("go :Clap: now").collect();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].matched, ":Clap:");
        assert_eq!(found[0].name, "Clap");
        assert_eq!((found[0].start, found[0].end), (3, 9));

        assert!(names_of(&matcher, "go Clap now").is_empty());
        assert_eq!(names_of(&matcher, "x:Clap:y"), vec!["Clap"]);
        assert!(names_of(&matcher, ":clap:").is_empty());
    }

    #[test]
    fn test_colon_matches_do_not_overlap() {
        let matcher = CompiledMatcher::compile(["a", "b"], MatchPolicy::Colon).unwrap();
        assert_eq!(names_of(&matcher, ":a:b:"), vec!["a"]);
        assert_eq!(names_of(&matcher, ":a::b:"), vec!["a", "b"]);
    }

    #[test]
    fn test_special_characters_are_literal() {
        let names = ["D:", "(ditto)", "a.b", "^_^", "$$$", "[x]", "c++"];
        let matcher = CompiledMatcher::compile(names, MatchPolicy::Word).unwrap();
        assert_eq!(
            names_of(&matcher, "D: (ditto) a.b ^_^ $$$ [x] c++"),
            names.to_vec()
        );
        assert!(names_of(&matcher, "axb ditto c+").is_empty());
    }

    #[test]
    fn test_unicode_boundaries() {
        let matcher = CompiledMatcher::compile(["ñam"], MatchPolicy::Word).unwrap();
        let found: Vec<RawMatch<'_>> = matcher.find_iter("é ñam\u{3000}ñam").collect();
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].start, 3);
        assert!(names_of(&matcher, "éñam").is_empty());
    }

    #[test]
    fn test_compile_is_deterministic() {
        let dict = EmoteDictionary::build(
            ["Pog", "PogChamp", "KEKW", "Clap"]
                .iter()
                .enumerate()
                .map(|(idx, name)| {
                    crate::RawEmoteEntry::new(idx.to_string(), *name)
                        .host_url(format!("//cdn/{idx}"))
                }),
        );
        let first = CompiledMatcher::for_dictionary(&dict, MatchPolicy::Word).unwrap();
        let second = CompiledMatcher::for_dictionary(&dict, MatchPolicy::Word).unwrap();
        let text = "Pog PogChamp Clap KEKW PogChampion";
        assert_eq!(
            first.find_iter(text).collect::<Vec<_>>(),
            second.find_iter(text).collect::<Vec<_>>()
        );
        assert_eq!(first.name_count(), 4);
    }
}
