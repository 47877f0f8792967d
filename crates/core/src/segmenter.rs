use crate::{CompiledMatcher, EmoteDictionary, EmoteRecord};
use serde::Serialize;
use std::sync::Arc;

/// One unit of a segmented message
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Segment {
    Literal { text: String },
    Emote(EmoteRef),
}

/// A resolved emote occurrence
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmoteRef {
    /// Canonical dictionary name
    pub name: String,
    /// Text of the original span, delimiters included
    pub matched: String,
    pub start: usize,
    pub end: usize,
    pub record: Arc<EmoteRecord>,
}

impl Segment {
    pub fn literal(text: impl Into<String>) -> Self {
        Self::Literal { text: text.into() }
    }

    /// The slice of the input this segment covers
    pub fn source_text(&self) -> &str {
        match self {
            Self::Literal { text } => text,
            Self::Emote(emote) => &emote.matched,
        }
    }

    pub fn as_emote(&self) -> Option<&EmoteRef> {
        match self {
            Self::Emote(emote) => Some(emote),
            Self::Literal { .. } => None,
        }
    }

    pub fn is_emote(&self) -> bool {
        matches!(self, Self::Emote(_))
    }
}

/// Split `text` into literal and emote segments.
///
/// Never fails: spans the matcher finds but the dictionary cannot resolve stay literal.
/// Adjacent literal text is merged, so a message without emotes is one segment; the
/// empty message is a single empty literal.
pub fn segment(
    text: &str,
    matcher: &CompiledMatcher,
    dictionary: &EmoteDictionary,
) -> Vec<Segment> {
    let mut segments = Vec::new();
    let mut cursor = 0;

    for found in matcher.find_iter(text) {
        push_literal(&mut segments, &text[cursor..found.start]);

        match resolve(found.name, matcher, dictionary) {
            Some(record) => segments.push(Segment::Emote(EmoteRef {
                name: record.name().to_string(),
                matched: found.matched.to_string(),
                start: found.start,
                end: found.end,
                record: Arc::clone(record),
            })),
            None => {
                log::debug!("Unresolved emote match {:?}, keeping text", found.matched);
                push_literal(&mut segments, found.matched);
            }
        }

        cursor = found.end;
    }

    push_literal(&mut segments, &text[cursor..]);
    if segments.is_empty() {
        segments.push(Segment::literal(""));
    }
    segments
}

fn resolve<'d>(
    name: &str,
    matcher: &CompiledMatcher,
    dictionary: &'d EmoteDictionary,
) -> Option<&'d Arc<EmoteRecord>> {
    dictionary.resolve(name).or_else(|| {
        if matcher.policy().is_case_insensitive() {
            dictionary.resolve_case_insensitive(name)
        } else {
            None
        }
    })
}

fn push_literal(segments: &mut Vec<Segment>, text: &str) {
    if text.is_empty() {
        return;
    }
    if let Some(Segment::Literal { text: last }) = segments.last_mut() {
        last.push_str(text);
    } else {
        segments.push(Segment::literal(text));
    }
}

/// Concatenate the original spans back into the source text
pub fn reassemble(segments: &[Segment]) -> String {
    segments.iter().map(Segment::source_text).collect()
}
