//! # Emote Core
//!
//! Finds emote names inside chat text and splits the text into literal and
//! emote segments without losing a single character.
//!
//! ## Architecture
//!
//! ```text
//! RawEmoteEntry[]
//!     │
//!     ├──> Dictionary Builder
//!     │      ├─ Skip entries without an asset host
//!     │      ├─ Last duplicate wins
//!     │      └─ Derive lowercase index, sorted names, prefix buckets
//!     │
//!     ├──> Pattern Compiler (names × MatchPolicy)
//!     │      └─ Escaped, longest-first alternation
//!     │
//!     ├──> Segmenter
//!     │      └─ Literal / Emote segments, round-trip exact
//!     │
//!     └──> Search
//!            └─ exact > prefix > contains > fuzzy, then alphabetical
//! ```
//!
//! ## Example
//!
//! ```rust
//! use emote_core::{segment, CompiledMatcher, EmoteDictionary, MatchPolicy, RawEmoteEntry};
//!
//! let dict = EmoteDictionary::build(vec![
//!     RawEmoteEntry::new("1", "Clap").host_url("//cdn.7tv.app/emote/1"),
//! ]);
//! let matcher = CompiledMatcher::for_dictionary(&dict, MatchPolicy::Colon).unwrap();
//!
//! let segments = segment("go :Clap: now", &matcher, &dict);
//! assert_eq!(segments.len(), 3);
//! assert!(segments[1].is_emote());
//! ```

mod config;
mod dictionary;
mod error;
mod matcher;
mod render;
mod search;
mod segmenter;
mod types;

pub use config::{
    AssetFormat, EmoteConfig, DEFAULT_API_BASE_URL, DEFAULT_EMOTE_SET_ID, MAX_DISPLAY_SIZE,
    MIN_DISPLAY_SIZE,
};
pub use dictionary::{BuildReport, DictionaryBuilder, EmoteDictionary};
pub use error::{EmoteError, Result};
pub use matcher::{CompiledMatcher, RawMatch, RawMatches};
pub use render::{
    render, EmoteLinks, HoverPreview, HtmlSink, PlainTextSink, RenderOptions, RenderSink,
};
pub use search::PREFIX_BUCKET_LEN;
pub use segmenter::{reassemble, segment, EmoteRef, Segment};
pub use types::{EmoteRecord, MatchPolicy, RawEmoteEntry};
