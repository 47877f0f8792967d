//! # Emote Source
//!
//! Where emote sets come from. The core only consumes already-parsed
//! [`RawEmoteEntry`](emote_core::RawEmoteEntry) lists; this crate produces them.
//!
//! - [`SevenTvSource`] - `GET <api>/emote-sets/<id>` over HTTPS
//! - [`FileSource`] - a saved response body on disk
//! - [`StaticSource`] - fixed in-memory entries

mod error;
mod payload;
mod source;

pub use error::{Result, SourceError};
pub use payload::parse_emote_set;
pub use source::{DictionarySource, FileSource, SevenTvSource, StaticSource};
