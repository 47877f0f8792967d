//! # Emote Runtime
//!
//! The single owner of the live emote dictionary.
//!
//! ```text
//! DictionarySource ──fetch──> DictionaryBuilder ──publish──> EmoteStore
//!                                                              │
//!                    segment() / search() / matcher() <────────┘
//! ```
//!
//! Readers always work on one [`DictionarySnapshot`]; a reload swaps the whole
//! snapshot at once and drops every cached matcher.

mod error;
mod store;

pub use error::{Result, RuntimeError};
pub use store::{ConfigChange, DictionarySnapshot, EmoteStore, LoadOutcome, LoadReport};
