//! Profanity classification engine.
//!
//! A deterministic, dictionary-driven substring matcher. Words are grouped
//! per language and per severity tier; a [`Filter`] built with a minimum
//! severity flags any message that contains a word from that tier or a
//! stricter one.
//!
//! # Architecture
//!
//! - `severity`: Ordered `Severity` enum (`Mild < Moderate < Severe`)
//! - `database`: JSON-backed mapping of language to tiered word lists
//! - `filter`: Immutable classifier with per-language word caches
//!
//! # Example
//!
//! ```rust,ignore
//! use livechat_moderator::profanity::{Filter, Severity};
//!
//! let filter = Filter::from_file("data/profanity.json", Severity::Moderate)?;
//! if filter.contains_profanity("some chat message") {
//!     // delete / warn
//! }
//! ```

mod database;
mod filter;
mod severity;

pub use database::{LanguageWordSet, ProfanityDatabase};
pub use filter::{Filter, ProfanityMatch};
pub use severity::Severity;

use std::path::PathBuf;

/// Errors raised while loading a profanity database or parsing a threshold.
///
/// Classification itself never fails; these only surface at startup.
#[derive(Debug, thiserror::Error)]
pub enum ProfanityError {
    #[error("Failed to read profanity database {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse profanity database: {0}")]
    DatabaseLoad(#[from] serde_json::Error),

    #[error("Unknown severity '{0}' (expected mild, moderate or severe)")]
    UnknownSeverity(String),
}
