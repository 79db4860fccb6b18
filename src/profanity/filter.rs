//! Severity-thresholded substring filter.

use super::{ProfanityDatabase, ProfanityError, Severity};
use std::path::Path;
use std::sync::Arc;

/// The first dictionary hit found in a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfanityMatch<'a> {
    pub language: &'a str,
    pub word: &'a str,
}

/// Effective (lowercased, non-empty) word list for one language.
#[derive(Debug)]
struct LanguageWords {
    language: String,
    words: Vec<String>,
}

/// Classifies messages against a [`ProfanityDatabase`].
///
/// Matching is case-insensitive literal substring containment, so a word
/// also matches inside a longer token ("ass" flags "assassin"). Only tiers
/// at or above the configured minimum severity are checked.
///
/// The per-language word lists are resolved once at construction. After
/// that the filter is read-only and can be shared across tasks through an
/// `Arc` without locking.
#[derive(Debug)]
pub struct Filter {
    database: Arc<ProfanityDatabase>,
    min_severity: Severity,
    cache: Vec<LanguageWords>,
}

impl Filter {
    pub fn new(database: Arc<ProfanityDatabase>, min_severity: Severity) -> Self {
        let cache = database
            .languages()
            .map(|(language, word_set)| LanguageWords {
                language: language.to_string(),
                words: word_set
                    .words_at_or_above(min_severity)
                    // An empty needle would match every message.
                    .filter(|word| !word.is_empty())
                    .map(str::to_lowercase)
                    .collect(),
            })
            .collect();

        Self {
            database,
            min_severity,
            cache,
        }
    }

    /// Load the database at `path` and build a filter over it.
    pub fn from_file(path: impl AsRef<Path>, min_severity: Severity) -> Result<Self, ProfanityError> {
        let database = ProfanityDatabase::from_file(path)?;
        Ok(Self::new(Arc::new(database), min_severity))
    }

    /// Build a filter from raw database JSON.
    pub fn from_slice(bytes: &[u8], min_severity: Severity) -> Result<Self, ProfanityError> {
        let database = ProfanityDatabase::from_slice(bytes)?;
        Ok(Self::new(Arc::new(database), min_severity))
    }

    /// Like [`Filter::from_file`], taking the severity as configured text.
    ///
    /// The severity is parsed before the file is touched, so an unknown
    /// value is reported even when the database is also unreadable.
    pub fn from_file_with_severity_str(
        path: impl AsRef<Path>,
        min_severity: &str,
    ) -> Result<Self, ProfanityError> {
        let min_severity = min_severity.parse()?;
        Self::from_file(path, min_severity)
    }

    /// `true` if the message contains any word at or above the threshold.
    pub fn contains_profanity(&self, message: &str) -> bool {
        self.find_match(message).is_some()
    }

    /// The first (language, word) pair found in `message`, if any.
    ///
    /// Languages are checked in database key order and words in tier order,
    /// so the result is deterministic for a given database.
    pub fn find_match(&self, message: &str) -> Option<ProfanityMatch<'_>> {
        if message.is_empty() {
            return None;
        }

        let message = message.to_lowercase();

        self.cache.iter().find_map(|entry| {
            entry
                .words
                .iter()
                .find(|word| message.contains(word.as_str()))
                .map(|word| ProfanityMatch {
                    language: &entry.language,
                    word,
                })
        })
    }

    pub fn min_severity(&self) -> Severity {
        self.min_severity
    }

    pub fn database(&self) -> &Arc<ProfanityDatabase> {
        &self.database
    }

    /// The words checked for `language`, or `None` for an unknown language.
    pub fn effective_words(&self, language: &str) -> Option<&[String]> {
        self.cache
            .iter()
            .find(|entry| entry.language == language)
            .map(|entry| entry.words.as_slice())
    }

    /// Number of words checked across all languages.
    pub fn effective_word_count(&self) -> usize {
        self.cache.iter().map(|entry| entry.words.len()).sum()
    }
}
