//! JSON-backed profanity word lists.

use super::{ProfanityError, Severity};
use serde::{Deserialize, Deserializer};
use std::collections::BTreeMap;
use std::path::Path;

/// Word lists for one language, split by severity tier.
///
/// Missing or `null` tiers deserialize to empty lists. A word is expected to
/// appear in a single tier, but duplicates are harmless: the filter unions
/// the tiers it checks.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct LanguageWordSet {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub mild: Vec<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub moderate: Vec<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub severe: Vec<String>,
}

impl LanguageWordSet {
    /// Words listed under exactly this tier.
    pub fn words(&self, severity: Severity) -> &[String] {
        match severity {
            Severity::Mild => &self.mild,
            Severity::Moderate => &self.moderate,
            Severity::Severe => &self.severe,
        }
    }

    /// Words of every tier at or above `min_severity`, least severe tier first.
    pub fn words_at_or_above(&self, min_severity: Severity) -> impl Iterator<Item = &str> + '_ {
        min_severity
            .at_or_above()
            .flat_map(move |tier| self.words(tier).iter().map(String::as_str))
    }

    pub fn len(&self) -> usize {
        self.mild.len() + self.moderate.len() + self.severe.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<String>>::deserialize(deserializer)?.unwrap_or_default())
}

/// Mapping from language key (e.g. `"english"`) to its tiered word lists.
///
/// The file format is:
///
/// ```json
/// { "english": { "mild": ["..."], "moderate": ["..."], "severe": ["..."] } }
/// ```
///
/// Languages are an open set of keys and iterate in key order, which keeps
/// classification deterministic. The database is immutable once loaded.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(from = "BTreeMap<String, Option<LanguageWordSet>>")]
pub struct ProfanityDatabase {
    languages: BTreeMap<String, LanguageWordSet>,
}

impl From<BTreeMap<String, Option<LanguageWordSet>>> for ProfanityDatabase {
    fn from(raw: BTreeMap<String, Option<LanguageWordSet>>) -> Self {
        Self {
            languages: raw
                .into_iter()
                .map(|(language, words)| (language, words.unwrap_or_default()))
                .collect(),
        }
    }
}

impl FromIterator<(String, LanguageWordSet)> for ProfanityDatabase {
    fn from_iter<I: IntoIterator<Item = (String, LanguageWordSet)>>(iter: I) -> Self {
        Self {
            languages: iter.into_iter().collect(),
        }
    }
}

impl ProfanityDatabase {
    /// Parse a database from raw JSON bytes.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, ProfanityError> {
        Ok(serde_json::from_slice(bytes)?)
    }

    /// Read and parse a database file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ProfanityError> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|source| ProfanityError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_slice(&bytes)
    }

    /// Languages with their word sets, in key order.
    pub fn languages(&self) -> impl Iterator<Item = (&str, &LanguageWordSet)> {
        self.languages
            .iter()
            .map(|(language, words)| (language.as_str(), words))
    }

    pub fn get(&self, language: &str) -> Option<&LanguageWordSet> {
        self.languages.get(language)
    }

    pub fn language_count(&self) -> usize {
        self.languages.len()
    }

    /// Total number of words across all languages and tiers.
    pub fn word_count(&self) -> usize {
        self.languages.values().map(LanguageWordSet::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.word_count() == 0
    }
}
