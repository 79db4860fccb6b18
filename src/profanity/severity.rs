//! Severity tiers for profanity words.

use super::ProfanityError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How offensive a word is.
///
/// The derived ordering is the strictness order: `Mild < Moderate < Severe`.
/// A filter configured with a minimum severity checks every tier `>=` it,
/// so a lower threshold always covers at least the words of a higher one.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    #[default]
    Mild,
    Moderate,
    Severe,
}

impl Severity {
    /// All tiers, from least to most severe.
    pub const ALL: [Severity; 3] = [Severity::Mild, Severity::Moderate, Severity::Severe];

    /// The lowercase name used in config files and the database JSON.
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Mild => "mild",
            Severity::Moderate => "moderate",
            Severity::Severe => "severe",
        }
    }

    /// Tiers checked when `self` is the minimum severity, least severe first.
    pub fn at_or_above(self) -> impl Iterator<Item = Severity> {
        Self::ALL.into_iter().filter(move |tier| *tier >= self)
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Severity {
    type Err = ProfanityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "mild" => Ok(Severity::Mild),
            "moderate" => Ok(Severity::Moderate),
            "severe" => Ok(Severity::Severe),
            _ => Err(ProfanityError::UnknownSeverity(s.to_string())),
        }
    }
}
