//! Material synonym table
//!
//! Maps a canonical keyword (as it appears in tile names/hints) to the
//! alternate terms a user might type instead.

use crate::command::normalize::normalize;
use serde::{Deserialize, Serialize};

/// One canonical keyword and its alternates
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SynonymEntry {
    pub canonical: String,
    #[serde(default)]
    pub alternates: Vec<String>,
}

impl SynonymEntry {
    pub fn new(canonical: &str, alternates: &[&str]) -> Self {
        Self {
            canonical: canonical.to_string(),
            alternates: alternates.iter().map(|a| a.to_string()).collect(),
        }
    }
}

/// Ordered, read-only synonym table
#[derive(Debug, Clone, PartialEq)]
pub struct SynonymTable {
    entries: Vec<SynonymEntry>,
}

impl Default for SynonymTable {
    fn default() -> Self {
        Self::from_entries(vec![
            SynonymEntry::new("marble", &["calacatta", "carrara"]),
            SynonymEntry::new("wood", &["oak", "porcelain"]),
            SynonymEntry::new("stone", &["terrazzo", "concrete", "granite"]),
        ])
    }
}

impl SynonymTable {
    /// Build a table; keywords and alternates are normalized so lookups
    /// compare against normalized user words.
    pub fn from_entries(entries: Vec<SynonymEntry>) -> Self {
        let entries = entries
            .into_iter()
            .map(|e| SynonymEntry {
                canonical: normalize(&e.canonical),
                alternates: e.alternates.iter().map(|a| normalize(a)).collect(),
            })
            .filter(|e| !e.canonical.is_empty())
            .collect();
        Self { entries }
    }

    pub fn empty() -> Self {
        Self { entries: Vec::new() }
    }

    /// Canonical keywords that list `word` as an alternate, in table order
    pub fn canonicals_for<'a>(&'a self, word: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.entries
            .iter()
            .filter(move |e| e.alternates.iter().any(|a| a == word))
            .map(|e| e.canonical.as_str())
    }

    pub fn entries(&self) -> &[SynonymEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
