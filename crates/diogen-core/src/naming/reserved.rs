use std::collections::BTreeSet;
use std::sync::Arc;

use crate::error::ResolveError;

const DART_TABLE: &str = include_str!("dart-keywords.txt");

/// Identifiers that may not be emitted verbatim in the target language.
///
/// Entries are stored lower-cased; lookups lower-case the candidate, so a
/// model called `String` hits the `string` entry just like a field called
/// `string` does. The table is built once and shared read-only between
/// runs through an [`Arc`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReservedWords {
    words: BTreeSet<String>,
}

impl ReservedWords {
    /// Smallest table size accepted. A smaller table almost always means
    /// the list failed to load.
    pub const MIN_ENTRIES: usize = 20;

    pub fn from_list<I, S>(words: I) -> Result<Self, ResolveError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let words: BTreeSet<String> = words
            .into_iter()
            .map(|w| w.as_ref().trim().to_lowercase())
            .filter(|w| !w.is_empty())
            .collect();
        if words.len() <= Self::MIN_ENTRIES {
            return Err(ResolveError::ReservedWordTable {
                found: words.len(),
                floor: Self::MIN_ENTRIES,
            });
        }
        Ok(Self { words })
    }

    /// Parse a table with one word per line. Blank lines and `#` comments
    /// are skipped.
    pub fn from_text(text: &str) -> Result<Self, ResolveError> {
        Self::from_list(
            text.lines()
                .map(str::trim)
                .filter(|line| !line.is_empty() && !line.starts_with('#')),
        )
    }

    /// The embedded Dart table.
    pub fn dart() -> Result<Arc<Self>, ResolveError> {
        Self::from_text(DART_TABLE).map(Arc::new)
    }

    pub fn contains(&self, ident: &str) -> bool {
        self.words.contains(&ident.to_lowercase())
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.words.iter().map(String::as_str)
    }
}
