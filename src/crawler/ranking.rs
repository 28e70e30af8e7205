//! Occurrence counting and top-N ranking of script libraries

use crate::crawler::page::ResourcePage;
use indexmap::IndexMap;
use std::fmt;
use std::hash::{Hash, Hasher};

/// Occurrence count per library URL, in first-seen order
///
/// Every reference counts, including repeated references on the same page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AggregateCount {
    counts: IndexMap<String, u64>,
}

impl AggregateCount {
    pub fn new() -> Self {
        Self::default()
    }

    /// Folds the references of all pages, in page order, into one count
    pub fn from_pages<'a, I>(pages: I) -> Self
    where
        I: IntoIterator<Item = &'a ResourcePage>,
    {
        let mut aggregate = Self::new();
        for page in pages {
            for library in page.iter() {
                aggregate.record(library);
            }
        }
        aggregate
    }

    /// Counts one more reference to `library`
    pub fn record(&mut self, library: &str) {
        self.add(library, 1);
    }

    fn add(&mut self, library: &str, occurrences: u64) {
        match self.counts.get_mut(library) {
            Some(count) => *count += occurrences,
            None => {
                self.counts.insert(library.to_string(), occurrences);
            }
        }
    }

    pub fn get(&self, library: &str) -> u64 {
        self.counts.get(library).copied().unwrap_or(0)
    }

    /// Number of distinct libraries
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Total number of references counted
    pub fn total(&self) -> u64 {
        self.counts.values().sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.counts.iter().map(|(library, count)| (library.as_str(), *count))
    }
}

impl<S: AsRef<str>> FromIterator<(S, u64)> for AggregateCount {
    fn from_iter<I: IntoIterator<Item = (S, u64)>>(iter: I) -> Self {
        let mut aggregate = Self::new();
        for (library, occurrences) in iter {
            aggregate.add(library.as_ref(), occurrences);
        }
        aggregate
    }
}

/// A library and the number of times it was referenced
///
/// Equality and hashing consider the library only, so a set of entries holds
/// at most one count per library. Update a set with `HashSet::replace` to
/// keep the latest count; `insert` keeps the existing one.
#[derive(Debug, Clone)]
pub struct RankedEntry {
    pub library: String,
    pub occurrences: u64,
}

impl RankedEntry {
    pub fn new(library: impl Into<String>, occurrences: u64) -> Self {
        Self {
            library: library.into(),
            occurrences,
        }
    }
}

impl PartialEq for RankedEntry {
    fn eq(&self, other: &Self) -> bool {
        self.library == other.library
    }
}

impl Eq for RankedEntry {}

impl Hash for RankedEntry {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.library.hash(state);
    }
}

impl fmt::Display for RankedEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.library, self.occurrences)
    }
}

/// Returns the `limit` most referenced libraries, most referenced first
///
/// Ties keep the order in which the libraries were first seen.
pub fn rank(counts: &AggregateCount, limit: usize) -> Vec<RankedEntry> {
    let entries: Vec<RankedEntry> = counts
        .iter()
        .map(|(library, occurrences)| RankedEntry::new(library, occurrences))
        .collect();

    top(entries, limit)
}

/// Re-applies the ranking order and limit to an existing sequence
pub fn rerank(entries: &[RankedEntry], limit: usize) -> Vec<RankedEntry> {
    top(entries.to_vec(), limit)
}

fn top(mut entries: Vec<RankedEntry>, limit: usize) -> Vec<RankedEntry> {
    // sort_by is stable
    entries.sort_by(|a, b| b.occurrences.cmp(&a.occurrences));
    entries.truncate(limit);
    entries
}
