//! Atomically swappable snapshot of the brewery dataset.
//!
//! The store holds the current snapshot behind an [`ArcSwap`]: readers take a
//! cheap `Arc` handle (a single atomic load, never blocking), and the
//! background refresher installs a complete replacement with one atomic
//! pointer swap. Readers in flight keep the snapshot they already hold;
//! readers arriving after the swap see the new one. A mix of old and new
//! entities is impossible because a snapshot is never mutated in place.

use std::collections::HashMap;
use std::sync::Arc;

use arc_swap::ArcSwap;
use chrono::{DateTime, Utc};

use brewdb_core::Brewery;

/// Immutable point-in-time copy of the full dataset.
#[derive(Debug)]
pub struct Snapshot {
    breweries: Vec<Brewery>,
    by_id: HashMap<String, usize>,
    refreshed_at: Option<DateTime<Utc>>,
}

impl Snapshot {
    fn empty() -> Self {
        Self {
            breweries: Vec::new(),
            by_id: HashMap::new(),
            refreshed_at: None,
        }
    }

    fn new(breweries: Vec<Brewery>, refreshed_at: DateTime<Utc>) -> Self {
        let by_id = breweries
            .iter()
            .enumerate()
            .map(|(idx, b)| (b.id.clone(), idx))
            .collect();
        Self {
            breweries,
            by_id,
            refreshed_at: Some(refreshed_at),
        }
    }

    #[must_use]
    pub fn breweries(&self) -> &[Brewery] {
        &self.breweries
    }

    #[must_use]
    pub fn get_by_id(&self, id: &str) -> Option<&Brewery> {
        self.by_id.get(id).map(|&idx| &self.breweries[idx])
    }

    /// Case-insensitive substring match against name and city.
    pub fn search_substring<'a>(&'a self, term: &str) -> impl Iterator<Item = &'a Brewery> {
        let needle = term.to_lowercase();
        self.breweries.iter().filter(move |b| {
            b.name.to_lowercase().contains(&needle) || b.city.to_lowercase().contains(&needle)
        })
    }

    #[must_use]
    pub fn refreshed_at(&self) -> Option<DateTime<Utc>> {
        self.refreshed_at
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.breweries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.breweries.is_empty()
    }
}

/// Shared holder for the live [`Snapshot`].
///
/// Single writer (the refresh loop), any number of concurrent readers.
/// Should two `replace` calls ever race, the store ends up holding exactly
/// one of the attempted snapshots — never a merge.
#[derive(Debug)]
pub struct SnapshotStore {
    inner: ArcSwap<Snapshot>,
}

impl SnapshotStore {
    /// Creates a store holding an empty snapshot with no refresh timestamp.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: ArcSwap::from_pointee(Snapshot::empty()),
        }
    }

    /// Installs a new snapshot built from `breweries`, stamped with the
    /// current time. Never blocks readers.
    pub fn replace(&self, breweries: Vec<Brewery>) {
        self.inner
            .store(Arc::new(Snapshot::new(breweries, Utc::now())));
    }

    /// Returns a handle to the current snapshot. O(1), lock-free.
    #[must_use]
    pub fn current(&self) -> Arc<Snapshot> {
        self.inner.load_full()
    }

    /// Looks up a single brewery by identifier in the current snapshot.
    #[must_use]
    pub fn get_by_id(&self, id: &str) -> Option<Brewery> {
        self.current().get_by_id(id).cloned()
    }

    /// Case-insensitive substring search against name and city in the
    /// current snapshot.
    #[must_use]
    pub fn search_substring(&self, term: &str) -> Vec<Brewery> {
        self.current().search_substring(term).cloned().collect()
    }

    /// Commit time of the last successful refresh, `None` before the first.
    #[must_use]
    pub fn last_refreshed_at(&self) -> Option<DateTime<Utc>> {
        self.current().refreshed_at()
    }
}

impl Default for SnapshotStore {
    fn default() -> Self {
        Self::new()
    }
}
