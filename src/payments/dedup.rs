//! Process-lifetime record of transaction ids already relayed.

use dashmap::DashSet;

use crate::observability::metrics;

/// Set of transaction ids that have been forwarded.
///
/// Membership is permanent for the life of the store. `insert_if_new` is the
/// only way in and must be a single atomic check-and-insert so that two
/// concurrent passes can never both forward the same id.
pub trait DedupStore: Send + Sync {
    /// Insert `id`; returns `true` only for the caller that inserted it.
    fn insert_if_new(&self, id: &str) -> bool;

    /// Whether `id` has already been forwarded.
    fn contains(&self, id: &str) -> bool;

    /// Number of ids held.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// In-memory store backed by a sharded concurrent set. Never evicts.
#[derive(Debug, Default)]
pub struct InMemoryDedupStore {
    seen: DashSet<String>,
}

impl InMemoryDedupStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DedupStore for InMemoryDedupStore {
    fn insert_if_new(&self, id: &str) -> bool {
        // DashSet::insert locks the shard for the check and the write.
        let inserted = self.seen.insert(id.to_string());
        if inserted {
            metrics::record_dedup_size(self.seen.len());
        }
        inserted
    }

    fn contains(&self, id: &str) -> bool {
        self.seen.contains(id)
    }

    fn len(&self) -> usize {
        self.seen.len()
    }
}
