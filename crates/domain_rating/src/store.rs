//! Shared table snapshot with copy-on-write replacement

use std::sync::{Arc, RwLock};
use tracing::info;

use crate::tables::ReferenceTables;

/// Holds the current [`ReferenceTables`] snapshot
///
/// Readers clone the `Arc` and keep using that snapshot for the rest of
/// their rating, so a concurrent [`TableStore::replace`] never changes
/// tables underneath an in-flight request.
#[derive(Debug)]
pub struct TableStore {
    current: RwLock<Arc<ReferenceTables>>,
}

impl TableStore {
    pub fn new(tables: ReferenceTables) -> Self {
        Self {
            current: RwLock::new(Arc::new(tables)),
        }
    }

    /// Returns the current snapshot
    pub fn snapshot(&self) -> Arc<ReferenceTables> {
        // A poisoned lock still holds a complete snapshot: writers only swap an Arc
        let guard = self.current.read().unwrap_or_else(|poisoned| poisoned.into_inner());
        Arc::clone(&*guard)
    }

    /// Installs a new snapshot and returns the one it replaced
    pub fn replace(&self, tables: ReferenceTables) -> Arc<ReferenceTables> {
        let next = Arc::new(tables);
        let summary = next.summary();

        let mut guard = self.current.write().unwrap_or_else(|poisoned| poisoned.into_inner());
        let previous = std::mem::replace(&mut *guard, next);
        drop(guard);

        info!(
            previous = %previous.id(),
            current = %summary.snapshot_id,
            occupations = summary.occupations,
            occupational_buckets = summary.occupational_buckets,
            age_buckets = summary.age_buckets,
            "Reference tables replaced"
        );
        previous
    }
}
