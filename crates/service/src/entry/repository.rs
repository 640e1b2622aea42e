use async_trait::async_trait;
use rust_decimal::Decimal;

use super::domain::{Entry, EntryFilter, EntryKind, EntryStatus};
use super::errors::EntryError;

/// Storage port for entries.
#[async_trait]
pub trait EntryRepository: Send + Sync {
    async fn find_by_id(&self, id: i64) -> Result<Option<Entry>, EntryError>;
    /// All entries matching `filter`, ordered by id.
    async fn find_all(&self, filter: &EntryFilter) -> Result<Vec<Entry>, EntryError>;
    /// Insert when `entry.id` is `None` (assigning id and registration date),
    /// otherwise overwrite the row with that id.
    async fn save(&self, entry: Entry) -> Result<Entry, EntryError>;
    async fn delete(&self, id: i64) -> Result<(), EntryError>;
    /// Sum of `value` over one user's entries of the given kind and status.
    async fn sum_values(&self, user_id: i64, kind: EntryKind, status: EntryStatus) -> Result<Decimal, EntryError>;
}

/// Simple in-memory mock repository for tests and doc examples
pub mod mock {
    use super::*;
    use std::collections::BTreeMap;
    use std::sync::atomic::{AtomicI64, AtomicUsize, Ordering};
    use std::sync::{Mutex, MutexGuard};

    use chrono::Utc;

    /// Keeps entries in id order and counts writes so tests can assert on
    /// which storage calls a service made.
    #[derive(Default)]
    pub struct MockEntryRepository {
        entries: Mutex<BTreeMap<i64, Entry>>, // key: entry id
        last_id: AtomicI64,
        saves: AtomicUsize,
        deletes: AtomicUsize,
    }

    impl MockEntryRepository {
        /// Store an entry directly, bypassing `save` bookkeeping.
        pub fn seed(&self, entry: Entry) -> Entry {
            let stored = self.assign(entry);
            if let Ok(mut entries) = self.entries.lock() {
                entries.insert(stored.id.unwrap_or_default(), stored.clone());
            }
            stored
        }

        pub fn save_calls(&self) -> usize { self.saves.load(Ordering::SeqCst) }

        pub fn delete_calls(&self) -> usize { self.deletes.load(Ordering::SeqCst) }

        fn assign(&self, mut entry: Entry) -> Entry {
            let id = entry.id.unwrap_or_else(|| self.last_id.fetch_add(1, Ordering::SeqCst) + 1);
            self.last_id.fetch_max(id, Ordering::SeqCst);
            entry.id = Some(id);
            entry.registered_at.get_or_insert_with(|| Utc::now().date_naive());
            entry
        }

        fn lock(&self) -> Result<MutexGuard<'_, BTreeMap<i64, Entry>>, EntryError> {
            self.entries.lock().map_err(|_| EntryError::Repository("entry store poisoned".into()))
        }
    }

    #[async_trait]
    impl EntryRepository for MockEntryRepository {
        async fn find_by_id(&self, id: i64) -> Result<Option<Entry>, EntryError> {
            Ok(self.lock()?.get(&id).cloned())
        }

        async fn find_all(&self, filter: &EntryFilter) -> Result<Vec<Entry>, EntryError> {
            Ok(self.lock()?.values().filter(|e| filter.matches(e)).cloned().collect())
        }

        async fn save(&self, entry: Entry) -> Result<Entry, EntryError> {
            self.saves.fetch_add(1, Ordering::SeqCst);
            let stored = self.assign(entry);
            self.lock()?.insert(stored.id.unwrap_or_default(), stored.clone());
            Ok(stored)
        }

        async fn delete(&self, id: i64) -> Result<(), EntryError> {
            self.deletes.fetch_add(1, Ordering::SeqCst);
            self.lock()?.remove(&id);
            Ok(())
        }

        async fn sum_values(&self, user_id: i64, kind: EntryKind, status: EntryStatus) -> Result<Decimal, EntryError> {
            let filter = EntryFilter { user_id: Some(user_id), kind: Some(kind), status: Some(status), ..Default::default() };
            Ok(self
                .lock()?
                .values()
                .filter(|e| filter.matches(e))
                .filter_map(|e| e.value)
                .sum())
        }
    }
}
