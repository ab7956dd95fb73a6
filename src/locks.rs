//! Per-key mutual exclusion.
//!
//! Collapses concurrent work on the same key into one in-flight execution:
//! the first caller runs, later callers queue on the same mutex and run
//! afterwards (by which time the cache is usually warm).

use dashmap::DashMap;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Registry of lazily created per-key locks.
#[derive(Clone, Debug, Default)]
pub struct KeyedLocks {
    locks: Arc<DashMap<String, Arc<Mutex<()>>>>,
}

impl KeyedLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `f` while holding the lock for `key`.
    ///
    /// The guard is released on every exit path, including unwinding out of
    /// `f` and dropping this future while it waits. Once no other task holds
    /// or awaits the lock its entry is dropped from the table.
    pub async fn with_lock<F, Fut, T>(&self, key: &str, f: F) -> T
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = T>,
    {
        // entry() holds the shard write lock, so first touch is atomic
        let lock = self
            .locks
            .entry(key.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        let entry = EntryRef {
            locks: self,
            key,
            lock: Some(lock),
        };

        // The handle is only taken on drop, so this always locks
        let _guard = match &entry.lock {
            Some(lock) => Some(lock.lock().await),
            None => None,
        };
        f().await
    }

    /// Number of keys currently tracked.
    pub fn len(&self) -> usize {
        self.locks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locks.is_empty()
    }

    fn release(&self, key: &str) {
        // Only the table's own reference left: nobody holds or waits on it.
        // Cloning a handle also needs the shard lock, so this cannot race.
        self.locks
            .remove_if(key, |_, lock| Arc::strong_count(lock) == 1);
    }
}

/// Handle on a table entry that prunes it when the last user goes away.
struct EntryRef<'a> {
    locks: &'a KeyedLocks,
    key: &'a str,
    lock: Option<Arc<Mutex<()>>>,
}

impl Drop for EntryRef<'_> {
    fn drop(&mut self) {
        drop(self.lock.take());
        self.locks.release(self.key);
    }
}
