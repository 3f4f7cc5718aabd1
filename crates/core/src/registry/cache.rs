//! Resolution cache shared by the builder and trait registries

use parking_lot::{Mutex, RwLock};
use std::collections::HashMap;
use std::hash::Hash;
use std::sync::atomic::{AtomicU64, Ordering};

/// A map that is filled lazily and never evicts.
///
/// Lookups take a read lock. Population is serialized so two threads that
/// miss on the same key run the populate step once.
#[derive(Debug)]
pub(crate) struct ResolutionCache<K, V> {
    entries: RwLock<HashMap<K, V>>,
    /// Guards population and, per key, the generation its last failure ended at
    populate: Mutex<HashMap<K, u64>>,
    /// Bumped every time a populate step fails
    failures: AtomicU64,
}

/// Why [`ResolutionCache::get_or_try_populate`] produced no value
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum PopulateError<E> {
    /// This call ran the populate step and it failed
    Failed(E),
    /// The call arrived while another call's populate step for the same
    /// key was running, and that step failed. The failure belongs to the
    /// other call.
    Joined,
}

impl<K, V> Default for ResolutionCache<K, V> {
    fn default() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            populate: Mutex::new(HashMap::new()),
            failures: AtomicU64::new(0),
        }
    }
}

impl<K: Eq + Hash + Clone, V: Clone> ResolutionCache<K, V> {
    pub(crate) fn get(&self, key: &K) -> Option<V> {
        self.entries.read().get(key).cloned()
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Returns the cached value, or runs `populate` and caches its result
    pub(crate) fn get_or_populate(&self, key: &K, populate: impl FnOnce() -> V) -> V {
        if let Some(value) = self.get(key) {
            return value;
        }

        let _guard = self.populate.lock();
        if let Some(value) = self.get(key) {
            return value;
        }

        let value = populate();
        self.entries.write().insert(key.clone(), value.clone());
        value
    }

    /// Like [`get_or_populate`](Self::get_or_populate) but failures are not
    /// cached. Calls that were already waiting on a failing populate step
    /// get [`PopulateError::Joined`] instead of repeating it; calls made
    /// after the failure try again.
    pub(crate) fn get_or_try_populate<E>(
        &self,
        key: &K,
        populate: impl FnOnce() -> Result<V, E>,
    ) -> Result<V, PopulateError<E>> {
        let observed = self.failures.load(Ordering::SeqCst);
        if let Some(value) = self.get(key) {
            return Ok(value);
        }

        let mut failed_at = self.populate.lock();
        if let Some(value) = self.get(key) {
            return Ok(value);
        }
        if failed_at.get(key).is_some_and(|&generation| generation > observed) {
            return Err(PopulateError::Joined);
        }

        match populate() {
            Ok(value) => {
                failed_at.remove(key);
                self.entries.write().insert(key.clone(), value.clone());
                Ok(value)
            }
            Err(err) => {
                let generation = self.failures.fetch_add(1, Ordering::SeqCst) + 1;
                failed_at.insert(key.clone(), generation);
                Err(PopulateError::Failed(err))
            }
        }
    }
}
