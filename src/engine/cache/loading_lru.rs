use super::cache_stats::{CacheOutcome, CacheStats};
use lru::LruCache;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::hash::Hash;
use std::num::NonZeroUsize;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

pub type EvictionListener<K, V> = Box<dyn Fn(&K, &V) + Send + Sync>;

/// Bounded LRU whose misses are filled by a caller-supplied loader.
///
/// Loads for the same key are single-flight: concurrent misses queue on a
/// per-key lock and all but the first observe the loaded value as a hit.
/// Every value that leaves the cache (capacity eviction, invalidation,
/// reload, clear) is passed to the eviction listener after the cache lock
/// has been released.
pub struct LoadingLru<K, V> {
    inner: Mutex<LruCache<K, V>>,
    inflight: Mutex<HashMap<K, Arc<Mutex<()>>>>,
    on_evict: Option<EvictionListener<K, V>>,
    hits: AtomicU64,
    misses: AtomicU64,
    reloads: AtomicU64,
    evictions: AtomicU64,
}

/// Per-key loader lock, registered in the inflight table for as long as
/// anyone holds or waits on it. Whoever drops the last outside reference
/// removes the table entry; waiters keep it alive, so a caller arriving while
/// a load is queued or running always joins the same lock.
struct InflightGuard<'a, K: Hash + Eq> {
    inflight: &'a Mutex<HashMap<K, Arc<Mutex<()>>>>,
    key: &'a K,
    lock: Arc<Mutex<()>>,
}

impl<'a, K: Hash + Eq + Clone> InflightGuard<'a, K> {
    fn acquire(inflight: &'a Mutex<HashMap<K, Arc<Mutex<()>>>>, key: &'a K) -> Self {
        let lock = Arc::clone(inflight.lock().entry(key.clone()).or_default());
        Self {
            inflight,
            key,
            lock,
        }
    }
}

impl<K: Hash + Eq> Drop for InflightGuard<'_, K> {
    fn drop(&mut self) {
        let mut map = self.inflight.lock();
        // Two references left: the table's and ours. Clones are only taken
        // under the table lock, so nobody can join between check and remove.
        if map
            .get(self.key)
            .is_some_and(|current| Arc::ptr_eq(current, &self.lock))
            && Arc::strong_count(&self.lock) == 2
        {
            map.remove(self.key);
        }
    }
}

impl<K, V> LoadingLru<K, V>
where
    K: Hash + Eq + Clone,
    V: Clone,
{
    pub fn new(capacity: usize) -> Self {
        let cap = NonZeroUsize::new(capacity.max(1)).unwrap_or(NonZeroUsize::MIN);
        Self {
            inner: Mutex::new(LruCache::new(cap)),
            inflight: Mutex::new(HashMap::new()),
            on_evict: None,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            reloads: AtomicU64::new(0),
            evictions: AtomicU64::new(0),
        }
    }

    pub fn with_eviction_listener(mut self, listener: impl Fn(&K, &V) + Send + Sync + 'static) -> Self {
        self.on_evict = Some(Box::new(listener));
        self
    }

    pub fn capacity(&self) -> usize {
        self.inner.lock().cap().get()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, key: &K) -> bool {
        self.inner.lock().contains(key)
    }

    /// Keys from most to least recently used.
    pub fn keys(&self) -> Vec<K> {
        self.inner.lock().iter().map(|(k, _)| k.clone()).collect()
    }

    /// Returns the cached value and marks it most recently used.
    pub fn get(&self, key: &K) -> Option<V> {
        let value = self.inner.lock().get(key).cloned();
        if value.is_some() {
            self.hits.fetch_add(1, Ordering::Relaxed);
        }
        value
    }

    pub fn get_or_load<E, F>(&self, key: &K, load: F) -> Result<(V, CacheOutcome), E>
    where
        F: FnOnce() -> Result<V, E>,
    {
        if let Some(value) = self.get(key) {
            return Ok((value, CacheOutcome::Hit));
        }

        let inflight = InflightGuard::acquire(&self.inflight, key);
        let _loading = inflight.lock.lock();

        if let Some(value) = self.get(key) {
            return Ok((value, CacheOutcome::Hit));
        }

        let value = load()?;
        self.misses.fetch_add(1, Ordering::Relaxed);
        self.insert(key.clone(), value.clone());
        Ok((value, CacheOutcome::Miss))
    }

    /// Replaces the entry for `key` with a freshly loaded value. The old value
    /// is evicted before the loader runs; if the loader fails the key is left
    /// absent.
    pub fn reload<E, F>(&self, key: &K, load: F) -> Result<(V, CacheOutcome), E>
    where
        F: FnOnce() -> Result<V, E>,
    {
        let inflight = InflightGuard::acquire(&self.inflight, key);
        let _loading = inflight.lock.lock();

        self.invalidate(key);
        let value = load()?;
        self.reloads.fetch_add(1, Ordering::Relaxed);
        self.insert(key.clone(), value.clone());
        Ok((value, CacheOutcome::Reload))
    }

    pub fn invalidate(&self, key: &K) -> Option<V> {
        let removed = self.inner.lock().pop(key);
        if let Some(value) = removed.as_ref() {
            self.notify(key, value);
        }
        removed
    }

    pub fn clear(&self) {
        let drained: Vec<(K, V)> = {
            let mut guard = self.inner.lock();
            let mut drained = Vec::with_capacity(guard.len());
            while let Some(entry) = guard.pop_lru() {
                drained.push(entry);
            }
            drained
        };
        for (key, value) in &drained {
            self.notify(key, value);
        }
    }

    pub fn stats(&self) -> CacheStats {
        let (len, capacity) = {
            let guard = self.inner.lock();
            (guard.len(), guard.cap().get())
        };
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            reloads: self.reloads.load(Ordering::Relaxed),
            evictions: self.evictions.load(Ordering::Relaxed),
            len,
            capacity,
        }
    }

    /// Makes room first: the least recently used entry is taken out and
    /// handed to the listener before the new value occupies a slot.
    fn insert(&self, key: K, value: V) {
        loop {
            let evicted = {
                let mut guard = self.inner.lock();
                if guard.contains(&key) || guard.len() < guard.cap().get() {
                    let replaced = guard.push(key.clone(), value);
                    drop(guard);
                    if let Some((old_key, old_value)) = replaced {
                        self.notify(&old_key, &old_value);
                    }
                    return;
                }
                guard.pop_lru()
            };
            if let Some((old_key, old_value)) = evicted {
                self.evictions.fetch_add(1, Ordering::Relaxed);
                self.notify(&old_key, &old_value);
            }
        }
    }

    fn notify(&self, key: &K, value: &V) {
        if let Some(listener) = self.on_evict.as_ref() {
            listener(key, value);
        }
    }
}
