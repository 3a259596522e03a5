//! Fixed-capacity LRU store
//!
//! Entries live in a `HashMap`; recency is a `BTreeMap` from a monotonically
//! increasing access tick to the key, so the least recently used entry is
//! always the first one of the tree. Both maps sit behind one `Mutex`, which
//! makes eviction and insertion a single atomic step.
//!
//! `clear` advances a generation counter. A value computed on a miss is only
//! stored if no clear happened while it was being computed.

use bundlescope_api::{CacheManager, CacheStats};
use std::borrow::Borrow;
use std::collections::{BTreeMap, HashMap};
use std::hash::Hash;
use std::num::NonZeroUsize;
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::trace;

struct Slot<V> {
    value: V,
    tick: u64,
}

struct LruState<K, V> {
    entries: HashMap<K, Slot<V>>,
    recency: BTreeMap<u64, K>,
    next_tick: u64,
    generation: u64,
    hits: u64,
    misses: u64,
    evictions: u64,
}

impl<K: Eq + Hash + Clone, V> LruState<K, V> {
    fn new() -> Self {
        Self {
            entries: HashMap::new(),
            recency: BTreeMap::new(),
            next_tick: 0,
            generation: 0,
            hits: 0,
            misses: 0,
            evictions: 0,
        }
    }

    fn bump(&mut self) -> u64 {
        let tick = self.next_tick;
        self.next_tick += 1;
        tick
    }

    /// Mark the entry most recently used
    fn touch<Q>(&mut self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let tick = self.bump();
        let slot = self.entries.get_mut(key)?;
        let old = std::mem::replace(&mut slot.tick, tick);
        if let Some(owned) = self.recency.remove(&old) {
            self.recency.insert(tick, owned);
        }
        Some(&slot.value)
    }

    fn evict_lru(&mut self) -> Option<K> {
        let (_, key) = self.recency.pop_first()?;
        self.entries.remove(&key);
        self.evictions += 1;
        Some(key)
    }
}

/// Thread-safe bounded cache with least-recently-used eviction.
///
/// Both `get` and `put` count as an access. Values are handed out as clones,
/// so large values should be wrapped in `Arc`.
pub struct BoundedLruStore<K, V> {
    name: String,
    capacity: NonZeroUsize,
    state: Mutex<LruState<K, V>>,
}

impl<K, V> BoundedLruStore<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    pub fn new(name: impl Into<String>, capacity: NonZeroUsize) -> Self {
        Self {
            name: name.into(),
            capacity,
            state: Mutex::new(LruState::new()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, LruState<K, V>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn capacity(&self) -> usize {
        self.capacity.get()
    }

    pub fn get<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.lookup(key).0
    }

    /// Counted lookup together with the generation it was made in
    fn lookup<Q>(&self, key: &Q) -> (Option<V>, u64)
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let mut state = self.lock();
        let generation = state.generation;
        match state.touch(key).cloned() {
            Some(value) => {
                state.hits += 1;
                (Some(value), generation)
            }
            None => {
                state.misses += 1;
                (None, generation)
            }
        }
    }

    /// Insert or replace. A new key at capacity evicts the least recently
    /// used entry first.
    pub fn put(&self, key: K, value: V) {
        let mut guard = self.lock();
        self.insert_locked(&mut guard, key, value);
    }

    fn insert_locked(&self, state: &mut LruState<K, V>, key: K, value: V) {
        let tick = state.bump();

        if let Some(slot) = state.entries.get_mut(&key) {
            let old = std::mem::replace(&mut slot.tick, tick);
            slot.value = value;
            state.recency.remove(&old);
            state.recency.insert(tick, key);
            return;
        }

        if state.entries.len() >= self.capacity.get() && state.evict_lru().is_some() {
            trace!("{}: evicted least recently used entry", self.name);
        }

        state.recency.insert(tick, key.clone());
        state.entries.insert(key, Slot { value, tick });
    }

    /// Look up `key`, computing and storing the value on a miss.
    ///
    /// `init` runs without the lock held; errors are returned as-is and
    /// nothing is cached. A value computed across a `clear` is returned to
    /// the caller but not stored.
    pub fn get_or_try_insert_with<E>(
        &self,
        key: K,
        init: impl FnOnce() -> Result<V, E>,
    ) -> Result<V, E> {
        let (cached, generation) = self.lookup(&key);
        if let Some(value) = cached {
            return Ok(value);
        }
        let value = init()?;

        let mut guard = self.lock();
        if guard.generation == generation {
            self.insert_locked(&mut guard, key, value.clone());
        } else {
            trace!("{}: cleared during computation, not caching", self.name);
        }
        Ok(value)
    }

    pub fn remove<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let mut state = self.lock();
        let slot = state.entries.remove(key)?;
        state.recency.remove(&slot.tick);
        Some(slot.value)
    }

    /// Presence check that does not count as an access
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.lock().entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        let mut state = self.lock();
        state.entries.clear();
        state.recency.clear();
        state.generation += 1;
    }

    /// Keys from least to most recently used
    pub fn keys_by_recency(&self) -> Vec<K> {
        self.lock().recency.values().cloned().collect()
    }

    pub fn stats(&self) -> CacheStats {
        let state = self.lock();
        CacheStats {
            name: self.name.clone(),
            capacity: self.capacity.get(),
            entries: state.entries.len(),
            hits: state.hits,
            misses: state.misses,
            evictions: state.evictions,
        }
    }
}

impl<K, V> CacheManager for BoundedLruStore<K, V>
where
    K: Eq + Hash + Clone + Send,
    V: Clone + Send,
{
    fn stats(&self) -> CacheStats {
        BoundedLruStore::stats(self)
    }

    fn clear(&self) {
        BoundedLruStore::clear(self)
    }
}
