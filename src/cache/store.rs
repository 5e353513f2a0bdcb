//! Cache Store Module
//!
//! Main cache engine combining a HashMap index with the recency list and the
//! expiry queue, guarded by a single mutex.

use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use tracing::{debug, trace, warn};

use crate::cache::{CacheEntry, ExpiryQueue, RecencyList, Slot, NO_EXPIRY_TTL};
use crate::tasks::spawn_expiry_worker;

/// Compaction kicks in once cancelled timer records outnumber live ones by this margin.
const COMPACT_SLACK: usize = 64;

// == Cache State ==
/// Everything guarded by the cache lock.
///
/// Operations take `now` explicitly so the state machine is deterministic.
#[derive(Debug)]
pub(crate) struct CacheState<K, V> {
    index: HashMap<K, Slot>,
    order: RecencyList<K, V>,
    timers: ExpiryQueue,
    capacity: usize,
    ttl: Duration,
    /// Set when the last handle is dropped; tells the expiry worker to exit
    pub(crate) shutdown: bool,
}

impl<K, V> CacheState<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    pub(crate) fn new(capacity: usize, ttl: Duration) -> Self {
        let ttl = if ttl.is_zero() { NO_EXPIRY_TTL } else { ttl };
        Self {
            index: HashMap::with_capacity(capacity.min(4096)),
            order: RecencyList::new(),
            timers: ExpiryQueue::new(),
            capacity,
            ttl,
            shutdown: false,
        }
    }

    // == Get ==
    /// Looks up `key`, promoting it to most recently used.
    ///
    /// The entry's timer is left untouched: TTL runs from the last write.
    pub(crate) fn get(&mut self, key: &K, now: Instant) -> Option<V> {
        self.expire_due(now);
        let slot = *self.index.get(key)?;
        self.order.move_to_front(slot);
        self.order.get(slot).map(|entry| entry.value.clone())
    }

    // == Put ==
    /// Inserts or refreshes `key`.
    ///
    /// Returns true when the armed deadline is earlier than anything queued
    /// before, meaning a sleeping expiry worker must be woken.
    pub(crate) fn put(&mut self, key: K, value: V, now: Instant) -> bool {
        self.expire_due(now);
        if self.capacity == 0 {
            trace!("capacity is zero, discarding insert");
            return false;
        }

        let deadline = self.deadline_from(now);
        let wake = self
            .timers
            .next_deadline()
            .map_or(true, |earliest| deadline < earliest);

        if let Some(&slot) = self.index.get(&key) {
            // Refresh: the old timer is retired by the id swap
            let timer = self.timers.arm(slot, deadline);
            if let Some(entry) = self.order.get_mut(slot) {
                entry.refresh(value, timer, deadline);
            }
            self.order.move_to_front(slot);
            self.compact_timers();
            return wake;
        }

        if self.index.len() >= self.capacity {
            self.evict_lru();
        }

        let timer = self.timers.issue();
        let slot = self
            .order
            .push_front(CacheEntry::new(key.clone(), value, timer, deadline));
        self.timers.schedule(timer, slot, deadline);
        self.index.insert(key, slot);
        self.compact_timers();
        wake
    }

    // == Purge All ==
    /// Removes every entry and cancels every outstanding timer.
    pub(crate) fn purge_all(&mut self) -> usize {
        let purged = self.index.len();
        self.index.clear();
        self.order.clear();
        self.timers.clear();
        purged
    }

    // == Expire Due ==
    /// Fires every timer whose deadline has passed at `now`.
    ///
    /// A record only removes the entry still holding its timer id; records
    /// of refreshed or removed entries are dropped as no-ops.
    pub(crate) fn expire_due(&mut self, now: Instant) -> usize {
        let mut expired = 0;
        while let Some((timer, slot)) = self.timers.pop_due(now) {
            let armed = self
                .order
                .get(slot)
                .is_some_and(|entry| entry.timer == timer && entry.is_expired(now));
            if !armed {
                continue;
            }
            if let Some(entry) = self.order.remove(slot) {
                self.index.remove(&entry.key);
                expired += 1;
            }
        }
        expired
    }

    pub(crate) fn contains(&self, key: &K) -> bool {
        self.index.contains_key(key)
    }

    /// Keys from most to least recently used.
    pub(crate) fn keys(&self) -> Vec<K> {
        self.order.iter().map(|entry| entry.key.clone()).collect()
    }

    // == Evict LRU ==
    /// Drops the tail entry. A no-op on an empty cache.
    fn evict_lru(&mut self) -> Option<K> {
        let entry = self.order.pop_back()?;
        self.index.remove(&entry.key);
        debug!(remaining = self.index.len(), "evicted least recently used entry");
        Some(entry.key)
    }

    fn deadline_from(&self, now: Instant) -> Instant {
        now.checked_add(self.ttl)
            .or_else(|| now.checked_add(NO_EXPIRY_TTL))
            .unwrap_or(now)
    }

    /// Rebuilds the timer heap once cancelled records dominate it.
    fn compact_timers(&mut self) {
        if self.timers.len() <= 2 * self.order.len() + COMPACT_SLACK {
            return;
        }
        let order = &self.order;
        self.timers
            .retain(|timer, slot| order.get(slot).is_some_and(|entry| entry.timer == timer));
        trace!(queued = self.timers.len(), "compacted expiry queue");
    }
}

impl<K, V> CacheState<K, V> {
    pub(crate) fn next_deadline(&self) -> Option<Instant> {
        self.timers.next_deadline()
    }

    pub(crate) fn len(&self) -> usize {
        self.index.len()
    }
}

// == Shared ==
/// State plus the condition variable the expiry worker sleeps on.
pub(crate) struct Shared<K, V> {
    state: Mutex<CacheState<K, V>>,
    pub(crate) wakeup: Condvar,
}

impl<K, V> Shared<K, V> {
    /// Acquires the cache lock.
    ///
    /// No operation panics while holding the lock, so a poisoned mutex
    /// still guards consistent state and is recovered.
    pub(crate) fn lock(&self) -> MutexGuard<'_, CacheState<K, V>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Owns the worker thread; dropped together with the last handle.
struct Inner<K, V> {
    shared: Arc<Shared<K, V>>,
    worker: Option<JoinHandle<()>>,
    capacity: usize,
    ttl: Duration,
}

impl<K, V> Drop for Inner<K, V> {
    fn drop(&mut self) {
        self.shared.lock().shutdown = true;
        self.shared.wakeup.notify_all();
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                warn!("expiry worker terminated with a panic");
            }
        }
    }
}

// == LRU Cache ==
/// Fixed-capacity, thread-safe cache with LRU eviction and per-entry TTL.
///
/// Cloning is cheap and every clone shares the same entries. Expired
/// entries are removed by a background worker even when nobody touches the
/// cache; the worker stops when the last clone is dropped.
///
/// # Example
/// ```
/// use std::time::Duration;
/// use lru_cache_server::cache::LruCache;
///
/// let cache = LruCache::new(2, Duration::from_secs(60));
/// cache.put(1, "one");
/// cache.put(2, "two");
/// assert_eq!(cache.get(&1), Some("one"));
///
/// // Key 2 is now least recently used and makes room for key 3
/// cache.put(3, "three");
/// assert_eq!(cache.get(&2), None);
/// ```
pub struct LruCache<K, V> {
    inner: Arc<Inner<K, V>>,
}

impl<K, V> Clone for LruCache<K, V> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<K, V> LruCache<K, V>
where
    K: Eq + Hash + Clone + Send + 'static,
    V: Clone + Send + 'static,
{
    // == Constructor ==
    /// Creates an empty cache holding at most `capacity` entries.
    ///
    /// A zero `ttl` disables expiration by substituting [`NO_EXPIRY_TTL`];
    /// entries still get a timer. A zero `capacity` retains nothing.
    pub fn new(capacity: usize, ttl: Duration) -> Self {
        let state = CacheState::new(capacity, ttl);
        let ttl = state.ttl;
        let shared = Arc::new(Shared {
            state: Mutex::new(state),
            wakeup: Condvar::new(),
        });
        let worker = spawn_expiry_worker(Arc::clone(&shared));

        Self {
            inner: Arc::new(Inner {
                shared,
                worker,
                capacity,
                ttl,
            }),
        }
    }

    /// Creates a cache from a signed capacity, clamping negatives to zero.
    pub fn with_signed_capacity(capacity: i64, ttl: Duration) -> Self {
        let capacity = if capacity < 0 {
            0
        } else {
            usize::try_from(capacity).unwrap_or(usize::MAX)
        };
        Self::new(capacity, ttl)
    }

    // == Get ==
    /// Returns a clone of the value for `key` and marks it most recently used.
    pub fn get(&self, key: &K) -> Option<V> {
        self.inner.shared.lock().get(key, Instant::now())
    }

    // == Put ==
    /// Stores `value` under `key`.
    ///
    /// An existing key gets its value replaced, its timer re-armed to the full
    /// TTL and is moved to the head. A new key evicts the least recently
    /// used entry first when the cache is full.
    pub fn put(&self, key: K, value: V) {
        let wake = self.inner.shared.lock().put(key, value, Instant::now());
        if wake {
            self.inner.shared.wakeup.notify_one();
        }
    }

    // == Purge All ==
    /// Removes every entry and cancels all pending timers.
    pub fn purge_all(&self) {
        let purged = self.inner.shared.lock().purge_all();
        debug!(purged, "purged cache");
    }

    /// Checks for `key` without affecting recency.
    pub fn contains(&self, key: &K) -> bool {
        self.current().contains(key)
    }

    /// Snapshot of live keys, most recently used first.
    pub fn keys(&self) -> Vec<K> {
        self.current().keys()
    }

    // == Length ==
    /// Returns the current number of live entries.
    pub fn len(&self) -> usize {
        self.current().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Locks the state after firing every timer already due.
    fn current(&self) -> MutexGuard<'_, CacheState<K, V>> {
        let mut state = self.inner.shared.lock();
        state.expire_due(Instant::now());
        state
    }
}

impl<K, V> LruCache<K, V> {
    /// Entry count without firing due timers, as left by the expiry worker.
    #[cfg(test)]
    pub(crate) fn stored_len(&self) -> usize {
        self.inner.shared.lock().len()
    }

    pub fn capacity(&self) -> usize {
        self.inner.capacity
    }

    /// Lifetime applied to every entry after substitution of a zero TTL.
    pub fn ttl(&self) -> Duration {
        self.inner.ttl
    }
}

impl<K, V> fmt::Debug for LruCache<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LruCache")
            .field("capacity", &self.inner.capacity)
            .field("ttl", &self.inner.ttl)
            .field("len", &self.inner.shared.lock().len())
            .finish()
    }
}
