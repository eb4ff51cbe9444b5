//! Keyed query cache with subscriber de-duplication.
//!
//! # Load generations
//!
//! Every load started for a key gets a generation number from a cache-wide
//! counter, and the slot remembers the newest one in flight. When a load
//! finishes, its result is written only if its generation is still the
//! newest for that key; anything else is counted as discarded. The caller
//! of [`QueryCache::fetch`] always receives its own loader's result either
//! way.
//!
//! # Subscribers
//!
//! A subscriber registers a loader and a listener for a key. The first
//! subscriber of a cold key starts a load; subscribers arriving while that
//! load is in flight join it instead of starting another. Listeners run
//! after the internal lock is released, so a listener may call back into
//! the cache.
//!
//! Snapshots from different loads are delivered outside the lock, so on a
//! multi-threaded runtime a listener may see them out of order (a `Loading`
//! snapshot after the `Success` that followed it). Listeners should treat a
//! snapshot as a hint that the key changed and re-read it with
//! [`QueryCache::peek`], which always reflects the latest state.
//!
//! # Abandoned loads
//!
//! A load whose future is dropped before the loader resolves (a timeout, a
//! `select!`, an aborted task, or a panicking loader) releases its key: if
//! it was still the newest load, the entry returns to the status it had
//! before loading and the next subscriber starts a fresh load.

use crate::entry::{CacheEntry, QueryStatus};
use crate::key::CacheKey;
use chrono::Utc;
use futures_util::future::BoxFuture;
use futures_util::FutureExt;
use std::collections::{BTreeMap, HashMap};
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;
use tracing::{debug, trace, warn};

pub type LoadFuture<V, E> = BoxFuture<'static, Result<V, E>>;

/// Produces a fresh load for a key each time it is called.
pub type Loader<V, E> = Arc<dyn Fn() -> LoadFuture<V, E> + Send + Sync>;

/// Receives a snapshot of the entry every time it changes. Snapshots from
/// concurrent loads may arrive out of order; re-read with [`QueryCache::peek`].
pub type Listener<V, E> = Arc<dyn Fn(CacheEntry<V, E>) + Send + Sync>;

/// Wrap an async closure as a [`Loader`].
pub fn loader<V, E, F, Fut>(f: F) -> Loader<V, E>
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<V, E>> + Send + 'static,
{
    Arc::new(move || -> LoadFuture<V, E> { Box::pin(f()) })
}

/// Wrap a closure as a [`Listener`].
pub fn listener<V, E, F>(f: F) -> Listener<V, E>
where
    F: Fn(CacheEntry<V, E>) + Send + Sync + 'static,
{
    Arc::new(f)
}

// ============================================================================
// CONFIG + STATS
// ============================================================================

/// Cache tuning.
#[derive(Debug, Clone, Default)]
pub struct CacheConfig {
    /// Age after which a successful entry is refetched when a new subscriber
    /// arrives. `None` keeps entries fresh until they are invalidated.
    pub stale_after: Option<Duration>,
}

impl CacheConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_stale_after(mut self, stale_after: Duration) -> Self {
        self.stale_after = Some(stale_after);
        self
    }
}

/// Counters describing cache behavior since creation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Subscriptions served without starting a load.
    pub hits: u64,
    /// Subscriptions that had to start a load.
    pub misses: u64,
    pub loads_started: u64,
    /// Loads whose result was dropped because a newer load superseded them
    /// or their entry was removed.
    pub loads_discarded: u64,
    /// Loads abandoned before their loader resolved.
    pub loads_abandoned: u64,
    pub entries: usize,
}

impl CacheStats {
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

/// Outcome of [`QueryCache::invalidate`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Invalidation {
    /// Keys with live subscribers; a refetch was started for each.
    pub refetched: Vec<CacheKey>,
    /// Keys without subscribers; their entries were removed.
    pub dropped: Vec<CacheKey>,
}

impl Invalidation {
    pub fn is_empty(&self) -> bool {
        self.refetched.is_empty() && self.dropped.is_empty()
    }
}

// ============================================================================
// INTERNAL STATE
// ============================================================================

struct Subscriber<V, E> {
    loader: Loader<V, E>,
    listener: Listener<V, E>,
}

struct Slot<V, E> {
    entry: CacheEntry<V, E>,
    in_flight: Option<u64>,
    /// Status to restore when the newest load is abandoned.
    resume_status: QueryStatus,
    subscribers: BTreeMap<u64, Subscriber<V, E>>,
}

impl<V: Clone, E: Clone> Slot<V, E> {
    fn new(key: CacheKey) -> Self {
        Self {
            entry: CacheEntry::idle(key),
            in_flight: None,
            resume_status: QueryStatus::Idle,
            subscribers: BTreeMap::new(),
        }
    }

    /// Record a new load. Returns whether the status changed.
    fn begin(&mut self, generation: u64) -> bool {
        self.in_flight = Some(generation);
        if self.entry.status == QueryStatus::Loading {
            return false;
        }
        self.resume_status = self.entry.status;
        self.entry.status = QueryStatus::Loading;
        true
    }

    /// Loader of the longest-standing subscriber.
    fn loader(&self) -> Option<Loader<V, E>> {
        self.subscribers.values().next().map(|s| Arc::clone(&s.loader))
    }

    fn notification(&self) -> Option<Notification<V, E>> {
        if self.subscribers.is_empty() {
            return None;
        }
        Some(Notification {
            listeners: self
                .subscribers
                .values()
                .map(|s| Arc::clone(&s.listener))
                .collect(),
            entry: self.entry.clone(),
        })
    }
}

struct Notification<V, E> {
    listeners: Vec<Listener<V, E>>,
    entry: CacheEntry<V, E>,
}

fn deliver<V: Clone, E: Clone>(notifications: impl IntoIterator<Item = Notification<V, E>>) {
    for note in notifications {
        for listener in note.listeners {
            listener(note.entry.clone());
        }
    }
}

struct State<V, E> {
    slots: HashMap<CacheKey, Slot<V, E>>,
    stats: CacheStats,
}

struct Shared<V, E> {
    state: Mutex<State<V, E>>,
    config: CacheConfig,
    generations: AtomicU64,
    subscriber_ids: AtomicU64,
}

impl<V, E> Shared<V, E> {
    fn lock(&self) -> MutexGuard<'_, State<V, E>> {
        // A panicking listener never runs under the lock, so the state is
        // consistent even when the mutex reports poisoning.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn next_generation(&self) -> u64 {
        self.generations.fetch_add(1, Ordering::Relaxed) + 1
    }

    fn remove_subscriber(&self, key: &CacheKey, id: u64) {
        let mut state = self.lock();
        if let Some(slot) = state.slots.get_mut(key) {
            slot.subscribers.remove(&id);
            trace!(key = %key, subscriber = id, remaining = slot.subscribers.len(), "Unsubscribed");
        }
    }
}

// ============================================================================
// QUERY CACHE
// ============================================================================

/// Shared, cloneable handle to a query cache.
///
/// Loads started by [`subscribe`](Self::subscribe) and
/// [`invalidate`](Self::invalidate) are spawned onto the current tokio
/// runtime, so those calls must happen inside one.
pub struct QueryCache<V, E> {
    shared: Arc<Shared<V, E>>,
}

impl<V, E> Clone for QueryCache<V, E> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<V, E> Default for QueryCache<V, E>
where
    V: Clone + Send + Sync + 'static,
    E: Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new(CacheConfig::default())
    }
}

impl<V, E> QueryCache<V, E>
where
    V: Clone + Send + Sync + 'static,
    E: Clone + Send + Sync + 'static,
{
    pub fn new(config: CacheConfig) -> Self {
        Self {
            shared: Arc::new(Shared {
                state: Mutex::new(State {
                    slots: HashMap::new(),
                    stats: CacheStats::default(),
                }),
                config,
                generations: AtomicU64::new(0),
                subscriber_ids: AtomicU64::new(0),
            }),
        }
    }

    pub fn config(&self) -> &CacheConfig {
        &self.shared.config
    }

    /// Current entry for `key`, creating an idle one if the key is unknown.
    pub fn get(&self, key: &CacheKey) -> CacheEntry<V, E> {
        let mut state = self.shared.lock();
        state
            .slots
            .entry(key.clone())
            .or_insert_with(|| Slot::new(key.clone()))
            .entry
            .clone()
    }

    /// Current entry for `key` without creating one.
    pub fn peek(&self, key: &CacheKey) -> Option<CacheEntry<V, E>> {
        self.shared.lock().slots.get(key).map(|slot| slot.entry.clone())
    }

    /// Last successful value for `key`, if any.
    pub fn data(&self, key: &CacheKey) -> Option<V> {
        self.shared
            .lock()
            .slots
            .get(key)
            .and_then(|slot| slot.entry.data.clone())
    }

    pub fn contains(&self, key: &CacheKey) -> bool {
        self.shared.lock().slots.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.shared.lock().slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn subscriber_count(&self, key: &CacheKey) -> usize {
        self.shared
            .lock()
            .slots
            .get(key)
            .map_or(0, |slot| slot.subscribers.len())
    }

    pub fn stats(&self) -> CacheStats {
        let state = self.shared.lock();
        CacheStats {
            entries: state.slots.len(),
            ..state.stats.clone()
        }
    }

    /// Load `key` now, regardless of what is cached or in flight.
    ///
    /// The entry moves to `Loading` (keeping any previous data), and the
    /// loader's result is written back only if no newer load for the same
    /// key started in the meantime. The result is returned to the caller
    /// unconditionally.
    pub async fn fetch(&self, key: CacheKey, loader: Loader<V, E>) -> Result<V, E> {
        let generation = self.start(&key);
        self.load(key, generation, loader).await
    }

    /// Register interest in `key`.
    ///
    /// The listener immediately receives the current entry, then every
    /// subsequent change until the returned [`Subscription`] is dropped. A
    /// load is started when the entry is idle, errored, stale or older than
    /// [`CacheConfig::stale_after`] and nothing is already in flight.
    pub fn subscribe(
        &self,
        key: CacheKey,
        loader: Loader<V, E>,
        listener: Listener<V, E>,
    ) -> Subscription<V, E> {
        let id = self.shared.subscriber_ids.fetch_add(1, Ordering::Relaxed) + 1;
        let now = Utc::now();

        let (started, notification) = {
            let mut guard = self.shared.lock();
            let state = &mut *guard;
            let slot = state
                .slots
                .entry(key.clone())
                .or_insert_with(|| Slot::new(key.clone()));
            slot.subscribers.insert(
                id,
                Subscriber {
                    loader: Arc::clone(&loader),
                    listener: Arc::clone(&listener),
                },
            );

            if slot.in_flight.is_none()
                && slot.entry.needs_fetch(self.shared.config.stale_after, now)
            {
                let generation = self.shared.next_generation();
                let changed = slot.begin(generation);
                state.stats.misses += 1;
                state.stats.loads_started += 1;
                let notification = if changed {
                    slot.notification()
                } else {
                    None
                };
                (Some(generation), notification)
            } else {
                state.stats.hits += 1;
                let notification = Notification {
                    listeners: vec![listener],
                    entry: slot.entry.clone(),
                };
                (None, Some(notification))
            }
        };

        debug!(key = %key, subscriber = id, fetching = started.is_some(), "Subscribed");
        deliver(notification);
        if let Some(generation) = started {
            self.spawn_load(key.clone(), generation, loader);
        }

        Subscription {
            cache: Arc::downgrade(&self.shared),
            key,
            id,
        }
    }

    /// Mark every entry whose key starts with one of `prefixes` as stale.
    ///
    /// Matching entries with subscribers are refetched in the background
    /// with their oldest subscriber's loader; matching entries without
    /// subscribers are removed, so the next subscriber loads from scratch.
    /// Returns immediately without waiting for any refetch.
    pub fn invalidate(&self, prefixes: &[CacheKey]) -> Invalidation {
        let mut report = Invalidation::default();
        if prefixes.is_empty() {
            return report;
        }

        let mut notifications = Vec::new();
        let mut loads = Vec::new();
        {
            let mut guard = self.shared.lock();
            let state = &mut *guard;
            let mut matched: Vec<CacheKey> = state
                .slots
                .keys()
                .filter(|key| prefixes.iter().any(|prefix| key.starts_with(prefix)))
                .cloned()
                .collect();
            matched.sort();

            for key in matched {
                let loader = state.slots.get(&key).and_then(Slot::loader);
                let Some(loader) = loader else {
                    state.slots.remove(&key);
                    report.dropped.push(key);
                    continue;
                };
                let Some(slot) = state.slots.get_mut(&key) else {
                    continue;
                };
                let generation = self.shared.next_generation();
                slot.entry.is_stale = true;
                slot.begin(generation);
                state.stats.loads_started += 1;
                notifications.extend(slot.notification());
                loads.push((key.clone(), generation, loader));
                report.refetched.push(key);
            }
        }

        debug!(
            refetched = report.refetched.len(),
            dropped = report.dropped.len(),
            "Invalidated cache keys"
        );
        deliver(notifications);
        for (key, generation, loader) in loads {
            self.spawn_load(key, generation, loader);
        }
        report
    }

    /// Remove every entry, live subscribers included. In-flight loads are
    /// discarded when they finish.
    pub fn clear(&self) {
        let mut state = self.shared.lock();
        let dropped = state.slots.len();
        state.slots.clear();
        debug!(dropped, "Cleared query cache");
    }

    fn start(&self, key: &CacheKey) -> u64 {
        let generation = self.shared.next_generation();
        let notification = {
            let mut guard = self.shared.lock();
            let state = &mut *guard;
            state.stats.loads_started += 1;
            let slot = state
                .slots
                .entry(key.clone())
                .or_insert_with(|| Slot::new(key.clone()));
            if slot.begin(generation) {
                slot.notification()
            } else {
                None
            }
        };
        deliver(notification);
        generation
    }

    fn spawn_load(&self, key: CacheKey, generation: u64, loader: Loader<V, E>) {
        let cache = self.clone();
        tokio::spawn(async move {
            // The result has already been written to the entry. A panic is
            // caught here after the load guard has released the key.
            let load = cache.load(key.clone(), generation, loader);
            if AssertUnwindSafe(load).catch_unwind().await.is_err() {
                warn!(key = %key, generation, "Loader panicked");
            }
        });
    }

    async fn load(&self, key: CacheKey, generation: u64, loader: Loader<V, E>) -> Result<V, E> {
        trace!(key = %key, generation, "Load started");
        let mut guard = LoadGuard {
            cache: self,
            key,
            generation,
            done: false,
        };
        let result = loader().await;
        guard.done = true;
        self.complete(&guard.key, generation, &result);
        result
    }

    /// Undo the bookkeeping of a load that will never complete.
    fn release(&self, key: &CacheKey, generation: u64) {
        let notification = {
            let mut guard = self.shared.lock();
            let state = &mut *guard;
            state.stats.loads_abandoned += 1;
            let Some(slot) = state.slots.get_mut(key) else {
                return;
            };
            if slot.in_flight != Some(generation) {
                debug!(key = %key, generation, "Abandoned superseded load");
                return;
            }
            slot.in_flight = None;
            slot.entry.status = match slot.resume_status {
                QueryStatus::Loading => QueryStatus::Idle,
                status => status,
            };
            debug!(key = %key, generation, status = ?slot.entry.status, "Abandoned load released its key");
            slot.notification()
        };
        deliver(notification);
    }

    fn complete(&self, key: &CacheKey, generation: u64, result: &Result<V, E>) {
        let notification = {
            let mut guard = self.shared.lock();
            let state = &mut *guard;
            let Some(slot) = state.slots.get_mut(key) else {
                state.stats.loads_discarded += 1;
                debug!(key = %key, generation, "Discarded load for removed entry");
                return;
            };
            if slot.in_flight != Some(generation) {
                state.stats.loads_discarded += 1;
                debug!(key = %key, generation, newest = ?slot.in_flight, "Discarded superseded load");
                return;
            }

            slot.in_flight = None;
            match result {
                Ok(value) => {
                    slot.entry.status = QueryStatus::Success;
                    slot.entry.data = Some(value.clone());
                    slot.entry.error = None;
                    slot.entry.last_fetched_at = Some(Utc::now());
                    slot.entry.is_stale = false;
                }
                Err(err) => {
                    slot.entry.status = QueryStatus::Error;
                    slot.entry.error = Some(err.clone());
                }
            }
            trace!(key = %key, generation, status = ?slot.entry.status, "Load applied");
            slot.notification()
        };
        deliver(notification);
    }
}

/// Releases the key when a load is dropped before its loader resolves.
struct LoadGuard<'a, V, E>
where
    V: Clone + Send + Sync + 'static,
    E: Clone + Send + Sync + 'static,
{
    cache: &'a QueryCache<V, E>,
    key: CacheKey,
    generation: u64,
    done: bool,
}

impl<V, E> Drop for LoadGuard<'_, V, E>
where
    V: Clone + Send + Sync + 'static,
    E: Clone + Send + Sync + 'static,
{
    fn drop(&mut self) {
        if !self.done {
            self.cache.release(&self.key, self.generation);
        }
    }
}

// ============================================================================
// SUBSCRIPTION
// ============================================================================

/// Handle returned by [`QueryCache::subscribe`]. Dropping it unsubscribes.
///
/// The entry itself stays cached after its last subscriber leaves.
pub struct Subscription<V, E> {
    cache: Weak<Shared<V, E>>,
    key: CacheKey,
    id: u64,
}

impl<V, E> Subscription<V, E> {
    pub fn key(&self) -> &CacheKey {
        &self.key
    }

    pub fn unsubscribe(self) {}
}

impl<V, E> Drop for Subscription<V, E> {
    fn drop(&mut self) {
        if let Some(shared) = self.cache.upgrade() {
            shared.remove_subscriber(&self.key, self.id);
        }
    }
}

impl<V, E> std::fmt::Debug for Subscription<V, E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("key", &self.key)
            .field("id", &self.id)
            .finish()
    }
}
