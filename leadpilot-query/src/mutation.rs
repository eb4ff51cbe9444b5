//! Mutation runner.
//!
//! A mutation is a single write against the server followed by a cache
//! invalidation. The invalidation only happens when the write succeeds and
//! is fire-and-forget: [`MutationRunner::run`] returns as soon as the
//! refetches have been started, not when they finish.

use crate::cache::QueryCache;
use crate::key::CacheKey;
use std::future::Future;
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MutationStatus {
    #[default]
    Idle,
    Pending,
    Success,
    Error,
}

/// Status of the most recent run, with the error when it failed.
#[derive(Debug, Clone, PartialEq)]
pub struct MutationState<E> {
    pub status: MutationStatus,
    pub error: Option<E>,
}

impl<E> Default for MutationState<E> {
    fn default() -> Self {
        Self {
            status: MutationStatus::Idle,
            error: None,
        }
    }
}

impl<E> MutationState<E> {
    pub fn is_pending(&self) -> bool {
        self.status == MutationStatus::Pending
    }
}

/// Runs writes and invalidates the cache keys they affect.
///
/// Each runner tracks the state of its own latest run; create one per
/// independent action.
pub struct MutationRunner<V, E> {
    cache: QueryCache<V, E>,
    state: Mutex<MutationState<E>>,
}

impl<V, E> MutationRunner<V, E>
where
    V: Clone + Send + Sync + 'static,
    E: Clone + Send + Sync + 'static,
{
    pub fn new(cache: QueryCache<V, E>) -> Self {
        Self {
            cache,
            state: Mutex::new(MutationState::default()),
        }
    }

    pub fn cache(&self) -> &QueryCache<V, E> {
        &self.cache
    }

    pub fn state(&self) -> MutationState<E> {
        self.lock().clone()
    }

    /// Back to idle, forgetting the last error.
    pub fn reset(&self) {
        *self.lock() = MutationState::default();
    }

    /// Run `action`. On success every key starting with one of
    /// `invalidates` is invalidated before this returns; on failure the
    /// cache is left untouched and the error is returned as is.
    pub async fn run<R, F, Fut>(&self, action: F, invalidates: &[CacheKey]) -> Result<R, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<R, E>>,
    {
        self.set(MutationStatus::Pending, None);
        match action().await {
            Ok(value) => {
                self.set(MutationStatus::Success, None);
                let report = self.cache.invalidate(invalidates);
                debug!(
                    refetched = report.refetched.len(),
                    dropped = report.dropped.len(),
                    "Mutation succeeded"
                );
                Ok(value)
            }
            Err(err) => {
                self.set(MutationStatus::Error, Some(err.clone()));
                warn!("Mutation failed; cache left untouched");
                Err(err)
            }
        }
    }

    fn set(&self, status: MutationStatus, error: Option<E>) {
        *self.lock() = MutationState { status, error };
    }

    fn lock(&self) -> MutexGuard<'_, MutationState<E>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
