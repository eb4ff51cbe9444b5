//! Cache entries and their load status.

use crate::key::CacheKey;
use chrono::{DateTime, Utc};
use std::time::Duration;

/// Load status of a cache entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueryStatus {
    /// Never fetched.
    Idle,
    Loading,
    Success,
    Error,
}

/// Snapshot of everything the cache knows about one key.
///
/// `data` survives later failures and refetches: an entry in `Loading` or
/// `Error` may still carry the last successful value, which views keep
/// showing until it is replaced.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntry<V, E> {
    pub key: CacheKey,
    pub status: QueryStatus,
    pub data: Option<V>,
    pub error: Option<E>,
    pub last_fetched_at: Option<DateTime<Utc>>,
    pub is_stale: bool,
}

impl<V, E> CacheEntry<V, E> {
    pub fn idle(key: CacheKey) -> Self {
        Self {
            key,
            status: QueryStatus::Idle,
            data: None,
            error: None,
            last_fetched_at: None,
            is_stale: false,
        }
    }

    pub fn is_loading(&self) -> bool {
        self.status == QueryStatus::Loading
    }

    /// Loading with a previous value still on screen.
    pub fn is_refreshing(&self) -> bool {
        self.is_loading() && self.data.is_some()
    }

    pub fn is_error(&self) -> bool {
        self.status == QueryStatus::Error
    }

    /// Whether a new subscriber should trigger a load.
    pub(crate) fn needs_fetch(&self, stale_after: Option<Duration>, now: DateTime<Utc>) -> bool {
        match self.status {
            QueryStatus::Idle | QueryStatus::Error => true,
            QueryStatus::Loading => false,
            QueryStatus::Success => self.is_stale || self.expired(stale_after, now),
        }
    }

    fn expired(&self, stale_after: Option<Duration>, now: DateTime<Utc>) -> bool {
        let (Some(max_age), Some(fetched)) = (stale_after, self.last_fetched_at) else {
            return false;
        };
        chrono::Duration::from_std(max_age).map_or(false, |max_age| now - fetched >= max_age)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fetched(age_secs: i64) -> CacheEntry<u32, String> {
        let mut entry = CacheEntry::idle(CacheKey::new().with("k"));
        entry.status = QueryStatus::Success;
        entry.data = Some(1);
        entry.last_fetched_at = Some(Utc::now() - chrono::Duration::seconds(age_secs));
        entry
    }

    #[test]
    fn idle_and_error_entries_need_a_fetch() {
        let entry: CacheEntry<u32, String> = CacheEntry::idle(CacheKey::new());
        assert!(entry.needs_fetch(None, Utc::now()));

        let mut entry = fetched(0);
        entry.status = QueryStatus::Error;
        assert!(entry.needs_fetch(None, Utc::now()));
    }

    #[test]
    fn fresh_success_is_served_from_cache() {
        let entry = fetched(5);
        assert!(!entry.needs_fetch(None, Utc::now()));
        assert!(!entry.needs_fetch(Some(Duration::from_secs(60)), Utc::now()));
        assert!(entry.needs_fetch(Some(Duration::from_secs(1)), Utc::now()));
    }

    #[test]
    fn stale_flag_forces_a_fetch() {
        let mut entry = fetched(0);
        entry.is_stale = true;
        assert!(entry.needs_fetch(None, Utc::now()));
        entry.status = QueryStatus::Loading;
        assert!(!entry.needs_fetch(None, Utc::now()));
        assert!(entry.is_refreshing());
    }
}
