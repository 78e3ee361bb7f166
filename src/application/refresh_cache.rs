// Time-based cache for the aggregated dashboard data
use chrono::{DateTime, Utc};
use std::future::Future;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheStatus {
    Hit,
    Refreshed,
}

#[derive(Debug, Clone)]
struct Entry<T> {
    value: T,
    fetched_at: DateTime<Utc>,
    loaded: Instant,
}

/// Holds one value together with the time it was fetched.
///
/// Concurrent callers that miss wait on the same refresh instead of
/// issuing their own.
#[derive(Debug)]
pub struct RefreshCache<T> {
    ttl: Duration,
    slot: Mutex<Option<Entry<T>>>,
}

impl<T: Clone> RefreshCache<T> {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            slot: Mutex::new(None),
        }
    }

    /// Return the cached value while it is younger than the TTL, otherwise
    /// run `refresh` and store its result. A failed refresh leaves the slot
    /// empty.
    pub async fn get_or_refresh<F, Fut, E>(
        &self,
        refresh: F,
    ) -> Result<(T, DateTime<Utc>, CacheStatus), E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let mut slot = self.slot.lock().await;

        if let Some(entry) = slot.as_ref() {
            if entry.loaded.elapsed() < self.ttl {
                return Ok((entry.value.clone(), entry.fetched_at, CacheStatus::Hit));
            }
        }

        *slot = None;
        let value = refresh().await?;
        let fetched_at = Utc::now();
        *slot = Some(Entry {
            value: value.clone(),
            fetched_at,
            loaded: Instant::now(),
        });

        Ok((value, fetched_at, CacheStatus::Refreshed))
    }

    pub async fn invalidate(&self) {
        *self.slot.lock().await = None;
    }
}
