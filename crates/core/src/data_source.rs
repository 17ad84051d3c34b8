//! Fetcher trait and the staleness-gated data source cache

use std::sync::Arc;

use anyhow::{anyhow, Context as _, Result};
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use log::{debug, info};
use serde_json::Value;
use tokio::sync::Mutex;

use crate::clock::Clock;
use crate::constants::{DATASOURCE_NAMESPACE, SUBKEY_DATA, SUBKEY_LAST_UPDATE};
use crate::staleness::{max_age_from_secs, needs_refresh};
use crate::store::{format_timestamp, KeyValueStore, StoreError, StoreHandle};

/// Source-specific retrieval of a payload, typically over the network.
///
/// Fetchers bound their own latency; the cache applies no timeout.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Registry discriminator of this fetcher
    fn class_name(&self) -> &str;

    /// Retrieve a fresh payload
    async fn fetch(&self) -> Result<Value>;
}

/// Type-erased fetcher for dynamic dispatch
pub type BoxedFetcher = Box<dyn Fetcher>;

/// A named, cached provider of structured data.
///
/// State lives in the store under `datasource:{id}:*`; this object holds only
/// configuration. One instance is shared by every widget naming it.
pub struct DataSource {
    id: String,
    max_age: Option<Duration>,
    fetcher: BoxedFetcher,
    store: StoreHandle,
    clock: Arc<dyn Clock>,
    /// Serialises check-then-fetch so concurrent readers trigger one fetch
    refresh_lock: Mutex<()>,
}

impl DataSource {
    pub fn new(
        id: &str,
        max_age_s: Option<i64>,
        fetcher: BoxedFetcher,
        store: Arc<dyn KeyValueStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            id: id.to_string(),
            max_age: max_age_from_secs(max_age_s),
            fetcher,
            store: StoreHandle::new(store, DATASOURCE_NAMESPACE, id),
            clock,
            refresh_lock: Mutex::new(()),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn class_name(&self) -> &str {
        self.fetcher.class_name()
    }

    /// `None` when every access refetches
    pub fn max_age(&self) -> Option<Duration> {
        self.max_age
    }

    /// Completion time of the last successful fetch
    pub async fn last_update(&self) -> Result<Option<DateTime<Utc>>, StoreError> {
        self.store.get_timestamp(SUBKEY_LAST_UPDATE).await
    }

    /// Persist `data` as the current payload, stamped with the current time
    pub async fn set_data(&self, data: &Value) -> Result<(), StoreError> {
        let encoded = serde_json::to_vec(data).map_err(|e| StoreError::Encoding {
            key: self.store.key(SUBKEY_DATA),
            reason: e.to_string(),
        })?;
        let now = format_timestamp(self.clock.now());
        self.store
            .set_many(vec![
                (SUBKEY_LAST_UPDATE, now.into_bytes()),
                (SUBKEY_DATA, encoded),
            ])
            .await
    }

    /// Fetch unconditionally and store the result.
    ///
    /// A failed fetch leaves the stored state untouched, so the next access
    /// tries again.
    pub async fn update(&self) -> Result<()> {
        debug!("Fetching data source {} ({})", self.id, self.class_name());
        let data = self
            .fetcher
            .fetch()
            .await
            .with_context(|| format!("fetching data source {} ({})", self.id, self.class_name()))?;
        self.set_data(&data).await?;
        info!("Data source {} refreshed", self.id);
        Ok(())
    }

    /// Current payload, refreshed first when stale
    pub async fn get_data(&self) -> Result<Value> {
        {
            let _guard = self.refresh_lock.lock().await;
            let last_update = self.last_update().await?;
            if needs_refresh(last_update, self.max_age, self.clock.now()) {
                self.update().await?;
            } else {
                debug!("Data source {} is fresh", self.id);
            }
        }
        self.store
            .get_json(SUBKEY_DATA)
            .await?
            .ok_or_else(|| anyhow!("data source {} has no stored data", self.id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::store::MemoryStore;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingFetcher {
        calls: Arc<AtomicUsize>,
        fail: bool,
    }

    #[async_trait]
    impl Fetcher for CountingFetcher {
        fn class_name(&self) -> &str {
            "CountingFetcher"
        }

        async fn fetch(&self) -> Result<Value> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            if self.fail {
                return Err(anyhow!("upstream unavailable"));
            }
            Ok(json!({ "n": n }))
        }
    }

    fn source(max_age_s: Option<i64>, fail: bool) -> (DataSource, Arc<AtomicUsize>, Arc<ManualClock>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let clock = Arc::new(ManualClock::new(Utc::now()));
        let ds = DataSource::new(
            "counter",
            max_age_s,
            Box::new(CountingFetcher {
                calls: calls.clone(),
                fail,
            }),
            Arc::new(MemoryStore::new()),
            clock.clone(),
        );
        (ds, calls, clock)
    }

    #[tokio::test]
    async fn test_fetches_once_within_max_age() {
        let (ds, calls, clock) = source(Some(60), false);

        assert_eq!(ds.get_data().await.unwrap(), json!({ "n": 1 }));
        clock.advance(Duration::seconds(30));
        assert_eq!(ds.get_data().await.unwrap(), json!({ "n": 1 }));
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        clock.advance(Duration::seconds(31));
        assert_eq!(ds.get_data().await.unwrap(), json!({ "n": 2 }));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_zero_max_age_always_fetches() {
        let (ds, calls, _clock) = source(Some(0), false);
        ds.get_data().await.unwrap();
        ds.get_data().await.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_failed_fetch_propagates_and_retries_next_time() {
        let (ds, calls, _clock) = source(Some(60), true);
        assert!(ds.get_data().await.is_err());
        assert_eq!(ds.last_update().await.unwrap(), None);
        assert!(ds.get_data().await.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_set_data_stamps_clock_time() {
        let (ds, _calls, clock) = source(Some(60), false);
        ds.set_data(&json!([1, 2, 3])).await.unwrap();
        let stamped = ds.last_update().await.unwrap().unwrap();
        assert!((stamped - clock.now()).num_milliseconds().abs() < 1);
    }

    #[tokio::test]
    async fn test_concurrent_readers_share_one_fetch() {
        let (ds, calls, _clock) = source(Some(60), false);
        let ds = Arc::new(ds);
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let ds = ds.clone();
                tokio::spawn(async move { ds.get_data().await.unwrap() })
            })
            .collect();
        for h in handles {
            assert_eq!(h.await.unwrap(), json!({ "n": 1 }));
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
