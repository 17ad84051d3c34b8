//! Key-value persistence for display and data source state.
//!
//! Keys are composed as `{namespace}:{id}:{subkey}`. Writes of several
//! subkeys are not atomic as a group; readers tolerate a torn update and
//! converge on the next write. Store errors are never retried here.

mod memory;
mod sqlite;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};
use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store backend error: {0}")]
    Backend(String),

    #[error("cannot decode {key}: {reason}")]
    Encoding { key: String, reason: String },

    #[error("store task failed: {0}")]
    TaskJoin(String),
}

impl From<rusqlite::Error> for StoreError {
    fn from(e: rusqlite::Error) -> Self {
        StoreError::Backend(e.to_string())
    }
}

impl From<tokio::task::JoinError> for StoreError {
    fn from(e: tokio::task::JoinError) -> Self {
        StoreError::TaskJoin(e.to_string())
    }
}

/// Byte-valued key-value store shared by all entities
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError>;

    /// Write all entries; individual keys may become visible one by one
    async fn set_many(&self, entries: &[(String, Vec<u8>)]) -> Result<(), StoreError>;

    /// Remove every key starting with `prefix`, returning how many were removed
    async fn delete_prefix(&self, prefix: &str) -> Result<usize, StoreError>;
}

/// Store key for one subkey of an entity
pub fn compose_key(namespace: &str, id: &str, subkey: &str) -> String {
    format!("{}:{}:{}", namespace, id, subkey)
}

/// ISO-8601 form used for persisted timestamps
pub fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, false)
}

/// Parse a persisted timestamp; offset-less values are taken as UTC
pub fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .ok()
        .or_else(|| {
            NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
                .ok()
                .map(|naive| naive.and_utc())
        })
}

/// A store view bound to one entity
#[derive(Clone)]
pub struct StoreHandle {
    store: Arc<dyn KeyValueStore>,
    namespace: String,
    id: String,
}

impl StoreHandle {
    pub fn new(store: Arc<dyn KeyValueStore>, namespace: &str, id: &str) -> Self {
        Self {
            store,
            namespace: namespace.to_string(),
            id: id.to_string(),
        }
    }

    pub fn key(&self, subkey: &str) -> String {
        compose_key(&self.namespace, &self.id, subkey)
    }

    pub async fn get(&self, subkey: &str) -> Result<Option<Vec<u8>>, StoreError> {
        self.store.get(&self.key(subkey)).await
    }

    pub async fn get_string(&self, subkey: &str) -> Result<Option<String>, StoreError> {
        match self.get(subkey).await? {
            None => Ok(None),
            Some(bytes) => String::from_utf8(bytes)
                .map(Some)
                .map_err(|e| StoreError::Encoding {
                    key: self.key(subkey),
                    reason: e.to_string(),
                }),
        }
    }

    pub async fn get_json(&self, subkey: &str) -> Result<Option<Value>, StoreError> {
        match self.get(subkey).await? {
            None => Ok(None),
            Some(bytes) => serde_json::from_slice(&bytes)
                .map(Some)
                .map_err(|e| StoreError::Encoding {
                    key: self.key(subkey),
                    reason: e.to_string(),
                }),
        }
    }

    pub async fn get_timestamp(&self, subkey: &str) -> Result<Option<DateTime<Utc>>, StoreError> {
        match self.get_string(subkey).await? {
            None => Ok(None),
            Some(s) => parse_timestamp(&s)
                .map(Some)
                .ok_or_else(|| StoreError::Encoding {
                    key: self.key(subkey),
                    reason: format!("not a timestamp: {}", s),
                }),
        }
    }

    pub async fn set_many(&self, entries: Vec<(&str, Vec<u8>)>) -> Result<(), StoreError> {
        let entries: Vec<(String, Vec<u8>)> = entries
            .into_iter()
            .map(|(subkey, value)| (self.key(subkey), value))
            .collect();
        self.store.set_many(&entries).await
    }

    /// Forget all persisted state of this entity
    pub async fn clear(&self) -> Result<usize, StoreError> {
        self.store
            .delete_prefix(&format!("{}:{}:", self.namespace, self.id))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_compose_key() {
        assert_eq!(compose_key("display", "ep_1", "version"), "display:ep_1:version");
    }

    #[test]
    fn test_timestamp_format() {
        let ts = Utc.with_ymd_and_hms(2024, 3, 1, 12, 30, 0).unwrap();
        let s = format_timestamp(ts);
        assert_eq!(s, "2024-03-01T12:30:00.000000+00:00");
        assert_eq!(parse_timestamp(&s), Some(ts));
        // Naive timestamps written by older deployments
        assert_eq!(parse_timestamp("2024-03-01T12:30:00"), Some(ts));
        assert_eq!(parse_timestamp("yesterday"), None);
    }

    #[tokio::test]
    async fn test_handle_namespaces_keys() {
        let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        let display = StoreHandle::new(store.clone(), "display", "a");
        let source = StoreHandle::new(store.clone(), "datasource", "a");

        display
            .set_many(vec![("version", b"v1".to_vec())])
            .await
            .unwrap();
        assert_eq!(display.get_string("version").await.unwrap().as_deref(), Some("v1"));
        assert_eq!(source.get("version").await.unwrap(), None);
        assert_eq!(store.get("display:a:version").await.unwrap(), Some(b"v1".to_vec()));
    }

    #[tokio::test]
    async fn test_handle_decoding_errors() {
        let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        let handle = StoreHandle::new(store, "datasource", "weather");
        handle
            .set_many(vec![("data", b"{not json".to_vec()), ("last_update", b"soon".to_vec())])
            .await
            .unwrap();
        assert!(matches!(
            handle.get_json("data").await,
            Err(StoreError::Encoding { .. })
        ));
        assert!(handle.get_timestamp("last_update").await.is_err());
        assert_eq!(handle.clear().await.unwrap(), 2);
        assert_eq!(handle.get_json("data").await.unwrap(), None);
    }
}
