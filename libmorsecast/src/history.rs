//! Transmission log
//!
//! [`HistoryStore`] is what the transmitter sees: append a completed entry,
//! read back the most recent ones. Failures never reach the transmitter;
//! implementations log them and carry on.
//!
//! [`KvHistoryStore`] keeps the whole log as one JSON blob under
//! [`HISTORY_KEY`] and rewrites it on every append.

use async_trait::async_trait;
use std::sync::Mutex;

use crate::error::{Result, StoreError};
use crate::store::KvStore;
use crate::types::{HistoryEntry, TransmissionRecord};

/// Key of the transmission log blob
pub const HISTORY_KEY: &str = "morse_transmissions";

/// Where an unreadable log blob is kept when a fresh log is started
pub const CORRUPT_HISTORY_KEY: &str = "morse_transmissions.corrupt";

#[async_trait]
pub trait HistoryStore: Send + Sync {
    /// Append a completed transmission
    async fn append(&self, entry: HistoryEntry);

    /// The last `n` entries, most recent last
    async fn recent(&self, n: usize) -> Vec<HistoryEntry>;

    /// Every entry, oldest first
    async fn all(&self) -> Vec<HistoryEntry>;
}

fn last_n<T: Clone>(items: &[T], n: usize) -> Vec<T> {
    let start = items.len().saturating_sub(n);
    items[start..].to_vec()
}

/// Log kept in process memory
#[derive(Debug, Default)]
pub struct MemoryHistoryStore {
    entries: Mutex<Vec<HistoryEntry>>,
}

impl MemoryHistoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn with_entries<R>(&self, f: impl FnOnce(&mut Vec<HistoryEntry>) -> R) -> R {
        match self.entries.lock() {
            Ok(mut entries) => f(&mut entries),
            Err(poisoned) => f(&mut poisoned.into_inner()),
        }
    }
}

#[async_trait]
impl HistoryStore for MemoryHistoryStore {
    async fn append(&self, entry: HistoryEntry) {
        self.with_entries(|entries| entries.push(entry));
    }

    async fn recent(&self, n: usize) -> Vec<HistoryEntry> {
        self.with_entries(|entries| last_n(entries, n))
    }

    async fn all(&self) -> Vec<HistoryEntry> {
        self.with_entries(|entries| entries.clone())
    }
}

/// Log persisted as a blob in the key-value store
pub struct KvHistoryStore {
    store: KvStore,
    write_lock: tokio::sync::Mutex<()>,
}

impl KvHistoryStore {
    pub fn new(store: KvStore) -> Self {
        Self {
            store,
            write_lock: tokio::sync::Mutex::new(()),
        }
    }

    /// Every persisted row, oldest first
    pub async fn load(&self) -> Result<Vec<TransmissionRecord>> {
        match self.store.get(HISTORY_KEY).await? {
            Some(blob) => {
                let records = serde_json::from_str(&blob).map_err(StoreError::Serialization)?;
                Ok(records)
            }
            None => Ok(Vec::new()),
        }
    }

    /// Append and persist, reporting failures
    pub async fn try_append(&self, entry: &HistoryEntry) -> Result<TransmissionRecord> {
        let _guard = self.write_lock.lock().await;

        let mut records = self.load_for_append().await?;
        let id = records.last().map(|r| r.id + 1).unwrap_or(1);
        let record = TransmissionRecord::from_entry(id, entry);
        records.push(record.clone());

        let blob = serde_json::to_string(&records).map_err(StoreError::Serialization)?;
        self.store.put(HISTORY_KEY, &blob).await?;

        tracing::debug!(id, "Logged transmission");
        Ok(record)
    }

    /// Drop the whole log; returns how many rows were removed
    pub async fn clear(&self) -> Result<usize> {
        let _guard = self.write_lock.lock().await;
        let count = self.load().await?.len();
        self.store.delete(HISTORY_KEY).await?;
        Ok(count)
    }

    /// Rows to append to
    ///
    /// An unreadable blob is moved to [`CORRUPT_HISTORY_KEY`] and the log
    /// starts over, so one bad write does not stop all later logging.
    async fn load_for_append(&self) -> Result<Vec<TransmissionRecord>> {
        let Some(blob) = self.store.get(HISTORY_KEY).await? else {
            return Ok(Vec::new());
        };

        match serde_json::from_str(&blob) {
            Ok(records) => Ok(records),
            Err(e) => {
                tracing::warn!(
                    "Transmission log unreadable ({}), kept under {} and starting a new log",
                    e,
                    CORRUPT_HISTORY_KEY
                );
                self.store.put(CORRUPT_HISTORY_KEY, &blob).await?;
                Ok(Vec::new())
            }
        }
    }

    async fn load_or_empty(&self) -> Vec<TransmissionRecord> {
        self.load().await.unwrap_or_else(|e| {
            tracing::warn!("Failed to read transmission log: {}", e);
            Vec::new()
        })
    }
}

#[async_trait]
impl HistoryStore for KvHistoryStore {
    async fn append(&self, entry: HistoryEntry) {
        if let Err(e) = self.try_append(&entry).await {
            tracing::warn!("Failed to persist transmission: {}", e);
        }
    }

    async fn recent(&self, n: usize) -> Vec<HistoryEntry> {
        let records = self.load_or_empty().await;
        last_n(&records, n).iter().map(TransmissionRecord::to_entry).collect()
    }

    async fn all(&self) -> Vec<HistoryEntry> {
        self.load_or_empty()
            .await
            .iter()
            .map(TransmissionRecord::to_entry)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TransformMode;
    use tempfile::TempDir;

    fn entry(text: &str) -> HistoryEntry {
        HistoryEntry::new(text.to_string(), text.to_string(), TransformMode::None)
    }

    async fn kv_history() -> (TempDir, KvHistoryStore) {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("history.db");
        let store = KvStore::open(path.to_str().unwrap()).await.unwrap();
        (temp_dir, KvHistoryStore::new(store))
    }

    #[test]
    fn test_last_n() {
        assert_eq!(last_n(&[1, 2, 3, 4], 2), vec![3, 4]);
        assert_eq!(last_n(&[1, 2], 5), vec![1, 2]);
        assert!(last_n(&[1, 2], 0).is_empty());
    }

    #[tokio::test]
    async fn test_memory_recent_is_most_recent_last() {
        let store = MemoryHistoryStore::new();
        for text in ["A", "B", "C", "D", "E"] {
            store.append(entry(text)).await;
        }

        let recent: Vec<String> = store
            .recent(3)
            .await
            .into_iter()
            .map(|e| e.plaintext)
            .collect();
        assert_eq!(recent, vec!["C", "D", "E"]);
        assert_eq!(store.all().await.len(), 5);
    }

    #[tokio::test]
    async fn test_kv_append_assigns_monotonic_ids() {
        let (_dir, history) = kv_history().await;
        let first = history.try_append(&entry("CQ")).await.unwrap();
        let second = history.try_append(&entry("DE")).await.unwrap();

        assert_eq!(first.id, 1);
        assert_eq!(second.id, 2);
        assert_eq!(history.load().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_kv_recent_returns_last_n_in_order() {
        let (_dir, history) = kv_history().await;
        for i in 0..12 {
            history.append(entry(&format!("MSG{}", i))).await;
        }

        let recent: Vec<String> = history
            .recent(10)
            .await
            .into_iter()
            .map(|e| e.plaintext)
            .collect();
        let expected: Vec<String> = (2..12).map(|i| format!("MSG{}", i)).collect();
        assert_eq!(recent, expected);
    }

    #[tokio::test]
    async fn test_kv_blob_is_single_key() {
        let (_dir, history) = kv_history().await;
        history.append(entry("A")).await;
        history.append(entry("B")).await;

        assert_eq!(history.store.keys().await.unwrap(), vec![HISTORY_KEY.to_string()]);
        let blob = history.store.get(HISTORY_KEY).await.unwrap().unwrap();
        let rows: Vec<TransmissionRecord> = serde_json::from_str(&blob).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].message, "B");
    }

    #[tokio::test]
    async fn test_kv_clear() {
        let (_dir, history) = kv_history().await;
        history.append(entry("A")).await;
        assert_eq!(history.clear().await.unwrap(), 1);
        assert!(history.all().await.is_empty());

        // ids restart after a clear
        assert_eq!(history.try_append(&entry("B")).await.unwrap().id, 1);
    }

    #[tokio::test]
    async fn test_kv_corrupt_blob_degrades_to_empty() {
        let (_dir, history) = kv_history().await;
        history.store.put(HISTORY_KEY, "{not json").await.unwrap();

        assert!(history.load().await.is_err());
        assert!(history.recent(5).await.is_empty());
    }

    #[tokio::test]
    async fn test_kv_append_after_corrupt_blob_starts_fresh_log() {
        let (_dir, history) = kv_history().await;
        history.store.put(HISTORY_KEY, "{not json").await.unwrap();

        let record = history.try_append(&entry("QRV")).await.unwrap();
        assert_eq!(record.id, 1);

        history.append(entry("QRT")).await;
        let texts: Vec<String> = history.all().await.into_iter().map(|e| e.plaintext).collect();
        assert_eq!(texts, vec!["QRV", "QRT"]);

        let kept = history.store.get(CORRUPT_HISTORY_KEY).await.unwrap();
        assert_eq!(kept.as_deref(), Some("{not json"));
    }

    #[tokio::test]
    async fn test_kv_append_after_close_does_not_panic() {
        let (_dir, history) = kv_history().await;
        history.store.close().await;
        history.append(entry("lost")).await;
        assert!(history.recent(1).await.is_empty());
    }
}
