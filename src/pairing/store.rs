//! Pairing record storage

use anyhow::Result;
use async_trait::async_trait;
use pairing_shared::PairingRecord;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Access to persisted pairing device records
///
/// Implementations must be safe to share between concurrently running
/// handlers.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PairingRecordStore: Send + Sync {
    /// Snapshot of every record belonging to a place, in no particular order
    async fn list_by_place(&self, place_id: Uuid) -> Result<Vec<PairingRecord>>;

    /// Remove a record, returning whether it was still present
    async fn delete(&self, record: &PairingRecord) -> Result<bool>;
}

/// Store backed by a process-local map
#[derive(Debug, Default)]
pub struct InMemoryPairingRecordStore {
    /// Map of (place_id, sequence_id) -> record
    records: RwLock<HashMap<(Uuid, u32), PairingRecord>>,
}

impl InMemoryPairingRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a record
    pub async fn insert(&self, record: PairingRecord) {
        self.records.write().await.insert(record.key(), record);
    }

    /// Total number of records across all places
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    #[cfg(test)]
    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

#[async_trait]
impl PairingRecordStore for InMemoryPairingRecordStore {
    async fn list_by_place(&self, place_id: Uuid) -> Result<Vec<PairingRecord>> {
        let records = self.records.read().await;
        Ok(records
            .values()
            .filter(|r| r.place_id == place_id)
            .cloned()
            .collect())
    }

    async fn delete(&self, record: &PairingRecord) -> Result<bool> {
        Ok(self.records.write().await.remove(&record.key()).is_some())
    }
}
