//! Shared delete capability for pairing records

use super::PairingRecordStore;
use anyhow::Result;
use async_trait::async_trait;
use pairing_shared::PairingRecord;
use std::sync::Arc;
use tracing::{debug, info};

/// Removes a pairing record and performs any associated cleanup
///
/// Must be idempotent: deleting a record that is already gone succeeds.
/// Failures are returned to the caller, never swallowed.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DeleteOperation: Send + Sync {
    async fn delete(&self, record: &PairingRecord) -> Result<()>;
}

/// Deletes records straight from the pairing record store
pub struct StoreDeleteOperation {
    store: Arc<dyn PairingRecordStore>,
}

impl StoreDeleteOperation {
    pub fn new(store: Arc<dyn PairingRecordStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl DeleteOperation for StoreDeleteOperation {
    async fn delete(&self, record: &PairingRecord) -> Result<()> {
        if self.store.delete(record).await? {
            info!(
                place_id = %record.place_id,
                sequence_id = record.sequence_id,
                protocol_address = %record.protocol_address,
                "Deleted pairing device"
            );
        } else {
            debug!(
                place_id = %record.place_id,
                sequence_id = record.sequence_id,
                "Pairing device already deleted"
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pairing::MockPairingRecordStore;
    use uuid::Uuid;

    fn record() -> PairingRecord {
        PairingRecord::new(Uuid::from_bytes([1; 16]), 3, "PROT:ZWAV:03")
            .with_device_address("DRIV:dev:abcd")
    }

    #[tokio::test]
    async fn test_missing_record_is_not_an_error() {
        let mut store = MockPairingRecordStore::new();
        store
            .expect_delete()
            .withf(|r: &PairingRecord| r.sequence_id == 3)
            .times(1)
            .returning(|_| Ok(false));

        let deleter = StoreDeleteOperation::new(Arc::new(store));
        assert!(deleter.delete(&record()).await.is_ok());
    }

    #[tokio::test]
    async fn test_store_failure_surfaces() {
        let mut store = MockPairingRecordStore::new();
        store
            .expect_delete()
            .times(1)
            .returning(|_| Err(anyhow::anyhow!("connection reset")));

        let deleter = StoreDeleteOperation::new(Arc::new(store));
        let err = deleter.delete(&record()).await.unwrap_err();
        assert_eq!(err.to_string(), "connection reset");
    }
}
