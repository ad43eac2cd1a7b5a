//! Device deleted handler
//!
//! When a driver-bound device is deleted, every pairing record of its place
//! that still points at the device address is deleted as well.

use crate::dispatch::MessageHandler;
use crate::error::{HandlerError, HandlerResult};
use crate::pairing::{DeleteOperation, PairingRecordStore};
use async_trait::async_trait;
use pairing_shared::{message_type, AddressPattern, PlatformMessage};
use std::sync::Arc;
use tracing::{debug, warn};
use uuid::Uuid;

/// Cascades device deletion to the place's pairing records
///
/// Stateless between invocations; safe to run concurrently for distinct
/// messages as long as the collaborators are.
pub struct DeviceDeletedHandler {
    store: Arc<dyn PairingRecordStore>,
    deleter: Arc<dyn DeleteOperation>,
}

impl DeviceDeletedHandler {
    /// Message type this handler subscribes to
    pub const MESSAGE_TYPE: &'static str = message_type::EVENT_DELETED;

    pub fn new(store: Arc<dyn PairingRecordStore>, deleter: Arc<dyn DeleteOperation>) -> Self {
        Self { store, deleter }
    }

    /// Sources this handler subscribes to (`DRIV:dev:*`)
    pub fn source_pattern() -> AddressPattern {
        AddressPattern::driver_devices()
    }

    /// Handle a device deleted event
    pub async fn on_device_deleted(&self, msg: &PlatformMessage) -> HandlerResult {
        let address = msg.source().representation();

        let Some(raw_place_id) = msg.place_id() else {
            warn!(address = %address, "Received device deleted with no place id");
            return Ok(());
        };

        let place_id = parse_place_id(raw_place_id)?;

        let matching: Vec<_> = self
            .store
            .list_by_place(place_id)
            .await?
            .into_iter()
            .filter(|record| record.is_for_device(&address))
            .collect();

        debug!(
            place_id = %place_id,
            address = %address,
            count = matching.len(),
            "Removing pairing devices for deleted device"
        );

        for record in &matching {
            self.deleter.delete(record).await?;
        }

        Ok(())
    }
}

/// Length of the hyphenated form, the only form accepted on the bus
const HYPHENATED_LEN: usize = 36;

/// Parse a place id, accepting only `xxxxxxxx-xxxx-xxxx-xxxx-xxxxxxxxxxxx`
///
/// Braced, simple and urn forms are rejected even though they name a UUID.
fn parse_place_id(raw: &str) -> HandlerResult<Uuid> {
    let malformed = |source: Option<uuid::Error>| HandlerError::MalformedPlaceId {
        value: raw.to_string(),
        source,
    };

    if raw.len() != HYPHENATED_LEN {
        return Err(malformed(None));
    }
    Uuid::parse_str(raw).map_err(|e| malformed(Some(e)))
}

#[async_trait]
impl MessageHandler for DeviceDeletedHandler {
    fn name(&self) -> &'static str {
        "device-deleted"
    }

    async fn handle(&self, msg: &PlatformMessage) -> HandlerResult {
        self.on_device_deleted(msg).await
    }
}
