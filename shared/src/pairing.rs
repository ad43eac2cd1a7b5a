//! Pairing device records

use uuid::Uuid;

/// Pairing lifecycle state of one device within one place
///
/// Records are keyed by `(place_id, sequence_id)`. The device address is only
/// known once a driver has been bound to the device, so it is optional; a
/// record without one never matches a device address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PairingRecord {
    pub place_id: Uuid,
    pub sequence_id: u32,
    pub protocol_address: String,
    pub device_address: Option<String>,
}

impl PairingRecord {
    /// Create a record for a device that has not been bound to a driver yet
    pub fn new(place_id: Uuid, sequence_id: u32, protocol_address: impl Into<String>) -> Self {
        Self {
            place_id,
            sequence_id,
            protocol_address: protocol_address.into(),
            device_address: None,
        }
    }

    /// Attach the address of the driver-bound device
    pub fn with_device_address(mut self, device_address: impl Into<String>) -> Self {
        self.device_address = Some(device_address.into());
        self
    }

    pub fn device_address(&self) -> Option<&str> {
        self.device_address.as_deref()
    }

    /// Exact, case-sensitive comparison against a device address
    pub fn is_for_device(&self, address: &str) -> bool {
        self.device_address() == Some(address)
    }

    /// Store key
    pub fn key(&self) -> (Uuid, u32) {
        (self.place_id, self.sequence_id)
    }
}
