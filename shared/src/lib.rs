//! Pairing Shared Types
//!
//! This crate provides the message model and wire codec shared between the
//! pairing device service and anything that publishes onto its bus.

pub mod address;
pub mod codec;
pub mod message;
pub mod pairing;

use thiserror::Error;

// Re-export commonly used types at crate root
pub use address::{Address, AddressPattern};
pub use message::PlatformMessage;
pub use pairing::PairingRecord;

/// Errors raised while building or parsing messages
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MessageError {
    #[error("Invalid address: {0:?}")]
    InvalidAddress(String),

    #[error("Missing message type for message from {0}")]
    MissingMessageType(String),
}

/// Message type tags understood on the platform bus
pub mod message_type {
    /// An entity was created
    pub const EVENT_ADDED: &str = "base:Added";

    /// An entity was deleted
    pub const EVENT_DELETED: &str = "base:Deleted";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = MessageError::InvalidAddress("DRIV:dev".into());
        assert_eq!(err.to_string(), "Invalid address: \"DRIV:dev\"");
    }

    #[test]
    fn test_root_reexports() {
        let msg = PlatformMessage::new(Address::driver_device("abcd"), message_type::EVENT_DELETED);
        assert!(AddressPattern::driver_devices().matches(msg.source()));
    }
}
