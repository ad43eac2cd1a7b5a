//! Platform bus messages

use uuid::Uuid;

use crate::Address;

/// A notification delivered by the platform bus
///
/// Messages are immutable once built. The place id is carried as the string
/// form of a UUID and is empty for messages that are not scoped to a place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlatformMessage {
    source: Address,
    message_type: String,
    place_id: String,
}

impl PlatformMessage {
    /// Create a message with no place
    pub fn new(source: Address, message_type: impl Into<String>) -> Self {
        Self {
            source,
            message_type: message_type.into(),
            place_id: String::new(),
        }
    }

    /// Scope the message to a place, given as a string
    pub fn with_place_id(mut self, place_id: impl Into<String>) -> Self {
        self.place_id = place_id.into();
        self
    }

    /// Scope the message to a place
    pub fn with_place(self, place_id: Uuid) -> Self {
        self.with_place_id(place_id.to_string())
    }

    /// Address of the entity the message is about
    pub fn source(&self) -> &Address {
        &self.source
    }

    pub fn message_type(&self) -> &str {
        &self.message_type
    }

    /// Place id as sent, `None` when the message carries none
    pub fn place_id(&self) -> Option<&str> {
        if self.place_id.is_empty() {
            None
        } else {
            Some(&self.place_id)
        }
    }

    /// Check the message type tag
    pub fn is(&self, message_type: &str) -> bool {
        self.message_type == message_type
    }
}
