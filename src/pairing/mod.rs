//! Pairing device bookkeeping
//!
//! This module handles:
//! - Access to the pairing device records of a place
//! - The shared delete capability used by every cleanup handler
//! - Handlers that react to platform events by cleaning up pairing records

mod delete;
pub mod handlers;
mod store;

pub use delete::{DeleteOperation, StoreDeleteOperation};
pub use store::{InMemoryPairingRecordStore, PairingRecordStore};

#[cfg(test)]
pub use delete::MockDeleteOperation;
#[cfg(test)]
pub use store::MockPairingRecordStore;
