//! Handlers that clean up pairing records in reaction to platform events

mod device_deleted;

pub use device_deleted::DeviceDeletedHandler;
