//! Message routing for the platform bus
//!
//! This module handles:
//! - The routing table mapping (source pattern, message type) to handlers
//! - Invoking every handler subscribed to an incoming message
//! - Error policy for failed handlers (logging and dead-lettering)

mod dispatcher;

pub use dispatcher::{DeadLetter, Dispatcher, MessageHandler};
