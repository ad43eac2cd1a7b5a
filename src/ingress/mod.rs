//! Bus ingress
//!
//! Accepts framed platform messages over TCP and hands each one to the
//! dispatcher.

mod listener;

pub use listener::BusListener;
