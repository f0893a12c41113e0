//! Adapter implementations for the tracker ports.

mod channel;
pub mod memory;

pub use channel::ChannelTransport;
