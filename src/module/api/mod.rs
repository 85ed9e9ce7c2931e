//! Host-facing API
//!
//! Lifecycle signals and host environment implementations.

pub mod events;
pub mod host;

pub use events::{host_event_channel, HostEvent, HostEventReceiver, HostEventSender};
pub use host::StaticHost;
