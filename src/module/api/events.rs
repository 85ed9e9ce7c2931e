//! Host lifecycle signals
//!
//! The host emits each signal once. `ContentReady` corresponds to the document
//! being parsed (the point where declarative markup can be inspected), and
//! `Loaded` to the host's full load. Content readiness always comes first.

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

/// Lifecycle signal delivered by the host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HostEvent {
    /// Document content is ready; runs the screen-context auto-include sweep
    ContentReady,
    /// Host finished loading; releases includes deferred until host ready
    Loaded,
}

/// Sending half used by the host to deliver lifecycle signals
pub type HostEventSender = mpsc::UnboundedSender<HostEvent>;

/// Receiving half handed to the module manager at construction
pub type HostEventReceiver = mpsc::UnboundedReceiver<HostEvent>;

/// Create a host signal channel
pub fn host_event_channel() -> (HostEventSender, HostEventReceiver) {
    mpsc::unbounded_channel()
}
