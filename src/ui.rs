//! Outbound status surface toward the host HUD
//!
//! After every frame that changed session state the simulation publishes a
//! partial update carrying exactly the fields that changed. The HUD layer
//! renders it however it likes; nothing flows back through this interface.

use crate::sim::session::SessionDelta;

/// Receiver for partial session-state updates.
pub trait StatusSink {
    fn session_update(&mut self, delta: &SessionDelta);
}

/// Status sink that drops every update. Used for headless runs and tests.
#[derive(Debug, Default)]
pub struct NullStatus;

impl StatusSink for NullStatus {
    fn session_update(&mut self, _delta: &SessionDelta) {}
}
