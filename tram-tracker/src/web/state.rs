//! Application state for the web layer.

use std::sync::Arc;

use crate::arrival::ArrivalState;
use crate::engine::StateReceiver;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Latest published arrival state
    pub arrivals: StateReceiver,
}

impl AppState {
    /// Create a new app state reading from `arrivals`.
    pub fn new(arrivals: StateReceiver) -> Self {
        Self { arrivals }
    }

    /// The state to render right now.
    pub fn current(&self) -> Arc<ArrivalState> {
        Arc::clone(&self.arrivals.borrow())
    }
}
