//! API handlers for the Web API.

pub mod inbound;
pub mod inbox;
pub mod session;

pub use inbound::*;
pub use inbox::*;
pub use session::*;

use crate::session::SessionEngine;

/// Shared application state for handlers.
#[derive(Clone)]
pub struct AppState {
    /// The mailbox lifecycle engine.
    pub engine: SessionEngine,
}

impl AppState {
    /// Create application state around an engine.
    pub fn new(engine: SessionEngine) -> Self {
        Self { engine }
    }
}
