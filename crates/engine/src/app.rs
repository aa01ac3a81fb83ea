//! Application state and composition.

use std::sync::Arc;

use grimoire_domain::RoleRegistry;

use crate::rooms::RoomRegistry;

/// Main application state, passed to HTTP/WebSocket handlers via axum
/// state.
pub struct App {
    pub rooms: RoomRegistry,
    /// Built once at startup and shared into every game; append-only
    /// after construction.
    pub roles: Arc<RoleRegistry>,
}

impl App {
    pub fn new() -> Self {
        Self {
            rooms: RoomRegistry::new(),
            roles: Arc::new(RoleRegistry::standard()),
        }
    }
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}
