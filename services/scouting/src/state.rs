//! Application state shared across handlers

use auth::session::SessionReconstructor;
use common::store::PlayerStore;
use std::{sync::Arc, time::Duration};

use crate::sessions::SessionRegistry;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub store: PlayerStore,
    pub reconstructor: Arc<SessionReconstructor>,
    pub sessions: SessionRegistry,
}

impl AppState {
    pub fn new(
        store: PlayerStore,
        reconstructor: SessionReconstructor,
        session_idle_timeout: Duration,
    ) -> Self {
        Self {
            store,
            reconstructor: Arc::new(reconstructor),
            sessions: SessionRegistry::new(session_idle_timeout),
        }
    }
}
