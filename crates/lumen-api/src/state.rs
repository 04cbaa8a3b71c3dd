//! # Application State
//!
//! Shared state for the Axum application, passed to all route handlers via
//! the `State` extractor.
//!
//! The state owns exactly three things:
//! - the **lighting backend** the handlers mutate (trait object — the grid
//!   and bridge protocol live behind [`LightingBackend`]),
//! - the **discovery coordinator**, the only background-work seam in the
//!   process,
//! - the **config store** the save endpoints persist into.
//!
//! Everything else in the request path is a stateless pure function.

use std::sync::Arc;

use lumen_backend::{BridgeDiscovery, LightingBackend};

use crate::config::ConfigStore;
use crate::discovery::DiscoveryCoordinator;

/// Shared application state. Cheap to clone; clones share everything.
#[derive(Clone)]
pub struct AppState {
    pub backend: Arc<dyn LightingBackend>,
    pub discovery: DiscoveryCoordinator,
    pub config: Arc<ConfigStore>,
}

impl AppState {
    pub fn new(
        backend: Arc<dyn LightingBackend>,
        discovery: Arc<dyn BridgeDiscovery>,
        config: ConfigStore,
    ) -> Self {
        Self {
            discovery: DiscoveryCoordinator::new(discovery, Arc::clone(&backend)),
            backend,
            config: Arc::new(config),
        }
    }
}
