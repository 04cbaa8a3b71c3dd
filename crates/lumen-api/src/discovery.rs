//! # Discovery Coordinator
//!
//! Single-flight background runner for bridge discovery. At most one scan
//! runs at a time; concurrent start requests are rejected with
//! `CURRENTLY_SEARCHING`, and pollers see either the last fully completed
//! snapshot or the same rejection — never a partial result.
//!
//! The `running` flag and the snapshot live under one `parking_lot::Mutex`.
//! The flag flips `false -> true` inside `request_search` (so exactly one
//! caller wins an idle period) and is released by a drop guard on the
//! background task, which covers the success path, the discovery-failure
//! path, and panics alike; a scan that dies can never leave the coordinator
//! wedged in the searching state.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use lumen_backend::{BridgeDiscovery, BridgeError, BridgeSnapshot, LightingBackend};

use crate::error::{ApiError, ErrorCode};

/// Result of the last fully completed discovery run.
///
/// Written exactly once per run, after the run completes; `completed_at`
/// is `None` until the first run finishes ("never run").
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct DiscoverySnapshot {
    pub completed_at: Option<DateTime<Utc>>,
    pub bridges: Vec<BridgeSnapshot>,
}

#[derive(Default)]
struct CoordinatorState {
    running: bool,
    snapshot: DiscoverySnapshot,
}

/// Releases the searching state when the background run ends, however it
/// ends.
struct SearchGuard {
    state: Arc<Mutex<CoordinatorState>>,
}

impl Drop for SearchGuard {
    fn drop(&mut self) {
        self.state.lock().running = false;
    }
}

/// Process-wide coordinator for bridge discovery runs.
pub struct DiscoveryCoordinator {
    discovery: Arc<dyn BridgeDiscovery>,
    backend: Arc<dyn LightingBackend>,
    state: Arc<Mutex<CoordinatorState>>,
}

impl Clone for DiscoveryCoordinator {
    fn clone(&self) -> Self {
        Self {
            discovery: Arc::clone(&self.discovery),
            backend: Arc::clone(&self.backend),
            state: Arc::clone(&self.state),
        }
    }
}

impl DiscoveryCoordinator {
    /// Create an idle coordinator with a never-run snapshot.
    pub fn new(discovery: Arc<dyn BridgeDiscovery>, backend: Arc<dyn LightingBackend>) -> Self {
        Self {
            discovery,
            backend,
            state: Arc::new(Mutex::new(CoordinatorState::default())),
        }
    }

    /// Start a background scan, or reject if one is in flight.
    ///
    /// Fire-and-forget: the caller gets its answer immediately and the scan
    /// runs on a blocking task. Must be called from within a Tokio runtime.
    pub fn request_search(&self, auto_add: bool) -> Result<(), ApiError> {
        {
            let mut state = self.state.lock();
            if state.running {
                return Err(ErrorCode::CurrentlySearching.into());
            }
            state.running = true;
        }

        let coordinator = self.clone();
        tokio::task::spawn_blocking(move || coordinator.run(auto_add));
        Ok(())
    }

    /// The last completed snapshot, or a rejection while a scan is running.
    pub fn poll_status(&self) -> Result<DiscoverySnapshot, ApiError> {
        let state = self.state.lock();
        if state.running {
            return Err(ErrorCode::CurrentlySearching.into());
        }
        Ok(state.snapshot.clone())
    }

    /// The background run. `running` is already `true` on entry and is
    /// released by the guard on every exit path.
    fn run(&self, auto_add: bool) {
        let _guard = SearchGuard {
            state: Arc::clone(&self.state),
        };

        tracing::info!("running bridge discovery");
        let found = match self.discovery.discover() {
            Ok(found) => found,
            Err(err) => {
                // The previous snapshot stays published; this run is lost.
                tracing::error!(error = %err, "bridge discovery failed");
                return;
            }
        };
        tracing::debug!(count = found.len(), "bridge discovery returned");

        if auto_add {
            tracing::info!("auto-adding discovered bridges");
            for bridge in &found {
                match self.backend.add_bridge(&bridge.ip_address, None) {
                    Ok(added) => {
                        tracing::info!(serial = %added.serial_number, "added bridge");
                    }
                    Err(BridgeError::AlreadyAdded { .. }) => {
                        tracing::info!(serial = %bridge.serial_number, "bridge already added");
                    }
                    Err(err) => {
                        tracing::warn!(
                            serial = %bridge.serial_number,
                            error = %err,
                            "could not auto-add bridge"
                        );
                    }
                }
            }
        }

        // One atomic publication; pollers are rejected until the guard
        // drops, so a partially built snapshot is never observable.
        self.state.lock().snapshot = DiscoverySnapshot {
            completed_at: Some(Utc::now()),
            bridges: found,
        };
        tracing::info!("bridge discovery finished");
    }
}
