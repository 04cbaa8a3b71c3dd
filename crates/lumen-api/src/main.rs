//! # lumen-api — Binary Entry Point
//!
//! Starts the Axum HTTP server for the light grid control plane.
//! Binds to a configurable port (default 4711).
//!
//! Runs against the in-memory simulated backend from `lumen-stub`, seeded
//! from the config file, so the full HTTP surface can be exercised without
//! bridge hardware on the network.

use std::hash::{Hash, Hasher};
use std::sync::Arc;

use lumen_api::config::ConfigStore;
use lumen_api::{app, AppConfig, AppState};
use lumen_backend::LightingBackend;
use lumen_stub::{InMemoryBackend, StaticDiscovery};

/// Deterministic 12-hex-digit serial for a simulated bridge address.
fn serial_for(ip: &str) -> String {
    let mut hasher = std::collections::hash_map::DefaultHasher::new();
    ip.hash(&mut hasher);
    format!("{:012x}", hasher.finish() & 0xffff_ffff_ffff)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize structured tracing.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = AppConfig::from_env();
    let store = ConfigStore::new(&config.config_path);
    let stored = store.load_or_default().map_err(|e| {
        tracing::error!(path = %config.config_path.display(), "could not read config: {e}");
        e
    })?;

    // Seed the simulated backend from the stored document. Every known
    // address is reachable; registration failures are logged and skipped
    // so one bad entry does not take the server down.
    let backend = InMemoryBackend::new();
    for ip in &stored.ips {
        backend.simulate_reachable(ip, &serial_for(ip), 3);
        let username = stored.usernames.get(&serial_for(ip)).map(String::as_str);
        match backend.add_bridge(ip, username) {
            Ok(added) => {
                tracing::info!(ip = %ip, serial = %added.serial_number, "registered bridge")
            }
            Err(e) => tracing::warn!(ip = %ip, error = %e, "skipping configured bridge"),
        }
    }
    backend.set_grid(stored.grid.clone());

    let state = AppState::new(
        Arc::new(backend),
        Arc::new(StaticDiscovery::empty()),
        store,
    );
    let app = app(state);

    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("lumen API listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
