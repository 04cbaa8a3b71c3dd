//! # lumen-backend — Lighting Backend Interface
//!
//! Typed boundary between the Lumen control plane and the bridge/grid domain
//! it drives. The API layer never talks to hardware: it calls the
//! [`LightingBackend`] and [`BridgeDiscovery`] traits, and implementations
//! own addressing, credentials, and wire protocol.
//!
//! ## Crate Policy
//!
//! - All trait methods are synchronous from the caller's point of view;
//!   implementations are responsible for their own internal consistency
//!   under concurrent callers (`Send + Sync` bounds).
//! - Domain failures are values, never panics: every fallible operation
//!   returns a [`BridgeError`] or [`GridError`].

pub mod error;
pub mod types;

pub use error::{BridgeError, GridError};
pub use types::{BridgeSnapshot, ChangeFields, GridCell, GridLayout};

/// Interface to the grid of addressable lighting fixtures and the vendor
/// bridges that control them.
///
/// Bridges are keyed by their hardware identifier (`mac`, the bridge serial
/// number). Coordinate-addressed operations (`set_state`, `set_all`) go
/// through the logical grid layout; `commit` flushes buffered coordinate
/// changes to the bridges.
pub trait LightingBackend: Send + Sync {
    /// Stage a state change for the fixture at grid coordinate `(x, y)`.
    fn set_state(&self, x: i64, y: i64, change: &ChangeFields) -> Result<(), GridError>;

    /// Stage a state change for every fixture in the grid.
    fn set_all(&self, change: &ChangeFields);

    /// Flush staged coordinate changes to the bridges.
    fn commit(&self);

    /// Register the bridge reachable at `ip`, optionally with a credential.
    fn add_bridge(
        &self,
        ip: &str,
        username: Option<&str>,
    ) -> Result<BridgeSnapshot, BridgeError>;

    /// Snapshot every registered bridge.
    fn list_bridges(&self) -> Vec<BridgeSnapshot>;

    /// Whether a bridge with this hardware identifier is registered.
    fn has_bridge(&self, mac: &str) -> bool;

    /// Deregister a bridge.
    fn remove_bridge(&self, mac: &str) -> Result<(), BridgeError>;

    /// Replace a bridge's credential. `None` clears it.
    fn set_username(
        &self,
        mac: &str,
        username: Option<&str>,
    ) -> Result<BridgeSnapshot, BridgeError>;

    /// Change one lamp on one bridge, bypassing the grid.
    fn set_light(&self, mac: &str, light: i64, change: &ChangeFields)
        -> Result<(), BridgeError>;

    /// Change a lamp group on one bridge. Group `0` is every lamp the
    /// bridge knows.
    fn set_group(&self, mac: &str, group: i64, change: &ChangeFields)
        -> Result<(), BridgeError>;

    /// Ask a bridge to scan for new lamps on its own radio.
    fn search_lights(&self, mac: &str) -> Result<(), BridgeError>;

    /// Create a credential on a bridge. Returns the granted username.
    fn create_user(
        &self,
        mac: &str,
        device_type: &str,
        username: Option<&str>,
    ) -> Result<String, BridgeError>;

    /// Replace the logical grid layout.
    fn set_grid(&self, rows: Vec<Vec<GridCell>>);

    /// Current logical grid layout with its dimensions.
    fn grid(&self) -> GridLayout;
}

/// Network scan for bridges not yet registered.
///
/// One long-running, synchronous call; the control plane runs it on a
/// background task and never invokes it concurrently with itself.
pub trait BridgeDiscovery: Send + Sync {
    /// Scan for bridges, returning them in discovery order.
    fn discover(&self) -> Result<Vec<BridgeSnapshot>, BridgeError>;
}
