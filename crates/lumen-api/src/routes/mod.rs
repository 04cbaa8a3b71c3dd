//! # API Route Modules
//!
//! - `lights` — coordinate-addressed changes through the logical grid.
//! - `bridges` — bridge registry: list, add, update, remove, per-bridge
//!   lamp commands, credential creation, persistence.
//! - `grid` — read/replace the logical grid layout, persistence.
//! - `search` — discovery kick-off and polling, backed by the
//!   single-flight coordinator.

pub mod bridges;
pub mod grid;
pub mod lights;
pub mod search;
