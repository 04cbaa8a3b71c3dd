//! # lumen-stub — Simulated Lighting Backend
//!
//! In-memory implementation of the [`lumen_backend`] traits. Designed for
//! development and testing without hardware bridges: a configurable set of
//! "reachable" addresses stands in for the vendor network, and the link
//! button is a flag a test can press.
//!
//! Storage is in-memory with no persistence — state is lost on restart.

mod backend;
mod discovery;

pub use backend::InMemoryBackend;
pub use discovery::StaticDiscovery;
