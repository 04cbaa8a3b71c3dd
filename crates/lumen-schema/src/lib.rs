//! # lumen-schema — Structural JSON Validation
//!
//! Declarative, recursive description of an expected JSON shape, matched
//! against `serde_json::Value` documents before any business logic touches
//! them. Every mutating endpoint of the Lumen API gates its request body
//! through a [`Schema`] built once at startup.
//!
//! ## Design
//!
//! A [`Schema`] is a closed tagged variant — [`Exact`](Schema::Exact),
//! [`Union`](Schema::Union), [`Sequence`](Schema::Sequence),
//! [`Tuple`](Schema::Tuple), [`Mapping`](Schema::Mapping) — and
//! [`Schema::matches`] is a single recursive pure function over
//! `(&Schema, &Value)` with a boolean outcome. Validation produces no
//! diagnostics about *which* rule failed: callers collapse every structural
//! mismatch into one generic invalid-format response.

pub mod schema;

// Re-export primary types.
pub use schema::{Field, JsonType, Schema};
