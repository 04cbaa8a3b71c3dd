//! Domain types shared between the API layer and backend implementations.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Opaque light-state delta (`{"on": true, "hue": 40000, ...}`).
///
/// The control plane validates only that a change is a JSON object; the
/// field vocabulary belongs to the bridge vendor.
pub type ChangeFields = serde_json::Map<String, serde_json::Value>;

/// Point-in-time view of one registered (or discovered) bridge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct BridgeSnapshot {
    /// Hardware identifier ("mac"); 12 lowercase hex characters.
    pub serial_number: String,
    /// Network address the bridge was registered at.
    pub ip_address: String,
    /// Credential used against the bridge, if any.
    pub username: Option<String>,
    /// Whether the credential is currently accepted by the bridge.
    pub logged_in: bool,
    /// Number of lamps the bridge reports, or `-1` when not logged in.
    pub lights: i64,
}

/// One cell of the logical grid: which lamp on which bridge sits at a
/// coordinate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct GridCell {
    /// Bridge hardware identifier.
    pub mac: String,
    /// Lamp number on that bridge.
    pub lamp: i64,
}

/// The logical 2-D layout mapping coordinates to (bridge, lamp) pairs.
///
/// `height` is the row count; `width` is the widest row. Rows may be
/// ragged — a coordinate outside its row is outside the grid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct GridLayout {
    pub rows: Vec<Vec<GridCell>>,
    pub width: usize,
    pub height: usize,
}

impl GridLayout {
    /// Build a layout from rows, deriving the dimensions.
    pub fn new(rows: Vec<Vec<GridCell>>) -> Self {
        let height = rows.len();
        let width = rows.iter().map(Vec::len).max().unwrap_or(0);
        Self {
            rows,
            width,
            height,
        }
    }
}
