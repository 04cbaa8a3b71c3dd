//! Domain error types.
//!
//! Bridge-level failures surface to clients through the API error taxonomy;
//! grid-level failures are coordinate problems the API layer logs and skips.

use thiserror::Error;

/// Failures from bridge registration, credentials, and per-bridge commands.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BridgeError {
    /// The bridge at this address is already registered.
    #[error("bridge at {ip} is already registered")]
    AlreadyAdded { ip: String },

    /// No bridge answered at this address.
    #[error("no bridge reachable at {ip}")]
    NotFound { ip: String },

    /// No registered bridge carries this hardware identifier.
    #[error("no bridge with id {mac}")]
    UnknownMac { mac: String },

    /// Credential creation requires the bridge's physical link button.
    #[error("link button not pressed on bridge {mac}")]
    NoLinkButton { mac: String },

    /// The requested credential name was rejected.
    #[error("invalid credential name: {reason}")]
    InvalidName { reason: String },

    /// A network scan for bridges failed.
    #[error("bridge discovery failed: {reason}")]
    DiscoveryFailed { reason: String },
}

/// Failures from coordinate-addressed grid operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GridError {
    /// The coordinate lies outside the configured layout.
    #[error("({x},{y}) is outside grid bounds")]
    OutsideGrid { x: i64, y: i64 },

    /// The coordinate maps to a bridge that is not registered.
    #[error("no bridge added for ({x},{y})")]
    NoBridgeAtCoordinate { x: i64, y: i64 },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bridge_error_messages_carry_identifiers() {
        let err = BridgeError::NotFound {
            ip: "192.0.2.9".to_string(),
        };
        assert!(err.to_string().contains("192.0.2.9"));

        let err = BridgeError::UnknownMac {
            mac: "00aabbccddee".to_string(),
        };
        assert!(err.to_string().contains("00aabbccddee"));
    }

    #[test]
    fn grid_error_messages_carry_coordinates() {
        let err = GridError::OutsideGrid { x: 4, y: -1 };
        assert!(err.to_string().contains("(4,-1)"));
    }
}
