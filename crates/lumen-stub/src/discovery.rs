//! Fixed-result [`BridgeDiscovery`] implementation.

use lumen_backend::{BridgeDiscovery, BridgeError, BridgeSnapshot};

/// Discovery source that returns a preconfigured bridge list.
///
/// Stands in for the vendor network scan in development and tests.
#[derive(Debug, Clone, Default)]
pub struct StaticDiscovery {
    bridges: Vec<BridgeSnapshot>,
}

impl StaticDiscovery {
    /// Discovery that finds nothing.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Discovery that finds exactly these bridges, in order.
    pub fn new(bridges: Vec<BridgeSnapshot>) -> Self {
        Self { bridges }
    }
}

impl BridgeDiscovery for StaticDiscovery {
    fn discover(&self) -> Result<Vec<BridgeSnapshot>, BridgeError> {
        Ok(self.bridges.clone())
    }
}
