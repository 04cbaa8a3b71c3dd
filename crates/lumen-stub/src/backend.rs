//! In-memory [`LightingBackend`] implementation.
//!
//! All operations are synchronous under a single `parking_lot::RwLock`;
//! the lock is never held across an await point because nothing here is
//! async. Clones share the same underlying state.

use std::collections::BTreeMap;
use std::sync::Arc;

use parking_lot::RwLock;

use lumen_backend::{
    BridgeError, BridgeSnapshot, ChangeFields, GridCell, GridError, GridLayout, LightingBackend,
};

/// Longest credential name a simulated bridge accepts.
const MAX_USERNAME_LEN: usize = 40;

/// A bridge the simulated network will answer for.
#[derive(Debug, Clone)]
struct Seed {
    serial: String,
    lights: i64,
}

/// One registered simulated bridge.
#[derive(Debug, Clone)]
struct SimBridge {
    serial: String,
    ip: String,
    username: Option<String>,
    logged_in: bool,
    lights: i64,
    link_button: bool,
    lamp_state: BTreeMap<i64, ChangeFields>,
    lamp_searches: u32,
}

impl SimBridge {
    fn snapshot(&self) -> BridgeSnapshot {
        BridgeSnapshot {
            serial_number: self.serial.clone(),
            ip_address: self.ip.clone(),
            username: self.username.clone(),
            logged_in: self.logged_in,
            lights: if self.logged_in { self.lights } else { -1 },
        }
    }
}

#[derive(Debug, Default)]
struct Inner {
    reachable: BTreeMap<String, Seed>,
    bridges: BTreeMap<String, SimBridge>,
    grid: Vec<Vec<GridCell>>,
    staged: Vec<(String, i64, ChangeFields)>,
    user_counter: u64,
}

/// Thread-safe, cloneable simulated backend.
#[derive(Debug, Default)]
pub struct InMemoryBackend {
    inner: Arc<RwLock<Inner>>,
}

impl Clone for InMemoryBackend {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl InMemoryBackend {
    /// Create an empty backend with no reachable bridges.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make a bridge answer at `ip` with the given serial and lamp count.
    pub fn simulate_reachable(&self, ip: &str, serial: &str, lights: i64) {
        self.inner.write().reachable.insert(
            ip.to_string(),
            Seed {
                serial: serial.to_string(),
                lights,
            },
        );
    }

    /// Press the physical link button on a registered bridge.
    pub fn press_link_button(&self, mac: &str) -> bool {
        let mut guard = self.inner.write();
        match guard.bridges.get_mut(mac) {
            Some(bridge) => {
                bridge.link_button = true;
                true
            }
            None => false,
        }
    }

    /// Committed state of one lamp, for test assertions.
    pub fn lamp_state(&self, mac: &str, lamp: i64) -> Option<ChangeFields> {
        self.inner
            .read()
            .bridges
            .get(mac)
            .and_then(|b| b.lamp_state.get(&lamp).cloned())
    }

    /// Number of changes staged but not yet committed, for test assertions.
    pub fn staged_changes(&self) -> usize {
        self.inner.read().staged.len()
    }

    /// How many lamp searches a bridge has run, for test assertions.
    pub fn lamp_search_count(&self, mac: &str) -> Option<u32> {
        self.inner.read().bridges.get(mac).map(|b| b.lamp_searches)
    }

    fn validate_username(name: &str) -> Result<(), BridgeError> {
        if name.is_empty() {
            return Err(BridgeError::InvalidName {
                reason: "username must not be empty".to_string(),
            });
        }
        if name.len() > MAX_USERNAME_LEN {
            return Err(BridgeError::InvalidName {
                reason: format!("username exceeds {MAX_USERNAME_LEN} characters"),
            });
        }
        if !name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, ' ' | '-' | '_'))
        {
            return Err(BridgeError::InvalidName {
                reason: "username contains unsupported characters".to_string(),
            });
        }
        Ok(())
    }
}

impl LightingBackend for InMemoryBackend {
    fn set_state(&self, x: i64, y: i64, change: &ChangeFields) -> Result<(), GridError> {
        let mut guard = self.inner.write();
        let cell = usize::try_from(y)
            .ok()
            .and_then(|row| guard.grid.get(row))
            .and_then(|row| usize::try_from(x).ok().and_then(|col| row.get(col)))
            .cloned()
            .ok_or(GridError::OutsideGrid { x, y })?;
        if !guard.bridges.contains_key(&cell.mac) {
            return Err(GridError::NoBridgeAtCoordinate { x, y });
        }
        guard.staged.push((cell.mac, cell.lamp, change.clone()));
        Ok(())
    }

    fn set_all(&self, change: &ChangeFields) {
        let mut guard = self.inner.write();
        let cells: Vec<GridCell> = guard.grid.iter().flatten().cloned().collect();
        for cell in cells {
            if guard.bridges.contains_key(&cell.mac) {
                guard.staged.push((cell.mac, cell.lamp, change.clone()));
            }
        }
    }

    fn commit(&self) {
        let mut guard = self.inner.write();
        let staged = std::mem::take(&mut guard.staged);
        for (mac, lamp, change) in staged {
            if let Some(bridge) = guard.bridges.get_mut(&mac) {
                let slot = bridge.lamp_state.entry(lamp).or_default();
                for (k, v) in change {
                    slot.insert(k, v);
                }
            }
        }
    }

    fn add_bridge(
        &self,
        ip: &str,
        username: Option<&str>,
    ) -> Result<BridgeSnapshot, BridgeError> {
        let mut guard = self.inner.write();
        let seed = guard
            .reachable
            .get(ip)
            .cloned()
            .ok_or_else(|| BridgeError::NotFound { ip: ip.to_string() })?;
        if guard.bridges.contains_key(&seed.serial) {
            return Err(BridgeError::AlreadyAdded { ip: ip.to_string() });
        }
        let bridge = SimBridge {
            serial: seed.serial.clone(),
            ip: ip.to_string(),
            username: username.map(str::to_string),
            logged_in: username.is_some(),
            lights: seed.lights,
            link_button: false,
            lamp_state: BTreeMap::new(),
            lamp_searches: 0,
        };
        let snapshot = bridge.snapshot();
        guard.bridges.insert(seed.serial, bridge);
        Ok(snapshot)
    }

    fn list_bridges(&self) -> Vec<BridgeSnapshot> {
        self.inner
            .read()
            .bridges
            .values()
            .map(SimBridge::snapshot)
            .collect()
    }

    fn has_bridge(&self, mac: &str) -> bool {
        self.inner.read().bridges.contains_key(mac)
    }

    fn remove_bridge(&self, mac: &str) -> Result<(), BridgeError> {
        match self.inner.write().bridges.remove(mac) {
            Some(_) => Ok(()),
            None => Err(BridgeError::UnknownMac {
                mac: mac.to_string(),
            }),
        }
    }

    fn set_username(
        &self,
        mac: &str,
        username: Option<&str>,
    ) -> Result<BridgeSnapshot, BridgeError> {
        let mut guard = self.inner.write();
        let bridge = guard
            .bridges
            .get_mut(mac)
            .ok_or_else(|| BridgeError::UnknownMac {
                mac: mac.to_string(),
            })?;
        bridge.username = username.map(str::to_string);
        bridge.logged_in = username.is_some();
        Ok(bridge.snapshot())
    }

    fn set_light(
        &self,
        mac: &str,
        light: i64,
        change: &ChangeFields,
    ) -> Result<(), BridgeError> {
        let mut guard = self.inner.write();
        let bridge = guard
            .bridges
            .get_mut(mac)
            .ok_or_else(|| BridgeError::UnknownMac {
                mac: mac.to_string(),
            })?;
        let slot = bridge.lamp_state.entry(light).or_default();
        for (k, v) in change {
            slot.insert(k.clone(), v.clone());
        }
        Ok(())
    }

    fn set_group(
        &self,
        mac: &str,
        _group: i64,
        change: &ChangeFields,
    ) -> Result<(), BridgeError> {
        let mut guard = self.inner.write();
        let bridge = guard
            .bridges
            .get_mut(mac)
            .ok_or_else(|| BridgeError::UnknownMac {
                mac: mac.to_string(),
            })?;
        for lamp in 0..bridge.lights.max(0) {
            let slot = bridge.lamp_state.entry(lamp).or_default();
            for (k, v) in change {
                slot.insert(k.clone(), v.clone());
            }
        }
        Ok(())
    }

    fn search_lights(&self, mac: &str) -> Result<(), BridgeError> {
        let mut guard = self.inner.write();
        let bridge = guard
            .bridges
            .get_mut(mac)
            .ok_or_else(|| BridgeError::UnknownMac {
                mac: mac.to_string(),
            })?;
        bridge.lamp_searches += 1;
        Ok(())
    }

    fn create_user(
        &self,
        mac: &str,
        device_type: &str,
        username: Option<&str>,
    ) -> Result<String, BridgeError> {
        let mut guard = self.inner.write();
        guard.user_counter += 1;
        let counter = guard.user_counter;
        let bridge = guard
            .bridges
            .get_mut(mac)
            .ok_or_else(|| BridgeError::UnknownMac {
                mac: mac.to_string(),
            })?;
        if !bridge.link_button {
            return Err(BridgeError::NoLinkButton {
                mac: mac.to_string(),
            });
        }
        if device_type.trim().is_empty() {
            return Err(BridgeError::InvalidName {
                reason: "device type must not be empty".to_string(),
            });
        }
        let name = match username {
            Some(name) => {
                Self::validate_username(name)?;
                name.to_string()
            }
            None => format!("{}-user-{counter}", bridge.serial),
        };
        bridge.username = Some(name.clone());
        bridge.logged_in = true;
        bridge.link_button = false;
        Ok(name)
    }

    fn set_grid(&self, rows: Vec<Vec<GridCell>>) {
        self.inner.write().grid = rows;
    }

    fn grid(&self) -> GridLayout {
        GridLayout::new(self.inner.read().grid.clone())
    }
}
