//! Persisted per-series visibility and the scalar orientation flags
//!
//! Visibility is a cosmetic preference: load never trusts persisted data to
//! be complete (it starts from the hard-coded default map and overlays
//! persisted values per key, so newly introduced series are not silently
//! lost), and a failed write is swallowed and logged, and the in-memory map
//! stays authoritative for the session.
//!
//! The "stacked" and "flipped" booleans are not part of any map; they
//! persist independently under their own keys ([`ViewFlags`]).

use std::collections::HashMap;

use crate::store::{get_typed, set_typed, KeyValueStore};
use crate::types::{SeriesKey, VisibilityMap};

/// Default storage key for the main chart's visibility map
pub const MAIN_CHART_VISIBILITY_KEY: &str = "chart.main.visibility";

/// Storage key for the stacked flag
pub const STACKED_KEY: &str = "chart.stacked";

/// Storage key for the flipped flag
pub const FLIPPED_KEY: &str = "chart.flipped";

/// Persisted series visibility for one chart
///
/// Two charts keep two independent maps by using distinct storage keys.
#[derive(Debug, Clone)]
pub struct VisibilityStore {
    storage_key: String,
    defaults: VisibilityMap,
}

impl VisibilityStore {
    /// Create a store with the given storage key and default map
    pub fn new(storage_key: impl Into<String>, defaults: VisibilityMap) -> Self {
        Self {
            storage_key: storage_key.into(),
            defaults,
        }
    }

    /// The hard-coded defaults this store merges against
    pub fn defaults(&self) -> &VisibilityMap {
        &self.defaults
    }

    /// Load the visibility map: defaults overlaid with persisted values
    ///
    /// Persisted values win per key; keys absent from persisted data take
    /// the default. Persisted keys unknown to the default map are kept, so a
    /// hidden series stays hidden across a client rename race.
    pub fn load(&self, store: &dyn KeyValueStore) -> VisibilityMap {
        let mut map = self.defaults.clone();
        if let Some(persisted) = get_typed::<HashMap<SeriesKey, bool>>(store, &self.storage_key) {
            for (key, shown) in persisted {
                map.insert(key, shown);
            }
        }
        map
    }

    /// Flip exactly one key and persist the full resulting map
    ///
    /// A key absent from the map starts at its default (shown when unknown)
    /// before flipping. Persistence failure is logged and swallowed; the
    /// returned map is authoritative for the session either way.
    pub fn toggle(
        &self,
        store: &mut dyn KeyValueStore,
        map: &VisibilityMap,
        key: &SeriesKey,
    ) -> VisibilityMap {
        let mut updated = map.clone();
        let current = updated
            .get(key)
            .copied()
            .unwrap_or_else(|| self.defaults.get(key).copied().unwrap_or(true));
        updated.insert(key.clone(), !current);

        if let Err(e) = set_typed(store, &self.storage_key, &updated) {
            tracing::warn!("Failed to persist visibility for '{}': {}", key, e);
        }
        updated
    }
}

/// The independent scalar chart flags
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewFlags {
    /// Render per-client series as a stacked area rather than lines
    pub stacked: bool,
    /// Orientation: false renders download above the axis, true upload
    pub flipped: bool,
}

impl Default for ViewFlags {
    fn default() -> Self {
        Self {
            stacked: true,
            flipped: false,
        }
    }
}

impl ViewFlags {
    /// Load both flags, defaulting each independently
    pub fn load(store: &dyn KeyValueStore) -> Self {
        let defaults = Self::default();
        Self {
            stacked: get_typed(store, STACKED_KEY).unwrap_or(defaults.stacked),
            flipped: get_typed(store, FLIPPED_KEY).unwrap_or(defaults.flipped),
        }
    }

    /// Set and persist the stacked flag
    pub fn set_stacked(&mut self, store: &mut dyn KeyValueStore, stacked: bool) {
        self.stacked = stacked;
        if let Err(e) = set_typed(store, STACKED_KEY, &stacked) {
            tracing::warn!("Failed to persist stacked flag: {}", e);
        }
    }

    /// Set and persist the flipped flag
    pub fn set_flipped(&mut self, store: &mut dyn KeyValueStore, flipped: bool) {
        self.flipped = flipped;
        if let Err(e) = set_typed(store, FLIPPED_KEY, &flipped) {
            tracing::warn!("Failed to persist flipped flag: {}", e);
        }
    }
}
