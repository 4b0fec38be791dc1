//! Dashboard coordinator
//!
//! Owns the persisted view state, the enabled-client set, and the most
//! recent sample batch, and re-runs the pure chart pipeline on demand. All
//! persistence happens here at the boundary; the pipeline itself never
//! touches storage.
//!
//! # Poll handling
//!
//! Poll results apply last-writer-wins by issuance sequence: a batch whose
//! sequence is not newer than the last applied one is discarded rather than
//! applied out of order. A failed fetch retains the previously displayed
//! dataset (stale-but-valid beats no data) and raises a transient error
//! indicator that the next good batch clears.

use crate::error::Result;
use crate::pipeline::{build_chart, ChartData, ChartView, Resolution, ZoomRange};
use crate::source::{PollStats, PollerMessage};
use crate::store::visibility::MAIN_CHART_VISIBILITY_KEY;
use crate::store::{move_to_front, reconcile, KeyValueStore, StackOrderStore, ViewFlags, VisibilityStore};
use crate::types::{Client, ClientId, Sample, SeriesKey, VisibilityMap};
use std::borrow::Cow;

/// Host-side owner of view state, client set, and the current dataset
pub struct Dashboard<K: KeyValueStore> {
    kv: K,
    visibility_store: VisibilityStore,
    order_store: StackOrderStore,

    clients: Vec<Client>,
    visibility: VisibilityMap,
    flags: ViewFlags,
    stack_order: Vec<ClientId>,
    resolution: Resolution,
    zoom: Option<ZoomRange>,

    samples: Vec<Sample>,
    last_applied_seq: Option<u64>,
    fetch_error: Option<String>,
    poll_stats: Option<PollStats>,
}

/// Hard-coded visibility defaults for a client set
///
/// Measured speeds, configured limits, stream bitrate, and WAN counters are
/// shown; the active-stream count is an overlay most users leave off.
pub fn default_visibility(clients: &[Client]) -> VisibilityMap {
    let mut map = VisibilityMap::new();
    for client in clients {
        if client.download_enabled {
            map.insert(SeriesKey::ClientDownload(client.id.clone()), true);
            if client.download_limit_kbps.is_some() {
                map.insert(SeriesKey::ClientDownloadLimit(client.id.clone()), true);
            }
        }
        if client.upload_enabled {
            map.insert(SeriesKey::ClientUpload(client.id.clone()), true);
            if client.upload_limit_kbps.is_some() {
                map.insert(SeriesKey::ClientUploadLimit(client.id.clone()), true);
            }
        }
    }
    map.insert(SeriesKey::StreamBitrate, true);
    map.insert(SeriesKey::StreamCount, false);
    map.insert(SeriesKey::WanDownload, true);
    map.insert(SeriesKey::WanUpload, true);
    map
}

impl<K: KeyValueStore> Dashboard<K> {
    /// Create a dashboard, loading persisted view state from `kv`
    ///
    /// The persisted stack order is reconciled against the enabled clients
    /// immediately; the result is persisted only if it changed.
    pub fn new(kv: K, clients: Vec<Client>) -> Self {
        let visibility_store =
            VisibilityStore::new(MAIN_CHART_VISIBILITY_KEY, default_visibility(&clients));
        let order_store = StackOrderStore::default();

        let visibility = visibility_store.load(&kv);
        let flags = ViewFlags::load(&kv);
        let stack_order = order_store.load(&kv);

        let mut dashboard = Self {
            kv,
            visibility_store,
            order_store,
            clients,
            visibility,
            flags,
            stack_order,
            resolution: Resolution::Raw,
            zoom: None,
            samples: Vec::new(),
            last_applied_seq: None,
            fetch_error: None,
            poll_stats: None,
        };
        dashboard.reconcile_stack_order();
        dashboard
    }

    /// Apply a message from the poller
    pub fn apply_message(&mut self, msg: PollerMessage) {
        match msg {
            PollerMessage::Batch { seq, samples } => {
                if self.is_stale(seq) {
                    tracing::trace!("Discarding stale poll result {}", seq);
                    return;
                }
                self.last_applied_seq = Some(seq);
                self.samples = samples;
                self.fetch_error = None;
            }
            PollerMessage::FetchError { seq, error } => {
                if self.is_stale(seq) {
                    tracing::trace!("Ignoring stale poll failure {}", seq);
                    return;
                }
                // Keep the previous dataset; only surface the indicator
                tracing::warn!("Poll {} failed: {}", seq, error);
                self.fetch_error = Some(error);
            }
            PollerMessage::Stats(stats) => {
                self.poll_stats = Some(stats);
            }
            PollerMessage::Shutdown => {
                tracing::debug!("Poller shut down");
            }
        }
    }

    fn is_stale(&self, seq: u64) -> bool {
        matches!(self.last_applied_seq, Some(last) if seq <= last)
    }

    /// Run the chart pipeline over the current dataset and view state
    pub fn chart(&self) -> Result<ChartData> {
        let view = ChartView {
            resolution: self.resolution,
            zoom: self.zoom,
            visibility: self.visibility.clone(),
            flipped: self.flags.flipped,
        };
        build_chart(&self.samples, &view)
    }

    /// Flip one series' visibility and persist the map
    pub fn toggle_series(&mut self, key: &SeriesKey) {
        self.visibility = self
            .visibility_store
            .toggle(&mut self.kv, &self.visibility, key);
    }

    /// Set and persist the orientation flag
    pub fn set_flipped(&mut self, flipped: bool) {
        self.flags.set_flipped(&mut self.kv, flipped);
    }

    /// Set and persist the stacked flag
    pub fn set_stacked(&mut self, stacked: bool) {
        self.flags.set_stacked(&mut self.kv, stacked);
    }

    /// Change the bucketing resolution
    pub fn set_resolution(&mut self, resolution: Resolution) {
        self.resolution = resolution;
    }

    /// Change the zoom sub-range
    pub fn set_zoom(&mut self, zoom: Option<ZoomRange>) {
        self.zoom = zoom;
    }

    /// Move a client to the innermost draw position and persist the order
    pub fn move_client_to_front(&mut self, id: &ClientId) {
        self.stack_order = move_to_front(&self.stack_order, id);
        self.order_store.save(&mut self.kv, &self.stack_order);
    }

    /// Replace the client set, refresh defaults, and reconcile the order
    pub fn set_clients(&mut self, clients: Vec<Client>) {
        self.clients = clients;
        self.visibility_store =
            VisibilityStore::new(MAIN_CHART_VISIBILITY_KEY, default_visibility(&self.clients));
        self.visibility = self.visibility_store.load(&self.kv);
        self.reconcile_stack_order();
    }

    /// Re-read persisted view state (another window may have changed it)
    pub fn reload_view_state(&mut self) {
        self.visibility = self.visibility_store.load(&self.kv);
        self.flags = ViewFlags::load(&self.kv);
        self.stack_order = self.order_store.load(&self.kv);
        self.reconcile_stack_order();
    }

    /// Reconcile the stack order against the enabled clients, persisting
    /// only when the order actually changed
    fn reconcile_stack_order(&mut self) {
        let enabled: Vec<ClientId> = self
            .clients
            .iter()
            .filter(|c| c.is_enabled())
            .map(|c| c.id.clone())
            .collect();

        let updated = match reconcile(&self.stack_order, &enabled) {
            Cow::Borrowed(_) => None,
            Cow::Owned(order) => Some(order),
        };
        if let Some(order) = updated {
            self.stack_order = order;
            self.order_store.save(&mut self.kv, &self.stack_order);
        }
    }

    /// The current raw dataset
    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    /// The current visibility map
    pub fn visibility(&self) -> &VisibilityMap {
        &self.visibility
    }

    /// The current scalar chart flags
    pub fn flags(&self) -> ViewFlags {
        self.flags
    }

    /// The current stack order
    pub fn stack_order(&self) -> &[ClientId] {
        &self.stack_order
    }

    /// The configured clients
    pub fn clients(&self) -> &[Client] {
        &self.clients
    }

    /// The current resolution
    pub fn resolution(&self) -> Resolution {
        self.resolution
    }

    /// Transient fetch-error indicator, if the last poll failed
    pub fn fetch_error(&self) -> Option<&str> {
        self.fetch_error.as_deref()
    }

    /// Latest poll statistics snapshot
    pub fn poll_stats(&self) -> Option<&PollStats> {
        self.poll_stats.as_ref()
    }
}
