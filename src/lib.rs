//! # BandVis-RS: Bandwidth Telemetry Dashboard Core
//!
//! The time-series core of a bandwidth-monitoring dashboard for a home-media
//! server: it turns raw, irregularly-sampled telemetry (per-client
//! download/upload speeds, configured limits, stream bitrate, WAN counters)
//! into a bounded, visually-balanced dataset for a shared-axis chart where
//! download and upload render as opposing signed stacks.
//!
//! ## Architecture
//!
//! - **Source**: a [`source::SampleSource`] polled by a worker thread
//!   ([`source::Poller`]) over crossbeam channels
//! - **Pipeline**: pure synchronous stages that aggregate into time buckets,
//!   zoom to a sub-range, dual-polarity scale onto one axis
//!   ([`pipeline::build_chart`])
//! - **Stores**: persisted per-series visibility, orientation flags, and
//!   per-client stack order behind a generic key-value collaborator
//! - **Dashboard**: the stateful host gluing the three together at the
//!   boundary ([`dashboard::Dashboard`])
//!
//! Rendering is deliberately out of scope: a presentation adapter receives
//! the transformed buckets plus the scale ratio and uses
//! [`pipeline::invert`] to format true values.
//!
//! ## Configuration
//!
//! Application state lives in the platform-appropriate data directory under
//! `dev.bandvis.bandvis-rs`:
//!
//! - **Linux**: `~/.local/share/dev.bandvis.bandvis-rs/`
//! - **macOS**: `~/Library/Application Support/dev.bandvis.bandvis-rs/`
//! - **Windows**: `%APPDATA%\dev.bandvis.bandvis-rs\`
//!
//! ## Example
//!
//! ```
//! use bandvis_rs::dashboard::Dashboard;
//! use bandvis_rs::pipeline::Resolution;
//! use bandvis_rs::source::{Poller, SyntheticSource};
//! use bandvis_rs::store::MemoryStore;
//! use bandvis_rs::types::Client;
//!
//! let clients = vec![Client::new("tv", "Living Room TV")];
//! let mut dashboard = Dashboard::new(MemoryStore::new(), clients.clone());
//! dashboard.set_resolution(Resolution::from_minutes(1.0).unwrap());
//!
//! let (poller, messages) = Poller::spawn(
//!     Box::new(SyntheticSource::new(clients)),
//!     std::time::Duration::from_secs(10),
//!     chrono::Duration::hours(2),
//! );
//!
//! // The first poll is issued immediately
//! let msg = messages.recv().unwrap();
//! dashboard.apply_message(msg);
//! let chart = dashboard.chart().unwrap();
//! assert!(chart.ratio >= 0.0);
//!
//! poller.shutdown();
//! ```

pub mod config;
pub mod dashboard;
pub mod error;
pub mod pipeline;
pub mod source;
pub mod store;
pub mod types;

// Re-export commonly used types
pub use config::AppConfig;
pub use dashboard::Dashboard;
pub use error::{BandVisError, Result};
pub use pipeline::{build_chart, ChartData, ChartView, Resolution, ZoomRange};
pub use source::{Poller, SampleSource, SyntheticSource};
pub use store::{JsonFileStore, KeyValueStore, MemoryStore};
pub use types::{Bucket, Client, ClientId, Direction, Sample, SeriesKey, VisibilityMap};
