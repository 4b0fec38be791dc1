//! Sample sources and the polling worker
//!
//! A [`SampleSource`] supplies an ordered batch of raw telemetry samples for
//! a requested lookback window. The [`Poller`](poller::Poller) runs a source
//! in a separate thread, polling on an interval and forwarding batches over
//! crossbeam channels so the hosting dashboard stays responsive.
//!
//! # Architecture
//!
//! - [`PollerCommand`] - messages sent to the worker (poll now, retune, stop)
//! - [`PollerMessage`] - messages sent back (batches, fetch errors, stats)
//! - [`SyntheticSource`](synthetic::SyntheticSource) - deterministic
//!   waveform source for demos and tests
//!
//! # Supersession
//!
//! Every issued poll is stamped with a monotonically increasing sequence
//! number before the fetch starts. Batches and fetch errors carry it, and
//! consumers apply last-writer-wins by issuance order: a stale result is
//! discarded rather than applied out of order.

pub mod poller;
pub mod synthetic;

pub use poller::{Poller, PollerHandle};
pub use synthetic::SyntheticSource;

use chrono::Duration;

use crate::error::Result;
use crate::types::Sample;

/// Supplier of raw telemetry batches
///
/// `fetch` returns samples for the lookback window in ascending timestamp
/// order. A failed fetch must leave the source usable for the next poll.
#[cfg_attr(test, mockall::automock)]
pub trait SampleSource: Send {
    /// Short human-readable name for logs
    fn name(&self) -> &str;

    /// Fetch all samples within `lookback` of now, ascending by timestamp
    fn fetch(&mut self, lookback: Duration) -> Result<Vec<Sample>>;
}

/// Commands that can be sent to the polling worker
#[derive(Debug, Clone)]
pub enum PollerCommand {
    /// Poll immediately, without waiting for the interval
    PollNow,
    /// Change the lookback window for subsequent polls
    SetLookback(Duration),
    /// Change the polling interval
    SetInterval(std::time::Duration),
    /// Request a stats snapshot
    RequestStats,
    /// Stop the worker
    Shutdown,
}

/// Messages sent from the polling worker
#[derive(Debug, Clone)]
pub enum PollerMessage {
    /// A completed poll, stamped with its issuance sequence number
    Batch { seq: u64, samples: Vec<Sample> },
    /// A failed poll; the previous dataset remains valid
    FetchError { seq: u64, error: String },
    /// Stats snapshot
    Stats(PollStats),
    /// The worker has stopped
    Shutdown,
}

/// Statistics about the polling loop
#[derive(Debug, Clone, Default)]
pub struct PollStats {
    /// Number of successful polls
    pub successful_polls: u64,
    /// Number of failed polls
    pub failed_polls: u64,
    /// Duration of the most recent fetch in milliseconds
    pub last_fetch_ms: u64,
    /// Sample count of the most recent successful batch
    pub last_batch_len: usize,
    /// Messages dropped because the channel was full
    pub dropped_messages: u64,
}

impl PollStats {
    /// Success rate as a percentage
    pub fn success_rate(&self) -> f64 {
        let total = self.successful_polls + self.failed_polls;
        if total == 0 {
            100.0
        } else {
            (self.successful_polls as f64 / total as f64) * 100.0
        }
    }
}
