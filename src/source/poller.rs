//! Polling worker thread
//!
//! Runs a [`SampleSource`] on an interval in its own thread and forwards
//! batches to the hosting dashboard over crossbeam channels. The worker
//! never lets a failed fetch take down the loop: the error is reported and
//! the previously delivered dataset stays valid on the consumer side.

use crossbeam_channel::{bounded, Receiver, Sender, TryRecvError};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use crate::config::DEFAULT_LOOKBACK_HOURS;
use crate::error::{BandVisError, Result};
use crate::source::{PollStats, PollerCommand, PollerMessage, SampleSource};

/// Channel capacity for commands and messages
const CHANNEL_CAPACITY: usize = 64;

/// How long the worker sleeps between loop iterations
const TICK: Duration = Duration::from_millis(50);

/// Worker-side state for the polling loop
pub struct Poller {
    /// The source being polled
    source: Box<dyn SampleSource>,
    /// Command receiver from the host
    command_rx: Receiver<PollerCommand>,
    /// Message sender to the host
    message_tx: Sender<PollerMessage>,
    /// Running flag shared with the handle
    running: Arc<AtomicBool>,
    /// Lookback window requested from the source
    lookback: chrono::Duration,
    /// Interval between polls
    interval: Duration,
    /// Issuance sequence for last-writer-wins on the consumer side
    next_seq: u64,
    /// Poll statistics
    stats: PollStats,
    /// When the last poll was issued
    last_poll_time: Option<Instant>,
}

/// Host-side handle to a running poller
pub struct PollerHandle {
    command_tx: Sender<PollerCommand>,
    running: Arc<AtomicBool>,
    thread: Option<JoinHandle<()>>,
}

impl Poller {
    /// Spawn the polling thread, returning the handle and message receiver
    pub fn spawn(
        source: Box<dyn SampleSource>,
        interval: Duration,
        lookback: chrono::Duration,
    ) -> (PollerHandle, Receiver<PollerMessage>) {
        let (command_tx, command_rx) = bounded(CHANNEL_CAPACITY);
        let (message_tx, message_rx) = bounded(CHANNEL_CAPACITY);
        let running = Arc::new(AtomicBool::new(true));

        let mut worker = Poller::new(source, command_rx, message_tx, running.clone());
        worker.interval = interval;
        worker.lookback = lookback;

        let thread = std::thread::spawn(move || worker.run());

        (
            PollerHandle {
                command_tx,
                running,
                thread: Some(thread),
            },
            message_rx,
        )
    }

    /// Create a new worker (not yet running)
    fn new(
        source: Box<dyn SampleSource>,
        command_rx: Receiver<PollerCommand>,
        message_tx: Sender<PollerMessage>,
        running: Arc<AtomicBool>,
    ) -> Self {
        Self {
            source,
            command_rx,
            message_tx,
            running,
            lookback: chrono::Duration::hours(DEFAULT_LOOKBACK_HOURS),
            interval: Duration::from_secs(10),
            next_seq: 0,
            stats: PollStats::default(),
            last_poll_time: None,
        }
    }

    /// Run the main worker loop
    pub fn run(&mut self) {
        tracing::info!("Poller started for source '{}'", self.source.name());

        // First poll happens immediately
        self.poll();

        while self.running.load(Ordering::SeqCst) {
            self.process_commands();

            if self.running.load(Ordering::SeqCst) && self.poll_due() {
                self.poll();
            }

            std::thread::sleep(TICK);
        }

        let _ = self.message_tx.send(PollerMessage::Shutdown);
        tracing::info!("Poller stopped");
    }

    /// Process pending commands from the host
    fn process_commands(&mut self) {
        loop {
            match self.command_rx.try_recv() {
                Ok(cmd) => self.handle_command(cmd),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    self.running.store(false, Ordering::SeqCst);
                    break;
                }
            }
        }
    }

    /// Handle a single command
    fn handle_command(&mut self, cmd: PollerCommand) {
        match cmd {
            PollerCommand::PollNow => self.poll(),
            PollerCommand::SetLookback(lookback) => {
                self.lookback = lookback;
            }
            PollerCommand::SetInterval(interval) => {
                self.interval = interval.max(Duration::from_millis(250));
            }
            PollerCommand::RequestStats => self.send_stats(),
            PollerCommand::Shutdown => {
                self.running.store(false, Ordering::SeqCst);
            }
        }
    }

    /// Whether the interval has elapsed since the last poll
    fn poll_due(&self) -> bool {
        match self.last_poll_time {
            None => true,
            Some(t) => t.elapsed() >= self.interval,
        }
    }

    /// Issue one poll and forward the result
    ///
    /// The sequence number is stamped at issuance so the consumer can apply
    /// last-writer-wins by issuance order, not completion order.
    fn poll(&mut self) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.last_poll_time = Some(Instant::now());

        let started = Instant::now();
        match self.source.fetch(self.lookback) {
            Ok(samples) => {
                self.stats.successful_polls += 1;
                self.stats.last_fetch_ms = started.elapsed().as_millis() as u64;
                self.stats.last_batch_len = samples.len();
                tracing::debug!("Poll {} delivered {} samples", seq, samples.len());
                self.try_send_message(PollerMessage::Batch { seq, samples });
            }
            Err(e) => {
                self.stats.failed_polls += 1;
                self.stats.last_fetch_ms = started.elapsed().as_millis() as u64;
                tracing::warn!("Poll {} failed: {}", seq, e);
                self.try_send_message(PollerMessage::FetchError {
                    seq,
                    error: e.to_string(),
                });
            }
        }
    }

    /// Send a stats snapshot
    fn send_stats(&mut self) {
        let stats = self.stats.clone();
        self.try_send_message(PollerMessage::Stats(stats));
    }

    /// Try to send a message, counting drops instead of blocking
    fn try_send_message(&mut self, msg: PollerMessage) {
        if self.message_tx.try_send(msg).is_err() {
            self.stats.dropped_messages += 1;
        }
    }
}

impl PollerHandle {
    /// Request an immediate poll
    pub fn poll_now(&self) -> Result<()> {
        self.send(PollerCommand::PollNow)
    }

    /// Change the lookback window
    pub fn set_lookback(&self, lookback: chrono::Duration) -> Result<()> {
        self.send(PollerCommand::SetLookback(lookback))
    }

    /// Change the polling interval
    pub fn set_interval(&self, interval: Duration) -> Result<()> {
        self.send(PollerCommand::SetInterval(interval))
    }

    /// Request a stats snapshot
    pub fn request_stats(&self) -> Result<()> {
        self.send(PollerCommand::RequestStats)
    }

    /// Whether the worker is still running
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Stop the worker and wait for the thread to finish
    pub fn shutdown(mut self) {
        let _ = self.command_tx.send(PollerCommand::Shutdown);
        self.running.store(false, Ordering::SeqCst);
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }

    fn send(&self, cmd: PollerCommand) -> Result<()> {
        self.command_tx
            .send(cmd)
            .map_err(|e| BandVisError::Channel(format!("Poller command failed: {}", e)))
    }
}
