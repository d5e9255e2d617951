//! Pass-through progress tracking.
//!
//! [`ProgressStream`] sits inline in a pipeline: every chunk handed to
//! [`ProgressStream::transform`] comes back unchanged, while the stream tallies
//! its size, feeds the throughput window and, at most once per configured
//! interval, publishes a [`ProgressState`] snapshot to its listeners. A clean
//! end of stream ([`ProgressStream::finish`]) always publishes one last
//! snapshot pinned at 100%; a failed stream never does.
//!
//! The stream does no I/O of its own. Adapters in [`crate::io`] and
//! [`crate::stage`] drive it from readers, writers, iterators and channels.

mod events;
mod options;
mod source;
mod state;

use std::fmt;

use tokio::sync::mpsc;

use crate::clock::{Clock, MonotonicClock};
use crate::throughput::{ThroughputEstimator, DEFAULT_RESOLUTION};

pub use events::{channel_listener, ProgressEvent};
pub use options::{ChunkMode, ProgressOptions};
pub use source::{infer_length, FileSource, PathSource, SourceMetadata};
pub use state::ProgressState;

use events::Listeners;

/// A unit of data that knows its size in bytes.
pub trait Chunk {
    fn byte_len(&self) -> usize;
}

impl Chunk for [u8] {
    fn byte_len(&self) -> usize {
        self.len()
    }
}

impl Chunk for str {
    fn byte_len(&self) -> usize {
        self.len()
    }
}

impl Chunk for Vec<u8> {
    fn byte_len(&self) -> usize {
        self.len()
    }
}

impl Chunk for String {
    fn byte_len(&self) -> usize {
        self.len()
    }
}

impl Chunk for Box<[u8]> {
    fn byte_len(&self) -> usize {
        self.len()
    }
}

impl<const N: usize> Chunk for [u8; N] {
    fn byte_len(&self) -> usize {
        N
    }
}

impl<T: Chunk + ?Sized> Chunk for &T {
    fn byte_len(&self) -> usize {
        (**self).byte_len()
    }
}

impl<T: Chunk + ?Sized> Chunk for &mut T {
    fn byte_len(&self) -> usize {
        (**self).byte_len()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Status {
    Active,
    Ended,
    Failed,
}

/// Progress-tracking pass-through stage.
pub struct ProgressStream<C = MonotonicClock> {
    clock: C,
    estimator: ThroughputEstimator<C>,
    mode: ChunkMode,
    drain: bool,
    interval_ms: u64,
    start: u64,
    next_emission: u64,
    delta: u64,
    state: ProgressState,
    status: Status,
    warned_after_end: bool,
    listeners: Listeners,
}

impl ProgressStream<MonotonicClock> {
    pub fn new(options: ProgressOptions) -> Self {
        Self::with_clock(options, MonotonicClock::new())
    }
}

impl Default for ProgressStream<MonotonicClock> {
    fn default() -> Self {
        Self::new(ProgressOptions::default())
    }
}

impl<C: Clock + Clone> ProgressStream<C> {
    /// Stream reading time from `clock` (shared with its throughput window).
    pub fn with_clock(options: ProgressOptions, clock: C) -> Self {
        let start = clock.now_millis();
        let estimator =
            ThroughputEstimator::with_clock(options.speed, DEFAULT_RESOLUTION, clock.clone());
        Self {
            clock,
            estimator,
            mode: options.mode,
            drain: options.drain,
            interval_ms: options.time,
            start,
            next_emission: start.saturating_add(options.time),
            delta: 0,
            state: ProgressState::new(options.length, options.transferred),
            status: Status::Active,
            warned_after_end: false,
            listeners: Listeners::default(),
        }
    }
}

impl<C: Clock> ProgressStream<C> {
    /// Register a listener for every event.
    pub fn subscribe<F>(&mut self, listener: F)
    where
        F: FnMut(&ProgressEvent) + Send + 'static,
    {
        self.listeners.push(Box::new(listener));
    }

    /// Register a listener for progress snapshots only.
    pub fn on_progress<F>(&mut self, mut listener: F)
    where
        F: FnMut(&ProgressState) + Send + 'static,
    {
        self.subscribe(move |event| {
            if let ProgressEvent::Progress(state) = event {
                listener(state);
            }
        });
    }

    /// Register a listener for length changes only.
    pub fn on_length<F>(&mut self, mut listener: F)
    where
        F: FnMut(u64) + Send + 'static,
    {
        self.subscribe(move |event| {
            if let ProgressEvent::Length(len) = event {
                listener(*len);
            }
        });
    }

    /// Deliver events into a bounded channel (lagging receivers lose events).
    pub fn event_channel(&mut self, capacity: usize) -> mpsc::Receiver<ProgressEvent> {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        self.subscribe(channel_listener(tx));
        rx
    }

    pub fn mode(&self) -> ChunkMode {
        self.mode
    }

    /// True if the stream should keep consuming when nothing reads its output.
    pub fn drain(&self) -> bool {
        self.drain
    }

    pub fn is_ended(&self) -> bool {
        self.status == Status::Ended
    }

    pub fn is_failed(&self) -> bool {
        self.status == Status::Failed
    }

    /// Current state as of the last update, without touching the rate window.
    pub fn state(&self) -> &ProgressState {
        &self.state
    }

    /// Infer the total length from an upstream source.
    ///
    /// Does nothing when a length is already known.
    pub fn connect<S: SourceMetadata + ?Sized>(&mut self, source: &S) {
        if self.state.length > 0 {
            return;
        }
        match infer_length(source) {
            Some(len) => {
                tracing::debug!(length = len, "length inferred from source");
                self.set_length(len);
            }
            None => tracing::debug!("source length unknown"),
        }
    }

    /// Override the total length and publish [`ProgressEvent::Length`].
    pub fn set_length(&mut self, length: u64) {
        self.state.length = length;
        self.state.refresh_remaining();
        self.listeners.publish(&ProgressEvent::Length(length));
    }

    /// Count `chunk` and hand it back unchanged.
    pub fn transform<T: Chunk>(&mut self, chunk: T) -> T {
        let amount = match self.mode {
            ChunkMode::Bytes => chunk.byte_len() as u64,
            ChunkMode::Objects => 1,
        };
        self.tally(amount);
        chunk
    }

    /// Count `item` as one unit and hand it back unchanged.
    ///
    /// Only meaningful for [`ChunkMode::Objects`] streams; a byte stream
    /// would mix units.
    pub fn transform_item<T>(&mut self, item: T) -> T {
        debug_assert_eq!(
            self.mode,
            ChunkMode::Objects,
            "transform_item on a byte-counting stream"
        );
        self.tally(1);
        item
    }

    /// Snapshot with a freshly ticked rate and ETA.
    pub fn progress(&mut self) -> ProgressState {
        let speed = self.estimator.sample(0);
        self.state.refresh_percentage(self.status == Status::Ended);
        self.state.refresh_speed(speed);
        self.state.runtime = self.runtime_secs();
        self.state
    }

    /// Mark a clean end of stream and publish the final 100% snapshot.
    ///
    /// Only the first call on an active stream publishes.
    pub fn finish(&mut self) -> ProgressState {
        if self.status == Status::Active {
            self.status = Status::Ended;
            self.emit(true);
            tracing::debug!(
                transferred = self.state.transferred,
                runtime = self.state.runtime,
                "stream finished"
            );
        }
        self.state
    }

    /// Mark the stream failed. No completion snapshot will follow.
    pub fn fail(&mut self, reason: impl fmt::Display) {
        if self.status == Status::Active {
            tracing::warn!(transferred = self.state.transferred, "stream failed: {}", reason);
            self.status = Status::Failed;
        }
    }

    fn tally(&mut self, amount: u64) {
        self.state.transferred = self.state.transferred.saturating_add(amount);
        self.delta = self.delta.saturating_add(amount);
        self.state.refresh_remaining();

        match self.status {
            Status::Active => {
                if self.clock.now_millis() >= self.next_emission {
                    self.emit(false);
                }
            }
            Status::Ended if !self.warned_after_end => {
                tracing::warn!("chunk received after end of stream");
                self.warned_after_end = true;
            }
            _ => {}
        }
    }

    fn emit(&mut self, ended: bool) {
        let now = self.clock.now_millis();
        self.state.refresh_percentage(ended);
        let speed = self.estimator.sample(self.delta);
        self.state.refresh_speed(speed);
        self.state.runtime = now.saturating_sub(self.start) / 1000;
        self.state.delta = self.delta;
        self.delta = 0;
        self.next_emission = now.saturating_add(self.interval_ms);
        self.listeners.publish(&ProgressEvent::Progress(self.state));
    }

    fn runtime_secs(&self) -> u64 {
        self.clock.now_millis().saturating_sub(self.start) / 1000
    }
}

impl<C> fmt::Debug for ProgressStream<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProgressStream")
            .field("mode", &self.mode)
            .field("drain", &self.drain)
            .field("interval_ms", &self.interval_ms)
            .field("status", &self.status)
            .field("state", &self.state)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}
