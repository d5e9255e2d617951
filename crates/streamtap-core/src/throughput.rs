//! Windowed throughput estimation in constant memory.
//!
//! The estimator keeps `resolution * window_secs` slots in a ring. Each slot
//! holds the volume recorded during one tick (1/resolution of a second). Time
//! is quantized into a 16-bit wrapping tick counter, so the state never grows
//! no matter how long a transfer runs.
//!
//! Before a new delta is written, every slot the window slid past since the
//! previous call is zeroed. An idle gap longer than the window clears the
//! whole ring, so a stalled transfer reports 0 instead of its last burst.

use crate::clock::{Clock, MonotonicClock};

/// Samples per second.
pub const DEFAULT_RESOLUTION: u32 = 10;
/// Trailing window used when none is configured.
pub const DEFAULT_WINDOW_SECS: u32 = 5;
/// Largest ring a 16-bit tick difference can sweep in one step.
const MAX_SLOTS: usize = u16::MAX as usize;

/// Sliding-window rate estimator (amount per second).
#[derive(Debug, Clone)]
pub struct ThroughputEstimator<C = MonotonicClock> {
    clock: C,
    start: u64,
    resolution: u32,
    slots: Vec<f64>,
    /// Slot the next tick will overwrite; the slot behind it is "just completed".
    pointer: usize,
    last_tick: u16,
    /// Unwrapped tick of the previous sample; catches gaps the u16 counter aliases.
    last_elapsed_ticks: u64,
}

impl ThroughputEstimator<MonotonicClock> {
    /// Estimator averaging over the last `window_secs` seconds of wall time.
    pub fn new(window_secs: u32) -> Self {
        Self::with_clock(window_secs, DEFAULT_RESOLUTION, MonotonicClock::new())
    }
}

impl Default for ThroughputEstimator<MonotonicClock> {
    fn default() -> Self {
        Self::new(DEFAULT_WINDOW_SECS)
    }
}

impl<C: Clock> ThroughputEstimator<C> {
    /// Estimator reading time from `clock`. Zero window or resolution is treated as 1.
    ///
    /// The ring is capped at 65535 slots (about 6553 s at the default
    /// resolution); longer windows are shortened.
    pub fn with_clock(window_secs: u32, resolution: u32, clock: C) -> Self {
        let resolution = resolution.clamp(1, MAX_SLOTS as u32);
        let requested = (window_secs.max(1) as usize).saturating_mul(resolution as usize);
        let size = requested.min(MAX_SLOTS / resolution as usize * resolution as usize);
        if size < requested {
            tracing::warn!(
                window_secs,
                capped_secs = size / resolution as usize,
                "throughput window too long, capped"
            );
        }
        let start = clock.now_millis();
        let mut estimator = Self {
            clock,
            start,
            resolution,
            slots: vec![0.0; size],
            pointer: 0,
            last_tick: 0,
            last_elapsed_ticks: 0,
        };
        // One tick behind "now" so a delta recorded at elapsed 0 lands in a slot.
        estimator.last_tick = estimator.current_tick().wrapping_sub(1);
        estimator
    }

    /// Length of the averaging window in seconds.
    pub fn window_secs(&self) -> u32 {
        self.slots.len() as u32 / self.resolution
    }

    /// Record `delta` (may be 0 to just advance time) and return the current rate.
    pub fn sample(&mut self, delta: u64) -> f64 {
        let elapsed_ticks = self.elapsed_ticks();
        let tick = elapsed_ticks as u16;
        let size = self.slots.len();
        let advance = tick.wrapping_sub(self.last_tick) as usize;
        let gap = elapsed_ticks.saturating_sub(self.last_elapsed_ticks);
        self.last_elapsed_ticks = elapsed_ticks;

        if advance >= size || gap >= size as u64 {
            self.slots.fill(0.0);
        } else {
            for i in 0..advance {
                self.slots[(self.pointer + i) % size] = 0.0;
            }
        }
        self.pointer = (self.pointer + advance) % size;
        self.last_tick = tick;

        if delta != 0 {
            let completed = if self.pointer == 0 {
                size - 1
            } else {
                self.pointer - 1
            };
            self.slots[completed] += delta as f64;
        }

        self.rate()
    }

    fn rate(&self) -> f64 {
        let sum: f64 = self.slots.iter().sum();
        sum * f64::from(self.resolution) / self.slots.len() as f64
    }

    fn elapsed_ticks(&self) -> u64 {
        let elapsed = self.clock.now_millis().saturating_sub(self.start);
        elapsed * u64::from(self.resolution) / 1000
    }

    fn current_tick(&self) -> u16 {
        // Truncation is the 65536 wrap.
        self.elapsed_ticks() as u16
    }
}
