//! Snapshot of transfer state, copied out on every emission.

use serde::Serialize;

/// Point-in-time readout of a [`ProgressStream`](super::ProgressStream).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct ProgressState {
    /// Total expected volume; 0 when unknown.
    pub length: u64,
    /// Volume processed so far.
    pub transferred: u64,
    /// Volume processed since the previous emission.
    pub delta: u64,
    /// `length - transferred`, never below 0.
    pub remaining: u64,
    /// Completion in `[0, 100]`; exactly 100 after a clean end of stream.
    pub percentage: f64,
    /// Windowed rate in units per second.
    pub speed: f64,
    /// Estimated seconds left; 0 when the rate is unknown.
    pub eta: u64,
    /// Whole seconds since the stream was created.
    pub runtime: u64,
}

impl ProgressState {
    pub(super) fn new(length: u64, transferred: u64) -> Self {
        Self {
            length,
            transferred,
            remaining: length.saturating_sub(transferred),
            ..Self::default()
        }
    }

    /// Fraction complete in `[0.0, 1.0]`.
    pub fn fraction(&self) -> f64 {
        self.percentage / 100.0
    }

    pub(super) fn refresh_remaining(&mut self) {
        self.remaining = self.length.saturating_sub(self.transferred);
    }

    pub(super) fn refresh_percentage(&mut self, ended: bool) {
        self.percentage = if ended {
            100.0
        } else if self.length > 0 {
            (self.transferred as f64 / self.length as f64 * 100.0).clamp(0.0, 100.0)
        } else {
            0.0
        };
    }

    /// Set `speed` and derive `eta` from it.
    pub(super) fn refresh_speed(&mut self, speed: f64) {
        self.speed = speed;
        self.eta = eta_secs(self.remaining, speed);
    }
}

fn eta_secs(remaining: u64, speed: f64) -> u64 {
    if !speed.is_finite() || speed <= 0.0 {
        return 0;
    }
    let eta = (remaining as f64 / speed).round();
    if eta.is_finite() {
        eta as u64
    } else {
        0
    }
}
