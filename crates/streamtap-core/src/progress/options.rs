//! Construction options for a progress stream.

use serde::{Deserialize, Serialize};

use crate::throughput::DEFAULT_WINDOW_SECS;

/// How a chunk is counted. Fixed for the lifetime of a stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChunkMode {
    /// Count the byte length of each chunk.
    #[default]
    Bytes,
    /// Count every chunk as one unit.
    Objects,
}

/// Options for [`ProgressStream`](super::ProgressStream). Every field has a default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProgressOptions {
    /// Keep consuming and discard output when there is no downstream consumer.
    pub drain: bool,
    /// Total expected volume (0 = unknown, may be inferred on connect).
    pub length: u64,
    /// Throughput window in seconds.
    pub speed: u32,
    /// Minimum milliseconds between emissions (0 = every chunk).
    pub time: u64,
    /// Volume already transferred before this stream started (resumed transfers).
    pub transferred: u64,
    pub mode: ChunkMode,
}

impl Default for ProgressOptions {
    fn default() -> Self {
        Self {
            drain: false,
            length: 0,
            speed: DEFAULT_WINDOW_SECS,
            time: 0,
            transferred: 0,
            mode: ChunkMode::Bytes,
        }
    }
}

impl ProgressOptions {
    pub fn drain(mut self, drain: bool) -> Self {
        self.drain = drain;
        self
    }

    pub fn length(mut self, length: u64) -> Self {
        self.length = length;
        self
    }

    pub fn speed(mut self, window_secs: u32) -> Self {
        self.speed = window_secs;
        self
    }

    pub fn time(mut self, interval_ms: u64) -> Self {
        self.time = interval_ms;
        self
    }

    pub fn transferred(mut self, transferred: u64) -> Self {
        self.transferred = transferred;
        self
    }

    pub fn mode(mut self, mode: ChunkMode) -> Self {
        self.mode = mode;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let o = ProgressOptions::default();
        assert!(!o.drain);
        assert_eq!(o.length, 0);
        assert_eq!(o.speed, 5);
        assert_eq!(o.time, 0);
        assert_eq!(o.transferred, 0);
        assert_eq!(o.mode, ChunkMode::Bytes);
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let o: ProgressOptions = toml::from_str("time = 100\nmode = \"objects\"").unwrap();
        assert_eq!(o.time, 100);
        assert_eq!(o.mode, ChunkMode::Objects);
        assert_eq!(o.speed, 5);
    }
}
