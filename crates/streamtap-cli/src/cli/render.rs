//! Terminal rendering of progress snapshots.

use std::io::{self, Write};
use std::sync::{Arc, Mutex};

use streamtap_core::{ChunkMode, Clock, ProgressState, ProgressStream};

const MOVE_LEFT: &str = "\x1b[1000D";
const CLEAR_LINE: &str = "\x1b[0K";
const MOVE_UP: &str = "\x1b[1A";

pub const DEFAULT_WIDTH: usize = 80;

/// Writer that keeps rewriting the same region of the terminal.
///
/// Each [`log`](SingleLineLog::log) erases what the previous call printed,
/// counting wrapped lines against `width`, then prints the new text.
pub struct SingleLineLog<W: Write> {
    out: W,
    width: usize,
    prev_lines: usize,
}

impl<W: Write> SingleLineLog<W> {
    pub fn new(out: W) -> Self {
        Self::with_width(out, DEFAULT_WIDTH)
    }

    pub fn with_width(out: W, width: usize) -> Self {
        Self {
            out,
            width: width.max(1),
            prev_lines: 0,
        }
    }

    pub fn log(&mut self, text: &str) -> io::Result<()> {
        let mut buf = self.erase_sequence();
        buf.push_str(text);
        self.out.write_all(buf.as_bytes())?;
        self.out.flush()?;
        self.prev_lines = text
            .split('\n')
            .map(|line| line.chars().count().div_ceil(self.width).max(1))
            .sum();
        Ok(())
    }

    /// Erase the last output.
    pub fn clear(&mut self) -> io::Result<()> {
        let buf = self.erase_sequence();
        self.prev_lines = 0;
        self.out.write_all(buf.as_bytes())?;
        self.out.flush()
    }

    /// Keep the last output on screen and move below it.
    pub fn done(&mut self) -> io::Result<()> {
        if self.prev_lines > 0 {
            self.prev_lines = 0;
            self.out.write_all(b"\n")?;
        }
        self.out.flush()
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn erase_sequence(&self) -> String {
        let mut seq = String::new();
        for i in 0..self.prev_lines {
            seq.push_str(MOVE_LEFT);
            seq.push_str(CLEAR_LINE);
            if i + 1 < self.prev_lines {
                seq.push_str(MOVE_UP);
            }
        }
        seq
    }
}

fn format_bytes(n: f64) -> String {
    const UNITS: [&str; 5] = ["B", "KiB", "MiB", "GiB", "TiB"];
    let mut value = n;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{:.0} {}", value, UNITS[0])
    } else {
        format!("{:.1} {}", value, UNITS[unit])
    }
}

fn format_eta(secs: u64) -> String {
    let (h, m, s) = (secs / 3600, (secs % 3600) / 60, secs % 60);
    if h > 0 {
        format!("{h}:{m:02}:{s:02}")
    } else {
        format!("{m}:{s:02}")
    }
}

/// One-line summary: `transferred / length (pct%)  speed/s  ETA`.
///
/// Without a known length only the amount and speed are shown.
pub fn format_state(state: &ProgressState, mode: ChunkMode) -> String {
    let amount = |n: f64| match mode {
        ChunkMode::Bytes => format_bytes(n),
        ChunkMode::Objects => format!("{:.0}", n),
    };
    let speed = amount(state.speed);
    if state.length == 0 {
        return format!("{}  {}/s", amount(state.transferred as f64), speed);
    }
    format!(
        "{} / {} ({:.1}%)  {}/s  ETA {}",
        amount(state.transferred as f64),
        amount(state.length as f64),
        state.percentage,
        speed,
        format_eta(state.eta)
    )
}

/// Progress output attached to a stream: a rewritten stderr line, or one
/// JSON object per snapshot.
pub struct Reporter {
    line: Option<Arc<Mutex<SingleLineLog<io::Stderr>>>>,
}

impl Reporter {
    pub fn attach<C: Clock>(stream: &mut ProgressStream<C>, json: bool) -> Self {
        if json {
            stream.on_progress(|state| match serde_json::to_string(state) {
                Ok(line) => eprintln!("{line}"),
                Err(e) => tracing::warn!("failed to encode snapshot: {}", e),
            });
            return Self { line: None };
        }

        let mode = stream.mode();
        let line = Arc::new(Mutex::new(SingleLineLog::new(io::stderr())));
        let shared = Arc::clone(&line);
        stream.on_progress(move |state| {
            if let Ok(mut log) = shared.lock() {
                if let Err(e) = log.log(&format_state(state, mode)) {
                    tracing::debug!("progress line not written: {}", e);
                }
            }
        });
        Self { line: Some(line) }
    }

    /// Leave the last progress line in place and end it with a newline.
    pub fn done(self) {
        if let Some(line) = self.line {
            if let Ok(mut log) = line.lock() {
                let _ = log.done();
            }
        }
    }
}
