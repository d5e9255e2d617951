//! `streamtap pipe` – stdin to stdout with progress on stderr.

use anyhow::{Context, Result};
use std::io::{self, BufRead, ErrorKind, Write};
use streamtap_core::{ChunkMode, ProgressOptions, ProgressStream};

use crate::cli::render::Reporter;

pub fn run_pipe(
    mut opts: ProgressOptions,
    chunk_size: usize,
    length: Option<u64>,
    lines: bool,
    json: bool,
) -> Result<()> {
    if let Some(n) = length {
        opts = opts.length(n);
    }
    if lines {
        opts = opts.mode(ChunkMode::Objects);
    }

    let mut stream = ProgressStream::new(opts);
    let reporter = Reporter::attach(&mut stream, json);
    let stdin = io::stdin();
    let stdout = io::stdout();

    let result = if lines {
        pipe_lines(&mut stream, stdin.lock(), stdout.lock())
    } else {
        stream
            .pump(stdin.lock(), stdout.lock(), chunk_size)
            .map_err(anyhow::Error::from)
    };
    reporter.done();
    let total = result.context("pipe failed")?;
    tracing::info!(total, lines, "pipe complete");
    Ok(())
}

/// Forward input line by line, byte for byte, counting one unit per line.
///
/// The stream is finished only once the output has been flushed.
fn pipe_lines<R: BufRead, W: Write>(
    stream: &mut ProgressStream,
    mut input: R,
    mut output: W,
) -> Result<u64> {
    let mut discarding = false;
    let mut count = 0u64;
    let mut line = Vec::new();

    loop {
        line.clear();
        match input.read_until(b'\n', &mut line) {
            Ok(0) => break,
            Ok(_) => {}
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => {
                stream.fail(&e);
                return Err(e.into());
            }
        }
        let chunk = stream.transform(line.as_slice());
        count += 1;
        if discarding {
            continue;
        }
        if let Err(e) = output.write_all(chunk) {
            if e.kind() == ErrorKind::BrokenPipe && stream.drain() {
                tracing::debug!(count, "stdout closed, draining");
                discarding = true;
                continue;
            }
            stream.fail(&e);
            return Err(e.into());
        }
    }

    if !discarding {
        if let Err(e) = output.flush() {
            stream.fail(&e);
            return Err(e.into());
        }
    }
    stream.finish();
    Ok(count)
}
