//! `streamtap copy <src> <dst>` – file copy with progress.

use anyhow::{Context, Result};
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;
use streamtap_core::{FileSource, ProgressOptions, ProgressStream};

use crate::cli::render::Reporter;

pub fn run_copy(
    opts: ProgressOptions,
    chunk_size: usize,
    src: &Path,
    dst: &Path,
    json: bool,
) -> Result<()> {
    let source =
        FileSource::open(src).with_context(|| format!("failed to open {}", src.display()))?;
    let out = File::create(dst).with_context(|| format!("failed to create {}", dst.display()))?;

    let mut stream = ProgressStream::new(opts);
    let reporter = Reporter::attach(&mut stream, json);
    stream.connect(&source);

    let result = stream.pump(source, BufWriter::new(out), chunk_size);
    reporter.done();
    let copied = result.with_context(|| format!("copy {} -> {}", src.display(), dst.display()))?;
    tracing::info!(src = %src.display(), dst = %dst.display(), bytes = copied, "copy complete");
    Ok(())
}
