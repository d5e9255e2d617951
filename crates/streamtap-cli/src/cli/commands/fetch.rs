//! `streamtap fetch <url>` – HTTP download with progress.

use anyhow::{bail, Context, Result};
use std::fs::File;
use std::io::{self, BufWriter};
use std::path::Path;
use streamtap_core::fetch::{fetch_to, HttpOptions};
use streamtap_core::{ProgressError, ProgressOptions, ProgressStream};

use crate::cli::render::Reporter;

/// Parse repeated `-H "Name: value"` arguments.
pub fn parse_header_args(raw: &[String]) -> Result<Vec<(String, String)>> {
    raw.iter()
        .map(|h| match h.split_once(':') {
            Some((name, value)) if !name.trim().is_empty() => {
                Ok((name.trim().to_string(), value.trim().to_string()))
            }
            _ => bail!("invalid header {:?}, expected \"Name: value\"", h),
        })
        .collect()
}

pub fn run_fetch(
    opts: ProgressOptions,
    http: &HttpOptions,
    url: &str,
    output: Option<&Path>,
    json: bool,
) -> Result<()> {
    let mut stream = ProgressStream::new(opts);
    let reporter = Reporter::attach(&mut stream, json);

    let result = match output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("failed to create {}", path.display()))?;
            fetch_to(url, &mut stream, BufWriter::new(file), http)
        }
        None => fetch_to(url, &mut stream, io::sink(), http),
    };
    reporter.done();

    let bytes = result.map_err(|e| describe(e, url))?;
    tracing::info!(url, bytes, "download complete");
    Ok(())
}

fn describe(err: ProgressError, url: &str) -> anyhow::Error {
    if err.is_upstream() {
        anyhow::Error::new(err).context(format!("download of {url} failed"))
    } else {
        anyhow::Error::new(err).context("writing output failed")
    }
}
